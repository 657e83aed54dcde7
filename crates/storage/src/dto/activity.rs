use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::BonusAward;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_distinct_redeploy"))]
pub struct CreateRedeployRequest {
    pub game_id: Uuid,
    pub redeployer_id: Uuid,
    pub redeployed_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedeployResponse {
    pub redeploy_id: Uuid,
    pub game_id: Uuid,
    pub redeployer_id: Uuid,
    pub redeployer_gamertag: String,
    pub redeployed_id: Uuid,
    pub redeployed_gamertag: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_distinct_revive"))]
pub struct CreateReviveRequest {
    pub game_id: Uuid,
    pub reviver_id: Uuid,
    pub revived_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviveResponse {
    pub revive_id: Uuid,
    pub game_id: Uuid,
    pub reviver_id: Uuid,
    pub reviver_gamertag: String,
    pub revived_id: Uuid,
    pub revived_gamertag: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Bonus wheel outcome granted to one participant
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplyBonusRequest {
    pub player_id: Uuid,
    /// Game the bonus was spun for, if any
    pub game_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Label must be between 1 and 100 characters"))]
    pub label: String,
    #[validate(range(min = -100, max = 100, message = "Bonus points must be between -100 and 100"))]
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BonusAwardResponse {
    pub bonus_id: Uuid,
    pub event_id: Uuid,
    pub player_id: Uuid,
    pub game_id: Option<Uuid>,
    pub label: String,
    pub points: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl From<BonusAward> for BonusAwardResponse {
    fn from(bonus: BonusAward) -> Self {
        Self {
            bonus_id: bonus.bonus_id,
            event_id: bonus.event_id,
            player_id: bonus.player_id,
            game_id: bonus.game_id,
            label: bonus.label,
            points: bonus.points,
            created_at: bonus.created_at,
        }
    }
}

fn validate_distinct_redeploy(req: &CreateRedeployRequest) -> Result<(), ValidationError> {
    if req.redeployer_id == req.redeployed_id {
        return Err(ValidationError::new("self_redeploy"));
    }
    Ok(())
}

fn validate_distinct_revive(req: &CreateReviveRequest) -> Result<(), ValidationError> {
    if req.reviver_id == req.revived_id {
        return Err(ValidationError::new("self_revive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_cannot_redeploy_or_revive_themselves() {
        let same = Uuid::from_u128(9);
        let redeploy = CreateRedeployRequest {
            game_id: Uuid::nil(),
            redeployer_id: same,
            redeployed_id: same,
        };
        assert!(redeploy.validate().is_err());

        let revive = CreateReviveRequest {
            game_id: Uuid::nil(),
            reviver_id: Uuid::from_u128(1),
            revived_id: Uuid::from_u128(2),
        };
        assert!(revive.validate().is_ok());
    }

    #[test]
    fn bonus_points_are_bounded() {
        let bonus = ApplyBonusRequest {
            player_id: Uuid::nil(),
            game_id: None,
            label: "Double or nothing".to_string(),
            points: 250,
        };
        assert!(bonus.validate().is_err());
    }
}
