use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::Player;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlayerRequest {
    #[validate(custom(function = "validate_gamertag"))]
    pub gamertag: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PlayerSearch {
    /// Case-insensitive substring of the gamertag
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerResponse {
    pub player_id: Uuid,
    pub gamertag: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            player_id: player.player_id,
            gamertag: player.gamertag,
            created_at: player.created_at,
        }
    }
}

/// Gamertags are trimmed before storage; blank or oversized ones are rejected
pub fn validate_gamertag(gamertag: &str) -> Result<(), validator::ValidationError> {
    let trimmed = gamertag.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 100 {
        let mut error = validator::ValidationError::new("invalid_gamertag");
        error.message = Some("Gamertag must be between 1 and 100 characters".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamertag_rules() {
        assert!(validate_gamertag("Shadow#1234").is_ok());
        assert!(validate_gamertag("  padded  ").is_ok());
        assert!(validate_gamertag("   ").is_err());
        assert!(validate_gamertag(&"x".repeat(101)).is_err());
    }
}
