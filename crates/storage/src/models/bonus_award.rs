use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Points granted by the bonus wheel, counted on top of game scores
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BonusAward {
    pub bonus_id: Uuid,
    pub event_id: Uuid,
    pub player_id: Uuid,
    pub game_id: Option<Uuid>,
    pub label: String,
    pub points: i32,
    pub created_at: chrono::NaiveDateTime,
}
