use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Forfeit the loser of an event has to perform
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Gage {
    pub gage_id: Uuid,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
}
