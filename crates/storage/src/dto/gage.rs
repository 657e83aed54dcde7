use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Gage;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGageRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Gage text must be between 1 and 255 characters"
    ))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GageResponse {
    pub gage_id: Uuid,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Gage> for GageResponse {
    fn from(gage: Gage) -> Self {
        Self {
            gage_id: gage.gage_id,
            text: gage.text,
            created_at: gage.created_at,
        }
    }
}
