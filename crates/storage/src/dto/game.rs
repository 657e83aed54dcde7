use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::decimal_to_f64;
use super::stats::PlayerStatsResponse;
use crate::models::{Game, GameStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameResponse {
    pub game_id: Uuid,
    pub event_id: Uuid,
    pub game_number: i32,
    pub status: GameStatus,
    pub start_time: Option<chrono::NaiveDateTime>,
    pub end_time: Option<chrono::NaiveDateTime>,
    pub kill_multiplier: f64,
    pub spawn_location: Option<String>,
    pub squad_leader_id: Option<Uuid>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            game_id: game.game_id,
            event_id: game.event_id,
            game_number: game.game_number,
            status: game.status,
            start_time: game.start_time,
            end_time: game.end_time,
            kill_multiplier: decimal_to_f64(game.kill_multiplier),
            spawn_location: game.spawn_location,
            squad_leader_id: game.squad_leader_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameDetailResponse {
    #[serde(flatten)]
    pub game: GameResponse,
    pub stats: Vec<PlayerStatsResponse>,
}

/// Organizer overrides for a game that has not completed yet
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateGameRequest {
    #[validate(range(min = 0.0, max = 10.0, message = "Kill multiplier must be between 0 and 10"))]
    pub kill_multiplier: Option<f64>,

    /// A blank string clears the location
    #[validate(length(max = 100))]
    pub spawn_location: Option<String>,

    pub squad_leader_id: Option<Uuid>,
}
