use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::gage::GageResponse;
use super::game::GameResponse;
use super::player::{PlayerResponse, validate_gamertag};
use crate::models::{EventStatus, Game, GameStatus, MasterkillEvent};
use crate::services::lifecycle::EventAction;

/// Request payload for creating a new Masterkill
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Name must be between 1 and 150 characters"
    ))]
    #[serde(default = "default_name")]
    pub name: String,

    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "one")]
    pub points_kill: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "one")]
    pub points_revive: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "minus_one")]
    pub points_redeploy: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "one")]
    pub points_gulag_win: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "default_rage_quit")]
    pub points_rage_quit: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "one")]
    pub points_execution: i32,
    #[validate(range(min = -1000, max = 1000, message = "Point weights must be between -1000 and 1000"))]
    #[serde(default = "minus_one")]
    pub points_humiliation: i32,

    #[validate(range(min = 1, max = 50, message = "Planned games must be between 1 and 50"))]
    #[serde(default = "default_games_planned")]
    pub num_games_planned: i32,

    #[serde(default)]
    pub top1_solo_ends_event: bool,

    #[serde(default = "default_true")]
    pub has_bonus_wheel: bool,

    #[serde(default)]
    pub has_kill_multipliers: bool,

    /// Players are created on the fly when a gamertag is unknown
    #[validate(custom(function = "validate_gamertags"))]
    #[serde(default)]
    pub participant_gamertags: Vec<String>,

    /// Gage to attach; matched case-insensitively against existing ones
    #[validate(length(max = 255))]
    pub custom_gage_text: Option<String>,
}

/// Partial update of an event. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,

    #[validate(range(min = -1000, max = 1000))]
    pub points_kill: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_revive: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_redeploy: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_gulag_win: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_rage_quit: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_execution: Option<i32>,
    #[validate(range(min = -1000, max = 1000))]
    pub points_humiliation: Option<i32>,

    #[validate(range(min = 1, max = 50))]
    pub num_games_planned: Option<i32>,
    pub top1_solo_ends_event: Option<bool>,
    pub has_bonus_wheel: Option<bool>,
    pub has_kill_multipliers: Option<bool>,

    /// Replaces the whole participant set when present
    #[validate(custom(function = "validate_gamertags"))]
    pub participant_gamertags: Option<Vec<String>>,

    /// A blank string clears the gage
    #[validate(length(max = 255))]
    pub custom_gage_text: Option<String>,

    pub winner_id: Option<Uuid>,
}

impl UpdateEventRequest {
    /// Whether any of the point weights change
    pub fn touches_weights(&self) -> bool {
        self.points_kill.is_some()
            || self.points_revive.is_some()
            || self.points_redeploy.is_some()
            || self.points_gulag_win.is_some()
            || self.points_rage_quit.is_some()
            || self.points_execution.is_some()
            || self.points_humiliation.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ManageGameRequest {
    pub action: EventAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub event_id: Uuid,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
    pub effective_start_at: Option<chrono::NaiveDateTime>,
    pub ended_at: Option<chrono::NaiveDateTime>,
    pub points_kill: i32,
    pub points_revive: i32,
    pub points_redeploy: i32,
    pub points_gulag_win: i32,
    pub points_rage_quit: i32,
    pub points_execution: i32,
    pub points_humiliation: i32,
    pub num_games_planned: i32,
    pub top1_solo_ends_event: bool,
    pub selected_gage_id: Option<Uuid>,
    pub has_bonus_wheel: bool,
    pub has_kill_multipliers: bool,
    pub status: EventStatus,
    pub winner_id: Option<Uuid>,
}

impl From<MasterkillEvent> for EventResponse {
    fn from(event: MasterkillEvent) -> Self {
        Self {
            event_id: event.event_id,
            name: event.name,
            created_at: event.created_at,
            effective_start_at: event.effective_start_at,
            ended_at: event.ended_at,
            points_kill: event.points_kill,
            points_revive: event.points_revive,
            points_redeploy: event.points_redeploy,
            points_gulag_win: event.points_gulag_win,
            points_rage_quit: event.points_rage_quit,
            points_execution: event.points_execution,
            points_humiliation: event.points_humiliation,
            num_games_planned: event.num_games_planned,
            top1_solo_ends_event: event.top1_solo_ends_event,
            selected_gage_id: event.selected_gage_id,
            has_bonus_wheel: event.has_bonus_wheel,
            has_kill_multipliers: event.has_kill_multipliers,
            status: event.status,
            winner_id: event.winner_id,
        }
    }
}

/// The game an organizer should look at next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrentGameInfo {
    /// `None` for the placeholder of a game that does not exist yet
    pub game_id: Option<Uuid>,
    pub game_number: i32,
    pub status: GameStatus,
}

impl CurrentGameInfo {
    pub fn from_games(event_status: EventStatus, games: &[Game]) -> Option<Self> {
        let lowest_with = |status: GameStatus| {
            games
                .iter()
                .filter(|g| g.status == status)
                .min_by_key(|g| g.game_number)
        };

        if let Some(game) =
            lowest_with(GameStatus::Inprogress).or_else(|| lowest_with(GameStatus::Pending))
        {
            return Some(Self {
                game_id: Some(game.game_id),
                game_number: game.game_number,
                status: game.status,
            });
        }

        if event_status == EventStatus::Pending && games.is_empty() {
            return Some(Self {
                game_id: None,
                game_number: 1,
                status: GameStatus::Pending,
            });
        }

        None
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub participants: Vec<PlayerResponse>,
    pub games: Vec<GameResponse>,
    pub completed_games_count: i64,
    pub current_game: Option<CurrentGameInfo>,
    pub winner: Option<PlayerResponse>,
    pub gage: Option<GageResponse>,
}

fn default_name() -> String {
    "New Masterkill".to_string()
}

fn one() -> i32 {
    1
}

fn minus_one() -> i32 {
    -1
}

fn default_rage_quit() -> i32 {
    -5
}

fn default_games_planned() -> i32 {
    3
}

fn default_true() -> bool {
    true
}

fn validate_gamertags(gamertags: &[String]) -> Result<(), validator::ValidationError> {
    gamertags
        .iter()
        .try_for_each(|gamertag| validate_gamertag(gamertag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn game(number: i32, status: GameStatus) -> Game {
        let now = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(20, 0, 0))
            .unwrap();
        Game {
            game_id: Uuid::from_u128(number as u128),
            event_id: Uuid::nil(),
            game_number: number,
            status,
            start_time: None,
            end_time: None,
            kill_multiplier: Decimal::ONE,
            spawn_location: None,
            squad_leader_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_request_fills_defaults() {
        let req: CreateEventRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.name, "New Masterkill");
        assert_eq!(req.points_kill, 1);
        assert_eq!(req.points_redeploy, -1);
        assert_eq!(req.points_rage_quit, -5);
        assert_eq!(req.points_humiliation, -1);
        assert_eq!(req.num_games_planned, 3);
        assert!(req.has_bonus_wheel);
        assert!(!req.has_kill_multipliers);
        assert!(req.participant_gamertags.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_bad_values() {
        let req: CreateEventRequest =
            serde_json::from_str(r#"{"num_games_planned": 0, "participant_gamertags": ["ok", " "]}"#)
                .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("num_games_planned"));
        assert!(fields.contains_key("participant_gamertags"));
    }

    #[test]
    fn point_weights_are_bounded() {
        let req: CreateEventRequest =
            serde_json::from_str(r#"{"points_kill": 1000, "points_rage_quit": -1000}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: CreateEventRequest =
            serde_json::from_str(r#"{"points_revive": 2147483647, "points_humiliation": -1001}"#)
                .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("points_revive"));
        assert!(fields.contains_key("points_humiliation"));

        let update = UpdateEventRequest {
            points_redeploy: Some(5_000),
            ..UpdateEventRequest::default()
        };
        assert!(update.validate().unwrap_err().field_errors().contains_key("points_redeploy"));
    }

    #[test]
    fn current_game_prefers_running_then_pending() {
        let games = vec![
            game(1, GameStatus::Completed),
            game(2, GameStatus::Inprogress),
            game(3, GameStatus::Pending),
        ];
        let info = CurrentGameInfo::from_games(EventStatus::Inprogress, &games).unwrap();
        assert_eq!(info.game_number, 2);

        let games = vec![game(1, GameStatus::Completed), game(2, GameStatus::Pending)];
        let info = CurrentGameInfo::from_games(EventStatus::Inprogress, &games).unwrap();
        assert_eq!(info.game_id, Some(Uuid::from_u128(2)));
    }

    #[test]
    fn current_game_placeholder_for_fresh_event() {
        let info = CurrentGameInfo::from_games(EventStatus::Pending, &[]).unwrap();
        assert_eq!(info.game_id, None);
        assert_eq!(info.game_number, 1);

        let games = vec![game(1, GameStatus::Completed)];
        assert_eq!(CurrentGameInfo::from_games(EventStatus::Inprogress, &games), None);
    }
}
