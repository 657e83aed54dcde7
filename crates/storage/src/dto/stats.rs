use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::decimal_to_f64;
use crate::models::{EventStatus, GameStatus, GulagStatus};
use crate::services::scoring::StatLine;

/// Counters submitted for one player. Every field defaults to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct StatCounters {
    #[validate(range(min = 0, max = 1000))]
    pub kills: i32,
    #[validate(range(min = 0, max = 1000))]
    pub deaths: i32,
    #[validate(range(min = 0, max = 1000))]
    pub assists: i32,
    #[validate(range(min = 0, max = 1000))]
    pub revives_done: i32,
    pub gulag_status: GulagStatus,
    #[validate(range(min = 0, max = 1000))]
    pub executions_done: i32,
    #[validate(range(min = 0, max = 1000))]
    pub executions_suffered: i32,
    pub rage_quit: bool,
    #[validate(range(min = 0, max = 1000))]
    pub redeploys_received: i32,
}

impl StatCounters {
    pub fn stat_line(&self) -> StatLine {
        StatLine {
            kills: self.kills,
            revives_done: self.revives_done,
            gulag_status: self.gulag_status,
            executions_done: self.executions_done,
            executions_suffered: self.executions_suffered,
            redeploys_received: self.redeploys_received,
            rage_quit: self.rage_quit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlayerStatsInput {
    pub player_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub counters: StatCounters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompleteGameRequest {
    #[serde(default)]
    #[validate(nested)]
    pub player_stats: Vec<PlayerStatsInput>,

    /// Solo top 1 that ends the event when the event allows it
    pub top1_solo_player_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompleteGameResponse {
    pub message: String,
    pub game_id: Uuid,
    pub game_number: i32,
    pub game_status: GameStatus,
    pub event_status: EventStatus,
    pub event_ended: bool,
}

/// Stats row joined with the player's gamertag
#[derive(Debug, Clone, FromRow)]
pub struct PlayerStatsRow {
    pub stats_id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub gamertag: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub revives_done: i32,
    #[sqlx(try_from = "String")]
    pub gulag_status: GulagStatus,
    pub executions_done: i32,
    pub executions_suffered: i32,
    pub rage_quit: bool,
    pub redeploys_received: i32,
    pub score: rust_decimal::Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerStatsResponse {
    pub stats_id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub gamertag: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub revives_done: i32,
    pub gulag_status: GulagStatus,
    pub executions_done: i32,
    pub executions_suffered: i32,
    pub rage_quit: bool,
    pub redeploys_received: i32,
    pub score: f64,
}

impl From<PlayerStatsRow> for PlayerStatsResponse {
    fn from(row: PlayerStatsRow) -> Self {
        Self {
            stats_id: row.stats_id,
            game_id: row.game_id,
            player_id: row.player_id,
            gamertag: row.gamertag,
            kills: row.kills,
            deaths: row.deaths,
            assists: row.assists,
            revives_done: row.revives_done,
            gulag_status: row.gulag_status,
            executions_done: row.executions_done,
            executions_suffered: row.executions_suffered,
            rage_quit: row.rage_quit,
            redeploys_received: row.redeploys_received,
            score: decimal_to_f64(row.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_stats_input_accepts_partial_payloads() {
        let input: PlayerStatsInput = serde_json::from_str(
            r#"{"player_id": "00000000-0000-0000-0000-000000000001", "kills": 7, "gulag_status": "won"}"#,
        )
        .unwrap();

        assert_eq!(input.counters.kills, 7);
        assert_eq!(input.counters.deaths, 0);
        assert_eq!(input.counters.gulag_status, GulagStatus::Won);
        assert!(!input.counters.rage_quit);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_counters_fail_validation() {
        let counters = StatCounters {
            kills: -1,
            ..StatCounters::default()
        };
        assert!(counters.validate().is_err());
    }

    #[test]
    fn unknown_gulag_status_is_rejected() {
        let parsed = serde_json::from_str::<StatCounters>(r#"{"gulag_status": "draw"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn counters_are_capped_so_scores_fit_the_column() {
        let at_cap = StatCounters {
            kills: 1_000,
            revives_done: 1_000,
            redeploys_received: 1_000,
            ..StatCounters::default()
        };
        assert!(at_cap.validate().is_ok());

        let huge = StatCounters {
            kills: 200_000_000,
            ..StatCounters::default()
        };
        let errors = huge.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("kills"));

        let overflow = StatCounters {
            executions_done: i32::MAX,
            ..StatCounters::default()
        };
        assert!(overflow.validate().is_err());
    }
}
