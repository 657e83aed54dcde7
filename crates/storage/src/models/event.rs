use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::scoring::ScoreWeights;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pending,
    Inprogress,
    Paused,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Inprogress => "inprogress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled events accept no further games
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::Inprogress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown event status '{}'", other)),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MasterkillEvent {
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

    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub winner_id: Option<Uuid>,
}

impl MasterkillEvent {
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            kill: self.points_kill,
            revive: self.points_revive,
            gulag_win: self.points_gulag_win,
            execution: self.points_execution,
            humiliation: self.points_humiliation,
            redeploy: self.points_redeploy,
            rage_quit: self.points_rage_quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            EventStatus::Pending,
            EventStatus::Inprogress,
            EventStatus::Paused,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>(), Ok(status));
        }
        assert!("running".parse::<EventStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&EventStatus::Inprogress).unwrap();
        assert_eq!(json, "\"inprogress\"");
    }
}
