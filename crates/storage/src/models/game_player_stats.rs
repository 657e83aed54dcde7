use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::scoring::StatLine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GulagStatus {
    #[default]
    NotPlayed,
    Won,
    Lost,
}

impl GulagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPlayed => "not_played",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl FromStr for GulagStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_played" => Ok(Self::NotPlayed),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("unknown gulag status '{}'", other)),
        }
    }
}

impl TryFrom<String> for GulagStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One player's counters in one game
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GamePlayerStats {
    pub stats_id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
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
    pub score: Decimal,
}

impl GamePlayerStats {
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
