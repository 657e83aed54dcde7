use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{PlayerInfo, decimal_to_f64};

/// One participant's totals over an event's completed games
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AggregatedPlayerStats {
    pub player: PlayerInfo,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub total_gulag_wins: i64,
    pub total_revives_done: i64,
    pub total_executions_done: i64,
    pub total_executions_suffered: i64,
    pub total_rage_quits: i64,
    pub total_redeploys_received: i64,
    pub total_score_from_games: f64,
    pub bonus_points: i64,
    /// Game scores plus bonus awards
    pub grand_total: f64,
    pub games_played: i64,
}

/// Cumulative score after each planned game, per participant
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameScoresResponse {
    pub event_id: Uuid,
    pub event_name: String,
    pub num_games_planned: i32,
    pub participants: Vec<PlayerInfo>,
    /// Keyed by player id
    pub player_scores_per_game: BTreeMap<String, Vec<f64>>,
}

/// Running total over game numbers `1..=planned`; missing games add nothing
pub fn cumulative_series(planned: i32, scores_by_game: &HashMap<i32, Decimal>) -> Vec<f64> {
    let mut running = Decimal::ZERO;
    (1..=planned)
        .map(|number| {
            running += scores_by_game.get(&number).copied().unwrap_or_default();
            decimal_to_f64(running)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpawnKills {
    pub spawn_location: String,
    pub total_kills: i64,
    pub games: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllTimeRankingEntry {
    pub rank: i64,
    pub player_id: Uuid,
    pub gamertag: String,
    pub total_score: f64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub total_revives_done: i64,
    pub total_gulag_wins: i64,
    pub total_rage_quits: i64,
    pub total_redeploys: i64,
    pub games_played: i64,
    pub events_won: i64,
    pub kd_ratio: f64,
}

/// Kills per death rounded to two decimals; kills alone when deathless
pub fn kd_ratio(kills: i64, deaths: i64) -> f64 {
    if deaths > 0 {
        ((kills as f64 / deaths as f64) * 100.0).round() / 100.0
    } else {
        kills as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kd_ratio_rounds_and_handles_zero_deaths() {
        assert_eq!(kd_ratio(10, 4), 2.5);
        assert_eq!(kd_ratio(2, 3), 0.67);
        assert_eq!(kd_ratio(7, 0), 7.0);
        assert_eq!(kd_ratio(0, 0), 0.0);
    }

    #[test]
    fn cumulative_series_skips_unplayed_games() {
        let scores = HashMap::from([(1, dec!(5)), (3, dec!(2.5))]);
        assert_eq!(cumulative_series(4, &scores), vec![5.0, 5.0, 7.5, 7.5]);
        assert!(cumulative_series(0, &scores).is_empty());
    }
}
