use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::stats::{PlayerStatsRow, StatCounters};
use crate::error::Result;
use crate::models::{GamePlayerStats, MasterkillEvent};
use crate::services::scoring::{ScoreWeights, compute_score};

const STATS_COLUMNS: &str = r#"
    stats_id, game_id, player_id, kills, deaths, assists, revives_done,
    gulag_status, executions_done, executions_suffered, rage_quit,
    redeploys_received, score
"#;

pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stats rows of a game with gamertags, best score first
    pub async fn list_for_game(&self, game_id: Uuid) -> Result<Vec<PlayerStatsRow>> {
        let rows = sqlx::query_as::<_, PlayerStatsRow>(
            r#"
            SELECT s.stats_id, s.game_id, s.player_id, p.gamertag, s.kills, s.deaths,
                   s.assists, s.revives_done, s.gulag_status, s.executions_done,
                   s.executions_suffered, s.rage_quit, s.redeploys_received, s.score
            FROM game_player_stats s
            INNER JOIN players p ON p.player_id = s.player_id
            WHERE s.game_id = $1
            ORDER BY s.score DESC, LOWER(p.gamertag)
            "#,
        )
        .bind(game_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_row(&self, game_id: Uuid, player_id: Uuid) -> Result<Option<PlayerStatsRow>> {
        let row = sqlx::query_as::<_, PlayerStatsRow>(
            r#"
            SELECT s.stats_id, s.game_id, s.player_id, p.gamertag, s.kills, s.deaths,
                   s.assists, s.revives_done, s.gulag_status, s.executions_done,
                   s.executions_suffered, s.rage_quit, s.redeploys_received, s.score
            FROM game_player_stats s
            INNER JOIN players p ON p.player_id = s.player_id
            WHERE s.game_id = $1 AND s.player_id = $2
            "#,
        )
        .bind(game_id)
        .bind(player_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

/// Insert or overwrite the single stats row of (game, player) with a fresh score
pub(crate) async fn upsert(
    conn: &mut PgConnection,
    game_id: Uuid,
    player_id: Uuid,
    counters: &StatCounters,
    weights: &ScoreWeights,
    kill_multiplier: Decimal,
) -> Result<GamePlayerStats> {
    let score = compute_score(&counters.stat_line(), weights, kill_multiplier);

    let stats = sqlx::query_as::<_, GamePlayerStats>(&format!(
        r#"
        INSERT INTO game_player_stats (
            game_id, player_id, kills, deaths, assists, revives_done, gulag_status,
            executions_done, executions_suffered, rage_quit, redeploys_received, score
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (game_id, player_id) DO UPDATE SET
            kills = EXCLUDED.kills,
            deaths = EXCLUDED.deaths,
            assists = EXCLUDED.assists,
            revives_done = EXCLUDED.revives_done,
            gulag_status = EXCLUDED.gulag_status,
            executions_done = EXCLUDED.executions_done,
            executions_suffered = EXCLUDED.executions_suffered,
            rage_quit = EXCLUDED.rage_quit,
            redeploys_received = EXCLUDED.redeploys_received,
            score = EXCLUDED.score
        RETURNING {STATS_COLUMNS}
        "#
    ))
    .bind(game_id)
    .bind(player_id)
    .bind(counters.kills)
    .bind(counters.deaths)
    .bind(counters.assists)
    .bind(counters.revives_done)
    .bind(counters.gulag_status.as_str())
    .bind(counters.executions_done)
    .bind(counters.executions_suffered)
    .bind(counters.rage_quit)
    .bind(counters.redeploys_received)
    .bind(score)
    .fetch_one(conn)
    .await?;

    Ok(stats)
}

/// Which log-driven counter to bump
#[derive(Debug, Clone, Copy)]
pub(crate) enum Tally {
    RedeployReceived,
    ReviveDone,
}

impl Tally {
    fn column(&self) -> &'static str {
        match self {
            Self::RedeployReceived => "redeploys_received",
            Self::ReviveDone => "revives_done",
        }
    }
}

/// Add one to a counter, creating the stats row if needed, then rescore it
pub(crate) async fn increment(
    conn: &mut PgConnection,
    game_id: Uuid,
    player_id: Uuid,
    tally: Tally,
    weights: &ScoreWeights,
    kill_multiplier: Decimal,
) -> Result<GamePlayerStats> {
    let column = tally.column();

    let stats = sqlx::query_as::<_, GamePlayerStats>(&format!(
        r#"
        INSERT INTO game_player_stats (game_id, player_id, {column})
        VALUES ($1, $2, 1)
        ON CONFLICT (game_id, player_id) DO UPDATE SET
            {column} = game_player_stats.{column} + 1
        RETURNING {STATS_COLUMNS}
        "#
    ))
    .bind(game_id)
    .bind(player_id)
    .fetch_one(&mut *conn)
    .await?;

    store_score(conn, &stats, weights, kill_multiplier).await
}

/// Recompute every stats row of one game
pub(crate) async fn rescore_game(
    conn: &mut PgConnection,
    game_id: Uuid,
    weights: &ScoreWeights,
    kill_multiplier: Decimal,
) -> Result<Vec<GamePlayerStats>> {
    let rows = sqlx::query_as::<_, GamePlayerStats>(&format!(
        "SELECT {STATS_COLUMNS} FROM game_player_stats WHERE game_id = $1"
    ))
    .bind(game_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut rescored = Vec::with_capacity(rows.len());
    for row in rows {
        rescored.push(store_score(&mut *conn, &row, weights, kill_multiplier).await?);
    }

    Ok(rescored)
}

/// Recompute every stats row of an event after its weights changed
pub(crate) async fn rescore_event(conn: &mut PgConnection, event: &MasterkillEvent) -> Result<usize> {
    let games = sqlx::query_as::<_, (Uuid, Decimal)>(
        "SELECT game_id, kill_multiplier FROM games WHERE event_id = $1",
    )
    .bind(event.event_id)
    .fetch_all(&mut *conn)
    .await?;

    let weights = event.weights();
    let mut total = 0;
    for (game_id, kill_multiplier) in games {
        total += rescore_game(&mut *conn, game_id, &weights, kill_multiplier)
            .await?
            .len();
    }

    Ok(total)
}

async fn store_score(
    conn: &mut PgConnection,
    stats: &GamePlayerStats,
    weights: &ScoreWeights,
    kill_multiplier: Decimal,
) -> Result<GamePlayerStats> {
    let score = compute_score(&stats.stat_line(), weights, kill_multiplier);
    if score == stats.score {
        return Ok(stats.clone());
    }

    let updated = sqlx::query_as::<_, GamePlayerStats>(&format!(
        "UPDATE game_player_stats SET score = $2 WHERE stats_id = $1 RETURNING {STATS_COLUMNS}"
    ))
    .bind(stats.stats_id)
    .bind(score)
    .fetch_one(conn)
    .await?;

    Ok(updated)
}
