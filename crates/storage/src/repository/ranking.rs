use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::common::{PaginationParams, PlayerInfo, decimal_to_f64};
use crate::dto::ranking::{
    AggregatedPlayerStats, AllTimeRankingEntry, GameScoresResponse, SpawnKills, cumulative_series,
    kd_ratio,
};
use crate::error::Result;
use crate::repository::event;
use crate::services::lifecycle::Standing;

#[derive(FromRow)]
struct AggregateRow {
    player_id: Uuid,
    gamertag: String,
    total_kills: i64,
    total_deaths: i64,
    total_assists: i64,
    total_gulag_wins: i64,
    total_revives_done: i64,
    total_executions_done: i64,
    total_executions_suffered: i64,
    total_rage_quits: i64,
    total_redeploys_received: i64,
    total_score: Decimal,
    bonus_points: i64,
    games_played: i64,
}

#[derive(FromRow)]
struct AllTimeRow {
    rank: i64,
    player_id: Uuid,
    gamertag: String,
    total_score: Decimal,
    total_kills: i64,
    total_deaths: i64,
    total_assists: i64,
    total_revives_done: i64,
    total_gulag_wins: i64,
    total_rage_quits: i64,
    total_redeploys: i64,
    games_played: i64,
    events_won: i64,
}

pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Per-participant totals over the completed games of an event
    pub async fn event_aggregates(&self, event_id: Uuid) -> Result<Vec<AggregatedPlayerStats>> {
        let mut conn = self.pool.acquire().await?;
        event::find(&mut conn, event_id, false).await?;

        let rows = aggregate_rows(&mut conn, event_id).await?;

        let mut aggregates: Vec<AggregatedPlayerStats> = rows
            .into_iter()
            .map(|row| {
                let grand_total = row.total_score + Decimal::from(row.bonus_points);
                AggregatedPlayerStats {
                    player: PlayerInfo {
                        player_id: row.player_id,
                        gamertag: row.gamertag,
                    },
                    total_kills: row.total_kills,
                    total_deaths: row.total_deaths,
                    total_assists: row.total_assists,
                    total_gulag_wins: row.total_gulag_wins,
                    total_revives_done: row.total_revives_done,
                    total_executions_done: row.total_executions_done,
                    total_executions_suffered: row.total_executions_suffered,
                    total_rage_quits: row.total_rage_quits,
                    total_redeploys_received: row.total_redeploys_received,
                    total_score_from_games: decimal_to_f64(row.total_score),
                    bonus_points: row.bonus_points,
                    grand_total: decimal_to_f64(grand_total),
                    games_played: row.games_played,
                }
            })
            .collect();

        aggregates.sort_by(|a, b| b.grand_total.total_cmp(&a.grand_total));

        Ok(aggregates)
    }

    /// Cumulative score series of every participant across planned games
    pub async fn event_game_scores(&self, event_id: Uuid) -> Result<GameScoresResponse> {
        let mut conn = self.pool.acquire().await?;
        let owner = event::find(&mut conn, event_id, false).await?;
        let participants = event::participants(&mut conn, event_id).await?;

        let scores = sqlx::query_as::<_, (Uuid, i32, Decimal)>(
            r#"
            SELECT s.player_id, g.game_number, s.score
            FROM game_player_stats s
            INNER JOIN games g ON g.game_id = s.game_id
            WHERE g.event_id = $1 AND g.status = 'completed'
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_player: HashMap<Uuid, HashMap<i32, Decimal>> = HashMap::new();
        for (player_id, game_number, score) in scores {
            by_player
                .entry(player_id)
                .or_default()
                .insert(game_number, score);
        }

        let empty = HashMap::new();
        let player_scores_per_game = participants
            .iter()
            .map(|p| {
                let games = by_player.get(&p.player_id).unwrap_or(&empty);
                (
                    p.player_id.to_string(),
                    cumulative_series(owner.num_games_planned, games),
                )
            })
            .collect();

        Ok(GameScoresResponse {
            event_id: owner.event_id,
            event_name: owner.name,
            num_games_planned: owner.num_games_planned,
            participants: participants
                .into_iter()
                .map(|p| PlayerInfo {
                    player_id: p.player_id,
                    gamertag: p.gamertag,
                })
                .collect(),
            player_scores_per_game,
        })
    }

    /// Kills per spawn location over the completed games of an event
    pub async fn kills_by_spawn(&self, event_id: Uuid) -> Result<Vec<SpawnKills>> {
        let mut conn = self.pool.acquire().await?;
        event::find(&mut conn, event_id, false).await?;

        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT COALESCE(NULLIF(TRIM(g.spawn_location), ''), 'unknown') AS spawn_location,
                   COALESCE(SUM(s.kills), 0)::BIGINT AS total_kills,
                   COUNT(DISTINCT g.game_id) AS games
            FROM games g
            LEFT JOIN game_player_stats s ON s.game_id = g.game_id
            WHERE g.event_id = $1 AND g.status = 'completed'
            GROUP BY 1
            ORDER BY total_kills DESC, spawn_location
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(spawn_location, total_kills, games)| SpawnKills {
                spawn_location,
                total_kills,
                games,
            })
            .collect())
    }

    /// Ranking of every player over all completed games, best total score first
    pub async fn all_time(
        &self,
        pagination: &PaginationParams,
    ) -> Result<(Vec<AllTimeRankingEntry>, i64)> {
        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT s.player_id)
            FROM game_player_stats s
            INNER JOIN games g ON g.game_id = s.game_id
            WHERE g.status = 'completed'
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AllTimeRow>(
            r#"
            WITH totals AS (
                SELECT
                    p.player_id,
                    p.gamertag,
                    COALESCE(SUM(s.score), 0) AS total_score,
                    COALESCE(SUM(s.kills), 0)::BIGINT AS total_kills,
                    COALESCE(SUM(s.deaths), 0)::BIGINT AS total_deaths,
                    COALESCE(SUM(s.assists), 0)::BIGINT AS total_assists,
                    COALESCE(SUM(s.revives_done), 0)::BIGINT AS total_revives_done,
                    COUNT(*) FILTER (WHERE s.gulag_status = 'won') AS total_gulag_wins,
                    COUNT(*) FILTER (WHERE s.rage_quit) AS total_rage_quits,
                    COALESCE(SUM(s.redeploys_received), 0)::BIGINT AS total_redeploys,
                    COUNT(DISTINCT s.game_id) AS games_played,
                    (
                        SELECT COUNT(*)
                        FROM masterkill_events e
                        WHERE e.winner_id = p.player_id AND e.status = 'completed'
                    ) AS events_won
                FROM players p
                INNER JOIN game_player_stats s ON s.player_id = p.player_id
                INNER JOIN games g ON g.game_id = s.game_id
                WHERE g.status = 'completed'
                GROUP BY p.player_id, p.gamertag
            ),
            ranked AS (
                SELECT *, ROW_NUMBER() OVER (ORDER BY total_score DESC, LOWER(gamertag)) AS rank
                FROM totals
            )
            SELECT * FROM ranked
            ORDER BY rank
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| AllTimeRankingEntry {
                rank: row.rank,
                player_id: row.player_id,
                gamertag: row.gamertag,
                total_score: decimal_to_f64(row.total_score),
                total_kills: row.total_kills,
                total_deaths: row.total_deaths,
                total_assists: row.total_assists,
                total_revives_done: row.total_revives_done,
                total_gulag_wins: row.total_gulag_wins,
                total_rage_quits: row.total_rage_quits,
                total_redeploys: row.total_redeploys,
                games_played: row.games_played,
                events_won: row.events_won,
                kd_ratio: kd_ratio(row.total_kills, row.total_deaths),
            })
            .collect();

        Ok((entries, total_items))
    }
}

/// Standings used to pick an event winner
pub(crate) async fn standings(conn: &mut PgConnection, event_id: Uuid) -> Result<Vec<Standing>> {
    let rows = aggregate_rows(conn, event_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| Standing {
            player_id: row.player_id,
            gamertag: row.gamertag,
            total: row.total_score + Decimal::from(row.bonus_points),
            deaths: row.total_deaths,
        })
        .collect())
}

async fn aggregate_rows(conn: &mut PgConnection, event_id: Uuid) -> Result<Vec<AggregateRow>> {
    let rows = sqlx::query_as::<_, AggregateRow>(
        r#"
        WITH game_totals AS (
            SELECT
                s.player_id,
                COALESCE(SUM(s.kills), 0)::BIGINT AS total_kills,
                COALESCE(SUM(s.deaths), 0)::BIGINT AS total_deaths,
                COALESCE(SUM(s.assists), 0)::BIGINT AS total_assists,
                COUNT(*) FILTER (WHERE s.gulag_status = 'won') AS total_gulag_wins,
                COALESCE(SUM(s.revives_done), 0)::BIGINT AS total_revives_done,
                COALESCE(SUM(s.executions_done), 0)::BIGINT AS total_executions_done,
                COALESCE(SUM(s.executions_suffered), 0)::BIGINT AS total_executions_suffered,
                COUNT(*) FILTER (WHERE s.rage_quit) AS total_rage_quits,
                COALESCE(SUM(s.redeploys_received), 0)::BIGINT AS total_redeploys_received,
                COALESCE(SUM(s.score), 0) AS total_score,
                COUNT(DISTINCT s.game_id) AS games_played
            FROM game_player_stats s
            INNER JOIN games g ON g.game_id = s.game_id
            WHERE g.event_id = $1 AND g.status = 'completed'
            GROUP BY s.player_id
        ),
        bonus_totals AS (
            SELECT player_id, COALESCE(SUM(points), 0)::BIGINT AS bonus_points
            FROM bonus_awards
            WHERE event_id = $1
            GROUP BY player_id
        )
        SELECT
            p.player_id,
            p.gamertag,
            COALESCE(gt.total_kills, 0) AS total_kills,
            COALESCE(gt.total_deaths, 0) AS total_deaths,
            COALESCE(gt.total_assists, 0) AS total_assists,
            COALESCE(gt.total_gulag_wins, 0) AS total_gulag_wins,
            COALESCE(gt.total_revives_done, 0) AS total_revives_done,
            COALESCE(gt.total_executions_done, 0) AS total_executions_done,
            COALESCE(gt.total_executions_suffered, 0) AS total_executions_suffered,
            COALESCE(gt.total_rage_quits, 0) AS total_rage_quits,
            COALESCE(gt.total_redeploys_received, 0) AS total_redeploys_received,
            COALESCE(gt.total_score, 0) AS total_score,
            COALESCE(bt.bonus_points, 0) AS bonus_points,
            COALESCE(gt.games_played, 0) AS games_played
        FROM event_participants ep
        INNER JOIN players p ON p.player_id = ep.player_id
        LEFT JOIN game_totals gt ON gt.player_id = ep.player_id
        LEFT JOIN bonus_totals bt ON bt.player_id = ep.player_id
        WHERE ep.event_id = $1
        ORDER BY LOWER(p.gamertag)
        "#,
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}
