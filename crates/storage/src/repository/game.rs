use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::game::UpdateGameRequest;
use crate::error::{Result, StorageError};
use crate::models::{Game, GameStatus};
use crate::repository::{event, stats};

pub(crate) const GAME_COLUMNS: &str = r#"
    game_id, event_id, game_number, status, start_time, end_time,
    kill_multiplier, spawn_location, squad_leader_id, created_at, updated_at
"#;

pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Game> {
        let mut conn = self.pool.acquire().await?;
        find(&mut conn, id, false).await
    }

    /// Games of an event in play order
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Game>> {
        let mut conn = self.pool.acquire().await?;
        list_for_event(&mut conn, event_id).await
    }

    pub async fn count_completed(&self, event_id: Uuid) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        count_completed(&mut conn, event_id).await
    }

    /// Override multiplier, spawn location or squad leader of an unfinished game
    pub async fn update_settings(&self, id: Uuid, req: &UpdateGameRequest) -> Result<Game> {
        let mut tx = self.pool.begin().await?;

        let existing = find(&mut tx, id, true).await?;
        if existing.status == GameStatus::Completed {
            return Err(StorageError::invalid_state(
                "A completed game can no longer be changed",
            ));
        }

        if let Some(leader) = req.squad_leader_id
            && !event::is_participant(&mut tx, existing.event_id, leader).await?
        {
            return Err(StorageError::invalid_state(
                "The squad leader must be a participant of this Masterkill",
            ));
        }

        let kill_multiplier = match req.kill_multiplier {
            Some(value) => Decimal::from_f64(value)
                .map(|d| d.round_dp(2))
                .ok_or_else(|| StorageError::invalid_state("Kill multiplier is not a number"))?,
            None => existing.kill_multiplier,
        };

        let spawn_location = match req.spawn_location.as_deref().map(str::trim) {
            None => existing.spawn_location.clone(),
            Some("") => None,
            Some(location) => Some(location.to_string()),
        };

        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            UPDATE games
            SET kill_multiplier = $2,
                spawn_location = $3,
                squad_leader_id = $4,
                updated_at = NOW()
            WHERE game_id = $1
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(kill_multiplier)
        .bind(spawn_location)
        .bind(req.squad_leader_id.or(existing.squad_leader_id))
        .fetch_one(&mut *tx)
        .await?;

        if kill_multiplier != existing.kill_multiplier {
            let owner = event::find(&mut tx, game.event_id, false).await?;
            stats::rescore_game(&mut tx, id, &owner.weights(), kill_multiplier).await?;
            tracing::info!(
                "Game {} kill multiplier set to {}",
                game.game_number,
                kill_multiplier
            );
        }

        tx.commit().await?;

        Ok(game)
    }
}

pub(crate) async fn find(conn: &mut PgConnection, id: Uuid, for_update: bool) -> Result<Game> {
    let lock = if for_update { " FOR UPDATE" } else { "" };

    sqlx::query_as::<_, Game>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE game_id = $1{lock}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(StorageError::NotFound)
}

pub(crate) async fn list_for_event(conn: &mut PgConnection, event_id: Uuid) -> Result<Vec<Game>> {
    let games = sqlx::query_as::<_, Game>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE event_id = $1 ORDER BY game_number"
    ))
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    Ok(games)
}

pub(crate) async fn count_completed(conn: &mut PgConnection, event_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM games WHERE event_id = $1 AND status = 'completed'",
    )
    .bind(event_id)
    .fetch_one(conn)
    .await?;

    Ok(count)
}

pub(crate) async fn insert(
    conn: &mut PgConnection,
    event_id: Uuid,
    game_number: i32,
    kill_multiplier: Decimal,
) -> Result<Game> {
    sqlx::query_as::<_, Game>(&format!(
        r#"
        INSERT INTO games (event_id, game_number, status, start_time, kill_multiplier)
        VALUES ($1, $2, 'inprogress', NOW(), $3)
        RETURNING {GAME_COLUMNS}
        "#
    ))
    .bind(event_id)
    .bind(game_number)
    .bind(kill_multiplier)
    .fetch_one(conn)
    .await
    .map_err(|e| StorageError::on_conflict(e, "This game number already exists"))
}

pub(crate) async fn set_status(conn: &mut PgConnection, id: Uuid, status: GameStatus) -> Result<Game> {
    let timestamp = match status {
        GameStatus::Inprogress => "start_time = NOW(),",
        GameStatus::Completed => "end_time = NOW(),",
        GameStatus::Pending => "",
    };

    sqlx::query_as::<_, Game>(&format!(
        r#"
        UPDATE games
        SET status = $2, {timestamp} updated_at = NOW()
        WHERE game_id = $1
        RETURNING {GAME_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or(StorageError::NotFound)
}
