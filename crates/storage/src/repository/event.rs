use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::event::{CreateEventRequest, UpdateEventRequest};
use crate::error::{Result, StorageError};
use crate::models::{MasterkillEvent, Player};
use crate::repository::{gage, game, player, stats};
use crate::services::lifecycle::check_planned_count;

pub(crate) const EVENT_COLUMNS: &str = r#"
    event_id, name, created_at, effective_start_at, ended_at,
    points_kill, points_revive, points_redeploy, points_gulag_win,
    points_rage_quit, points_execution, points_humiliation,
    num_games_planned, top1_solo_ends_event, selected_gage_id,
    has_bonus_wheel, has_kill_multipliers, status, winner_id
"#;

/// Repository for Masterkill event database operations
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all events, newest first
    pub async fn list(&self) -> Result<Vec<MasterkillEvent>> {
        let events = sqlx::query_as::<_, MasterkillEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM masterkill_events ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<MasterkillEvent> {
        let mut conn = self.pool.acquire().await?;
        find(&mut conn, id, false).await
    }

    /// Participants of an event, alphabetically
    pub async fn participants(&self, id: Uuid) -> Result<Vec<Player>> {
        let mut conn = self.pool.acquire().await?;
        participants(&mut conn, id).await
    }

    pub async fn is_participant(&self, event_id: Uuid, player_id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        is_participant(&mut conn, event_id, player_id).await
    }

    /// Create an event together with its participants and optional gage
    pub async fn create(&self, req: &CreateEventRequest) -> Result<MasterkillEvent> {
        let mut tx = self.pool.begin().await?;

        let gage_id = match req.custom_gage_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(gage::get_or_create(&mut tx, text).await?.gage_id),
            _ => None,
        };

        let event = sqlx::query_as::<_, MasterkillEvent>(&format!(
            r#"
            INSERT INTO masterkill_events (
                name, points_kill, points_revive, points_redeploy, points_gulag_win,
                points_rage_quit, points_execution, points_humiliation,
                num_games_planned, top1_solo_ends_event, selected_gage_id,
                has_bonus_wheel, has_kill_multipliers
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(req.points_kill)
        .bind(req.points_revive)
        .bind(req.points_redeploy)
        .bind(req.points_gulag_win)
        .bind(req.points_rage_quit)
        .bind(req.points_execution)
        .bind(req.points_humiliation)
        .bind(req.num_games_planned)
        .bind(req.top1_solo_ends_event)
        .bind(gage_id)
        .bind(req.has_bonus_wheel)
        .bind(req.has_kill_multipliers)
        .fetch_one(&mut *tx)
        .await?;

        set_participants(&mut tx, event.event_id, &req.participant_gamertags).await?;

        tx.commit().await?;

        tracing::info!(
            "Created Masterkill '{}' ({}) with {} participants",
            event.name,
            event.event_id,
            req.participant_gamertags.len()
        );

        Ok(event)
    }

    /// Apply a partial update.
    ///
    /// Changing point weights rescores every stats row of the event.
    pub async fn update(&self, id: Uuid, req: &UpdateEventRequest) -> Result<MasterkillEvent> {
        let mut tx = self.pool.begin().await?;

        let existing = find(&mut tx, id, true).await?;

        let selected_gage_id = match req.custom_gage_text.as_deref().map(str::trim) {
            None => existing.selected_gage_id,
            Some("") => None,
            Some(text) => Some(gage::get_or_create(&mut tx, text).await?.gage_id),
        };

        if let Some(planned) = req.num_games_planned {
            let completed = game::count_completed(&mut tx, id).await?;
            check_planned_count(existing.status, completed, planned)?;
        }

        if let Some(winner_id) = req.winner_id
            && !is_participant(&mut tx, id, winner_id).await?
        {
            return Err(StorageError::invalid_state(
                "The winner must be a participant of this Masterkill",
            ));
        }

        let event = sqlx::query_as::<_, MasterkillEvent>(&format!(
            r#"
            UPDATE masterkill_events
            SET
                name = $2,
                points_kill = $3,
                points_revive = $4,
                points_redeploy = $5,
                points_gulag_win = $6,
                points_rage_quit = $7,
                points_execution = $8,
                points_humiliation = $9,
                num_games_planned = $10,
                top1_solo_ends_event = $11,
                selected_gage_id = $12,
                has_bonus_wheel = $13,
                has_kill_multipliers = $14,
                winner_id = $15
            WHERE event_id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(req.points_kill.unwrap_or(existing.points_kill))
        .bind(req.points_revive.unwrap_or(existing.points_revive))
        .bind(req.points_redeploy.unwrap_or(existing.points_redeploy))
        .bind(req.points_gulag_win.unwrap_or(existing.points_gulag_win))
        .bind(req.points_rage_quit.unwrap_or(existing.points_rage_quit))
        .bind(req.points_execution.unwrap_or(existing.points_execution))
        .bind(req.points_humiliation.unwrap_or(existing.points_humiliation))
        .bind(req.num_games_planned.unwrap_or(existing.num_games_planned))
        .bind(req.top1_solo_ends_event.unwrap_or(existing.top1_solo_ends_event))
        .bind(selected_gage_id)
        .bind(req.has_bonus_wheel.unwrap_or(existing.has_bonus_wheel))
        .bind(req.has_kill_multipliers.unwrap_or(existing.has_kill_multipliers))
        .bind(req.winner_id.or(existing.winner_id))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref gamertags) = req.participant_gamertags {
            set_participants(&mut tx, id, gamertags).await?;
        }

        if req.touches_weights() {
            let rescored = stats::rescore_event(&mut tx, &event).await?;
            tracing::info!("Rescored {} stats rows of event {}", rescored, id);
        }

        tx.commit().await?;

        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM masterkill_events WHERE event_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

/// Load an event, optionally locking its row for the rest of the transaction
pub(crate) async fn find(
    conn: &mut PgConnection,
    id: Uuid,
    for_update: bool,
) -> Result<MasterkillEvent> {
    let lock = if for_update { " FOR UPDATE" } else { "" };

    sqlx::query_as::<_, MasterkillEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM masterkill_events WHERE event_id = $1{lock}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(StorageError::NotFound)
}

pub(crate) async fn participants(conn: &mut PgConnection, event_id: Uuid) -> Result<Vec<Player>> {
    let players = sqlx::query_as::<_, Player>(
        r#"
        SELECT p.player_id, p.gamertag, p.created_at
        FROM event_participants ep
        INNER JOIN players p ON p.player_id = ep.player_id
        WHERE ep.event_id = $1
        ORDER BY LOWER(p.gamertag)
        "#,
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;

    Ok(players)
}

pub(crate) async fn is_participant(
    conn: &mut PgConnection,
    event_id: Uuid,
    player_id: Uuid,
) -> Result<bool> {
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM event_participants WHERE event_id = $1 AND player_id = $2)",
    )
    .bind(event_id)
    .bind(player_id)
    .fetch_one(conn)
    .await?;

    Ok(found)
}

/// Replace the participant set; blank gamertags are skipped
async fn set_participants(conn: &mut PgConnection, event_id: Uuid, gamertags: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM event_participants WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    for gamertag in gamertags.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        let player = player::get_or_create(&mut *conn, gamertag).await?;

        sqlx::query(
            r#"
            INSERT INTO event_participants (event_id, player_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(player.player_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
