//! Transactional game flow: starting games, completing them and moving the
//! event through its statuses.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::stats::{CompleteGameRequest, CompleteGameResponse, PlayerStatsRow, StatCounters};
use crate::error::{Result, StorageError};
use crate::models::{EventStatus, Game, GameStatus, MasterkillEvent};
use crate::repository::event::{self, EVENT_COLUMNS};
use crate::repository::stats::StatsRepository;
use crate::repository::{game, player, ranking, stats};
use crate::services::lifecycle::{
    Completion, Ending, EventAction, GameSlot, NextGame, ensure_stats_editable, finish,
    pick_winner, plan_next_game, roll_kill_multiplier, transition,
};

/// Result of a manage-game action
#[derive(Debug)]
pub enum ManageOutcome {
    /// `start_next_game`; `created` is false when an existing game was returned or resumed
    Game { game: Game, created: bool },
    /// pause, resume or cancel
    Event(MasterkillEvent),
}

pub async fn manage_event(
    pool: &PgPool,
    event_id: Uuid,
    action: EventAction,
) -> Result<ManageOutcome> {
    match action {
        EventAction::StartNextGame => {
            let (game, created) = start_next_game(pool, event_id).await?;
            Ok(ManageOutcome::Game { game, created })
        }
        other => Ok(ManageOutcome::Event(change_status(pool, event_id, other).await?)),
    }
}

/// Hand back the running game, start the pending one or create the next one
pub async fn start_next_game(pool: &PgPool, event_id: Uuid) -> Result<(Game, bool)> {
    let mut tx = pool.begin().await?;

    let owner = event::find(&mut tx, event_id, true).await?;
    let games = game::list_for_event(&mut tx, event_id).await?;
    let slots: Vec<GameSlot> = games.iter().map(GameSlot::from).collect();

    let plan = plan_next_game(owner.status, &slots, owner.num_games_planned)?;

    let (started, created) = match plan {
        NextGame::AlreadyRunning(game_id) => {
            let running = games
                .into_iter()
                .find(|g| g.game_id == game_id)
                .ok_or(StorageError::NotFound)?;
            (running, false)
        }
        NextGame::StartPending(game_id) => {
            (game::set_status(&mut tx, game_id, GameStatus::Inprogress).await?, false)
        }
        NextGame::Create(game_number) => {
            let kill_multiplier = roll_kill_multiplier(owner.has_kill_multipliers, &mut rand::rng());
            let inserted = game::insert(&mut tx, event_id, game_number, kill_multiplier).await?;
            (inserted, true)
        }
    };

    if owner.status == EventStatus::Pending {
        sqlx::query(
            r#"
            UPDATE masterkill_events
            SET status = 'inprogress',
                effective_start_at = COALESCE(effective_start_at, NOW())
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    if created {
        tracing::info!(
            "Started game {} of event {} (kill multiplier {})",
            started.game_number,
            event_id,
            started.kill_multiplier
        );
    }

    Ok((started, created))
}

/// Apply pause, resume or cancel
pub async fn change_status(
    pool: &PgPool,
    event_id: Uuid,
    action: EventAction,
) -> Result<MasterkillEvent> {
    let mut tx = pool.begin().await?;

    let owner = event::find(&mut tx, event_id, true).await?;
    let next = transition(owner.status, action)?;

    let updated = set_event_status(&mut tx, event_id, next, owner.winner_id).await?;

    tx.commit().await?;

    tracing::info!("Event {} moved from {} to {}", event_id, owner.status, next);

    Ok(updated)
}

/// Finalize a running game and close the event once its plan is exhausted
pub async fn complete_game(
    pool: &PgPool,
    game_id: Uuid,
    req: &CompleteGameRequest,
) -> Result<CompleteGameResponse> {
    let mut tx = pool.begin().await?;

    // Event lock first, same order as start_next_game
    let event_id = game::find(&mut tx, game_id, false).await?.event_id;
    let owner = event::find(&mut tx, event_id, true).await?;
    let current = game::find(&mut tx, game_id, true).await?;

    if current.status == GameStatus::Completed {
        return Err(StorageError::invalid_state("This game is already completed"));
    }
    if owner.status != EventStatus::Inprogress {
        return Err(StorageError::invalid_state(format!(
            "The Masterkill is {}, not in progress",
            owner.status
        )));
    }

    let weights = owner.weights();
    for entry in &req.player_stats {
        if !player::exists(&mut tx, entry.player_id).await? {
            tracing::warn!(
                "Skipping stats for unknown player {} in game {}",
                entry.player_id,
                game_id
            );
            continue;
        }
        stats::upsert(
            &mut tx,
            game_id,
            entry.player_id,
            &entry.counters,
            &weights,
            current.kill_multiplier,
        )
        .await?;
    }

    let completed = game::set_status(&mut tx, game_id, GameStatus::Completed).await?;
    stats::rescore_game(&mut tx, game_id, &weights, completed.kill_multiplier).await?;

    let completed_games = game::count_completed(&mut tx, event_id).await?;

    let solo_winner = match req.top1_solo_player_id {
        Some(player_id) if owner.top1_solo_ends_event => {
            if event::is_participant(&mut tx, event_id, player_id).await? {
                Some(player_id)
            } else {
                tracing::warn!(
                    "Ignoring top 1 solo player {} who is not a participant of event {}",
                    player_id,
                    event_id
                );
                None
            }
        }
        _ => None,
    };

    let ending = finish(&Completion {
        completed_games,
        planned: owner.num_games_planned,
        top1_solo_ends_event: owner.top1_solo_ends_event,
        solo_winner,
        manual_winner: owner.winner_id,
    });
    let event_ended = ending.is_over();

    let winner_id = match ending {
        Ending::Continue => None,
        Ending::Decided(player_id) => Some(player_id),
        Ending::FromStandings => pick_winner(&ranking::standings(&mut tx, event_id).await?),
    };

    let event_status = if event_ended {
        set_event_status(&mut tx, event_id, EventStatus::Completed, winner_id)
            .await?
            .status
    } else {
        owner.status
    };

    tx.commit().await?;

    let message = if event_ended {
        tracing::info!(
            "Game {} completed; event {} is over after {} games",
            completed.game_number,
            event_id,
            completed_games
        );
        format!("Game {} completed. The Masterkill is over!", completed.game_number)
    } else {
        tracing::info!(
            "Game {} of event {} completed ({}/{})",
            completed.game_number,
            event_id,
            completed_games,
            owner.num_games_planned
        );
        format!("Game {} completed", completed.game_number)
    };

    Ok(CompleteGameResponse {
        message,
        game_id: completed.game_id,
        game_number: completed.game_number,
        game_status: completed.status,
        event_status,
        event_ended,
    })
}

/// Write one player's stats for a game and return the rescored row
pub async fn record_stats(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
    counters: &StatCounters,
) -> Result<PlayerStatsRow> {
    let mut tx = pool.begin().await?;

    let target = game::find(&mut tx, game_id, true).await?;
    let owner = event::find(&mut tx, target.event_id, false).await?;

    ensure_stats_editable(owner.status)?;
    if !event::is_participant(&mut tx, owner.event_id, player_id).await? {
        return Err(StorageError::invalid_state(
            "The player is not a participant of this Masterkill",
        ));
    }

    let written = stats::upsert(
        &mut tx,
        game_id,
        player_id,
        counters,
        &owner.weights(),
        target.kill_multiplier,
    )
    .await?;

    tx.commit().await?;

    tracing::debug!(
        "Stats of player {} in game {} scored {}",
        player_id,
        target.game_number,
        written.score
    );

    StatsRepository::new(pool)
        .find_row(game_id, player_id)
        .await?
        .ok_or(StorageError::NotFound)
}

async fn set_event_status(
    conn: &mut PgConnection,
    event_id: Uuid,
    status: EventStatus,
    winner_id: Option<Uuid>,
) -> Result<MasterkillEvent> {
    let event = sqlx::query_as::<_, MasterkillEvent>(&format!(
        r#"
        UPDATE masterkill_events
        SET status = $2,
            winner_id = $3,
            ended_at = CASE WHEN $4 THEN COALESCE(ended_at, NOW()) ELSE ended_at END
        WHERE event_id = $1
        RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(event_id)
    .bind(status.as_str())
    .bind(winner_id)
    .bind(status.is_closed())
    .fetch_one(conn)
    .await?;

    Ok(event)
}
