use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::activity::{
    ApplyBonusRequest, CreateRedeployRequest, CreateReviveRequest, RedeployResponse,
    ReviveResponse,
};
use crate::error::{Result, StorageError};
use crate::models::{BonusAward, Game, GameStatus, MasterkillEvent};
use crate::repository::stats::{self, Tally};
use crate::repository::{event, game};
use crate::services::lifecycle::ensure_stats_editable;

/// Redeploy and revive logs plus bonus wheel awards
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

#[derive(FromRow)]
struct LoggedPair {
    log_id: Uuid,
    game_id: Uuid,
    actor_id: Uuid,
    actor_gamertag: String,
    target_id: Uuid,
    target_gamertag: String,
    created_at: chrono::NaiveDateTime,
}

impl<'a> ActivityRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Log a redeploy and count it against the redeployed player
    pub async fn record_redeploy(&self, req: &CreateRedeployRequest) -> Result<RedeployResponse> {
        let mut tx = self.pool.begin().await?;

        let (game, owner) = open_game(&mut tx, req.game_id).await?;
        ensure_participants(&mut tx, &owner, &[req.redeployer_id, req.redeployed_id]).await?;

        let redeploy_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO redeploy_events (game_id, redeployer_id, redeployed_id)
            VALUES ($1, $2, $3)
            RETURNING redeploy_id
            "#,
        )
        .bind(req.game_id)
        .bind(req.redeployer_id)
        .bind(req.redeployed_id)
        .fetch_one(&mut *tx)
        .await?;

        stats::increment(
            &mut tx,
            game.game_id,
            req.redeployed_id,
            Tally::RedeployReceived,
            &owner.weights(),
            game.kill_multiplier,
        )
        .await?;

        let logged = sqlx::query_as::<_, LoggedPair>(
            r#"
            SELECT r.redeploy_id AS log_id, r.game_id,
                   r.redeployer_id AS actor_id, a.gamertag AS actor_gamertag,
                   r.redeployed_id AS target_id, t.gamertag AS target_gamertag,
                   r.created_at
            FROM redeploy_events r
            INNER JOIN players a ON a.player_id = r.redeployer_id
            INNER JOIN players t ON t.player_id = r.redeployed_id
            WHERE r.redeploy_id = $1
            "#,
        )
        .bind(redeploy_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RedeployResponse {
            redeploy_id: logged.log_id,
            game_id: logged.game_id,
            redeployer_id: logged.actor_id,
            redeployer_gamertag: logged.actor_gamertag,
            redeployed_id: logged.target_id,
            redeployed_gamertag: logged.target_gamertag,
            created_at: logged.created_at,
        })
    }

    /// Log a revive and credit it to the reviver
    pub async fn record_revive(&self, req: &CreateReviveRequest) -> Result<ReviveResponse> {
        let mut tx = self.pool.begin().await?;

        let (game, owner) = open_game(&mut tx, req.game_id).await?;
        ensure_participants(&mut tx, &owner, &[req.reviver_id, req.revived_id]).await?;

        let revive_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO revive_events (game_id, reviver_id, revived_id)
            VALUES ($1, $2, $3)
            RETURNING revive_id
            "#,
        )
        .bind(req.game_id)
        .bind(req.reviver_id)
        .bind(req.revived_id)
        .fetch_one(&mut *tx)
        .await?;

        stats::increment(
            &mut tx,
            game.game_id,
            req.reviver_id,
            Tally::ReviveDone,
            &owner.weights(),
            game.kill_multiplier,
        )
        .await?;

        let logged = sqlx::query_as::<_, LoggedPair>(
            r#"
            SELECT r.revive_id AS log_id, r.game_id,
                   r.reviver_id AS actor_id, a.gamertag AS actor_gamertag,
                   r.revived_id AS target_id, t.gamertag AS target_gamertag,
                   r.created_at
            FROM revive_events r
            INNER JOIN players a ON a.player_id = r.reviver_id
            INNER JOIN players t ON t.player_id = r.revived_id
            WHERE r.revive_id = $1
            "#,
        )
        .bind(revive_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReviveResponse {
            revive_id: logged.log_id,
            game_id: logged.game_id,
            reviver_id: logged.actor_id,
            reviver_gamertag: logged.actor_gamertag,
            revived_id: logged.target_id,
            revived_gamertag: logged.target_gamertag,
            created_at: logged.created_at,
        })
    }

    /// Grant a bonus wheel award to a participant of a running or paused event
    pub async fn apply_bonus(&self, event_id: Uuid, req: &ApplyBonusRequest) -> Result<BonusAward> {
        let mut tx = self.pool.begin().await?;

        let owner = event::find(&mut tx, event_id, false).await?;
        if !owner.has_bonus_wheel {
            return Err(StorageError::invalid_state(
                "The bonus wheel is disabled for this Masterkill",
            ));
        }
        if owner.status.is_closed() {
            return Err(StorageError::invalid_state(
                "This Masterkill is completed or cancelled",
            ));
        }
        ensure_participants(&mut tx, &owner, &[req.player_id]).await?;

        if let Some(game_id) = req.game_id {
            let game = game::find(&mut tx, game_id, false).await?;
            if game.event_id != event_id {
                return Err(StorageError::invalid_state(
                    "The game does not belong to this Masterkill",
                ));
            }
        }

        let bonus = sqlx::query_as::<_, BonusAward>(
            r#"
            INSERT INTO bonus_awards (event_id, player_id, game_id, label, points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING bonus_id, event_id, player_id, game_id, label, points, created_at
            "#,
        )
        .bind(event_id)
        .bind(req.player_id)
        .bind(req.game_id)
        .bind(req.label.trim())
        .bind(req.points)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Bonus '{}' ({:+}) granted to {} in event {}",
            bonus.label,
            bonus.points,
            bonus.player_id,
            event_id
        );

        Ok(bonus)
    }

    pub async fn list_bonuses(&self, event_id: Uuid) -> Result<Vec<BonusAward>> {
        let bonuses = sqlx::query_as::<_, BonusAward>(
            r#"
            SELECT bonus_id, event_id, player_id, game_id, label, points, created_at
            FROM bonus_awards
            WHERE event_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(bonuses)
    }
}

/// Load a game that still accepts logs, with its event
async fn open_game(conn: &mut PgConnection, game_id: Uuid) -> Result<(Game, MasterkillEvent)> {
    let game = game::find(&mut *conn, game_id, true).await?;
    if game.status == GameStatus::Completed {
        return Err(StorageError::invalid_state("This game is already completed"));
    }

    let owner = event::find(&mut *conn, game.event_id, false).await?;
    ensure_stats_editable(owner.status)?;

    Ok((game, owner))
}

async fn ensure_participants(
    conn: &mut PgConnection,
    owner: &MasterkillEvent,
    players: &[Uuid],
) -> Result<()> {
    for player_id in players {
        if !event::is_participant(&mut *conn, owner.event_id, *player_id).await? {
            return Err(StorageError::invalid_state(format!(
                "Player {} is not a participant of this Masterkill",
                player_id
            )));
        }
    }
    Ok(())
}
