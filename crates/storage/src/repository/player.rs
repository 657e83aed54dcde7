use sqlx::{PgConnection, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::error::{Result, StorageError};
use crate::models::Player;

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List players alphabetically, optionally filtered by gamertag
    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Player>, i64)> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM players WHERE 1=1");
        let mut rows = QueryBuilder::new(
            "SELECT player_id, gamertag, created_at FROM players WHERE 1=1",
        );

        if let Some(ref pattern) = pattern {
            count.push(" AND gamertag ILIKE ");
            count.push_bind(pattern);
            rows.push(" AND gamertag ILIKE ");
            rows.push_bind(pattern);
        }

        rows.push(" ORDER BY LOWER(gamertag) LIMIT ");
        rows.push_bind(pagination.limit() as i64);
        rows.push(" OFFSET ");
        rows.push_bind(pagination.offset() as i64);

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;
        let players = rows.build_query_as::<Player>().fetch_all(self.pool).await?;

        Ok((players, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            "SELECT player_id, gamertag, created_at FROM players WHERE player_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, gamertag: &str) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (gamertag)
            VALUES ($1)
            RETURNING player_id, gamertag, created_at
            "#,
        )
        .bind(gamertag.trim())
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::on_conflict(e, "Gamertag already exists"))
    }
}

/// Fetch the player with this gamertag, creating it when unknown
pub(crate) async fn get_or_create(conn: &mut PgConnection, gamertag: &str) -> Result<Player> {
    let player = sqlx::query_as::<_, Player>(
        r#"
        INSERT INTO players (gamertag)
        VALUES ($1)
        ON CONFLICT (gamertag) DO UPDATE SET gamertag = EXCLUDED.gamertag
        RETURNING player_id, gamertag, created_at
        "#,
    )
    .bind(gamertag.trim())
    .fetch_one(conn)
    .await?;

    Ok(player)
}

pub(crate) async fn exists(conn: &mut PgConnection, player_id: Uuid) -> Result<bool> {
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM players WHERE player_id = $1)",
    )
    .bind(player_id)
    .fetch_one(conn)
    .await?;

    Ok(found)
}
