use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Gage;

pub struct GageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GageRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Gage>> {
        let gages = sqlx::query_as::<_, Gage>(
            "SELECT gage_id, text, created_at FROM gages ORDER BY LOWER(text)",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(gages)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Gage>> {
        let gage = sqlx::query_as::<_, Gage>(
            "SELECT gage_id, text, created_at FROM gages WHERE gage_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(gage)
    }

    pub async fn get_or_create(&self, text: &str) -> Result<Gage> {
        let mut conn = self.pool.acquire().await?;
        get_or_create(&mut conn, text).await
    }
}

/// Case-insensitive get-or-create on the gage text
pub(crate) async fn get_or_create(conn: &mut PgConnection, text: &str) -> Result<Gage> {
    let text = text.trim();

    let inserted = sqlx::query_as::<_, Gage>(
        r#"
        INSERT INTO gages (text)
        VALUES ($1)
        ON CONFLICT DO NOTHING
        RETURNING gage_id, text, created_at
        "#,
    )
    .bind(text)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(gage) = inserted {
        tracing::debug!("Created gage {}", gage.gage_id);
        return Ok(gage);
    }

    let existing = sqlx::query_as::<_, Gage>(
        "SELECT gage_id, text, created_at FROM gages WHERE LOWER(text) = LOWER($1)",
    )
    .bind(text)
    .fetch_one(&mut *conn)
    .await?;

    Ok(existing)
}
