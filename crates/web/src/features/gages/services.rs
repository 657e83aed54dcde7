use sqlx::PgPool;
use storage::{error::Result, models::Gage, repository::gage::GageRepository};

/// All gages, alphabetically
pub async fn list_gages(pool: &PgPool) -> Result<Vec<Gage>> {
    let repo = GageRepository::new(pool);
    repo.list().await
}

/// Return the gage with this text, ignoring case, creating it when missing
pub async fn create_gage(pool: &PgPool, text: &str) -> Result<Gage> {
    let repo = GageRepository::new(pool);
    repo.get_or_create(text).await
}
