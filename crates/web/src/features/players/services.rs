use sqlx::PgPool;
use storage::{
    dto::{common::PaginationParams, player::PlayerSearch},
    error::Result,
    models::Player,
    repository::player::PlayerRepository,
};
use uuid::Uuid;

/// List players, alphabetically, with an optional gamertag filter
pub async fn list_players(
    pool: &PgPool,
    search: &PlayerSearch,
    pagination: &PaginationParams,
) -> Result<(Vec<Player>, i64)> {
    let repo = PlayerRepository::new(pool);
    repo.list(search.search.as_deref(), pagination).await
}

pub async fn get_player(pool: &PgPool, id: Uuid) -> Result<Player> {
    let repo = PlayerRepository::new(pool);
    repo.find_by_id(id).await
}

pub async fn create_player(pool: &PgPool, gamertag: &str) -> Result<Player> {
    let repo = PlayerRepository::new(pool);
    repo.create(gamertag).await
}
