use sqlx::PgPool;
use storage::{
    dto::{common::PaginationParams, ranking::AllTimeRankingEntry},
    error::Result,
    repository::ranking::RankingRepository,
};

/// All-time ranking over every completed game
pub async fn get_all_time_ranking(
    pool: &PgPool,
    pagination: &PaginationParams,
) -> Result<(Vec<AllTimeRankingEntry>, i64)> {
    let repo = RankingRepository::new(pool);
    repo.all_time(pagination).await
}
