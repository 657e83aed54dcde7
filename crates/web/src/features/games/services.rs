use sqlx::PgPool;
use storage::{
    dto::{
        game::{GameDetailResponse, GameResponse, UpdateGameRequest},
        stats::{
            CompleteGameRequest, CompleteGameResponse, PlayerStatsResponse, PlayerStatsRow,
            StatCounters,
        },
    },
    error::Result,
    models::Game,
    repository::{game::GameRepository, stats::StatsRepository},
    services::game_flow,
};
use uuid::Uuid;

/// Game with its stats rows, best score first
pub async fn get_game_detail(pool: &PgPool, id: Uuid) -> Result<GameDetailResponse> {
    let game = GameRepository::new(pool).find_by_id(id).await?;
    let stats = StatsRepository::new(pool).list_for_game(id).await?;

    Ok(GameDetailResponse {
        game: GameResponse::from(game),
        stats: stats.into_iter().map(PlayerStatsResponse::from).collect(),
    })
}

pub async fn update_game(pool: &PgPool, id: Uuid, request: &UpdateGameRequest) -> Result<Game> {
    let repo = GameRepository::new(pool);
    repo.update_settings(id, request).await
}

pub async fn record_stats(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
    counters: &StatCounters,
) -> Result<PlayerStatsRow> {
    game_flow::record_stats(pool, game_id, player_id, counters).await
}

pub async fn complete_game(
    pool: &PgPool,
    id: Uuid,
    request: &CompleteGameRequest,
) -> Result<CompleteGameResponse> {
    game_flow::complete_game(pool, id, request).await
}
