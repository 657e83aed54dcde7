use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        game::{GameDetailResponse, GameResponse, UpdateGameRequest},
        stats::{CompleteGameRequest, CompleteGameResponse, PlayerStatsResponse, StatCounters},
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/games/{id}",
    params(
        ("id" = Uuid, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Game with its stats rows", body = GameDetailResponse),
        (status = 404, description = "Game not found")
    ),
    tag = "games"
)]
pub async fn get_game(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let game = services::get_game_detail(db.pool(), id).await?;

    Ok(Json(game).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/games/{id}",
    params(
        ("id" = Uuid, Path, description = "Game ID")
    ),
    request_body = UpdateGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Game settings updated, scores recomputed", body = GameResponse),
        (status = 400, description = "Validation error or game already completed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "games"
)]
pub async fn update_game(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateGameRequest>,
) -> Result<Json<GameResponse>, WebError> {
    req.validate()?;

    let game = services::update_game(db.pool(), id, &req).await?;

    Ok(Json(GameResponse::from(game)))
}

#[utoipa::path(
    put,
    path = "/api/games/{id}/stats/{player_id}",
    params(
        ("id" = Uuid, Path, description = "Game ID"),
        ("player_id" = Uuid, Path, description = "Player ID")
    ),
    request_body = StatCounters,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Stats row written and rescored", body = PlayerStatsResponse),
        (status = 400, description = "Validation error or player not in the event"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "games"
)]
pub async fn upsert_stats(
    State(db): State<Database>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
    AppJson(counters): AppJson<StatCounters>,
) -> Result<Json<PlayerStatsResponse>, WebError> {
    counters.validate()?;

    let row = services::record_stats(db.pool(), game_id, player_id, &counters).await?;

    Ok(Json(PlayerStatsResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/api/games/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Game ID")
    ),
    request_body = CompleteGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Game completed", body = CompleteGameResponse),
        (status = 400, description = "Game already completed or event not in progress"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "games"
)]
pub async fn complete_game(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<CompleteGameRequest>,
) -> Result<Json<CompleteGameResponse>, WebError> {
    req.validate()?;

    let completed = services::complete_game(db.pool(), id, &req).await?;

    Ok(Json(completed))
}
