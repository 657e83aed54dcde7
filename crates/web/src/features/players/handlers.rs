use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        player::{CreatePlayerRequest, PlayerResponse, PlayerSearch},
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/players",
    params(PaginationParams, PlayerSearch),
    responses(
        (status = 200, description = "Players listed successfully", body = PaginatedResponse<PlayerResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "players"
)]
pub async fn list_players(
    State(db): State<Database>,
    Query(pagination): Query<PaginationParams>,
    Query(search): Query<PlayerSearch>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let (players, total_items) = services::list_players(db.pool(), &search, &pagination).await?;

    let response = PaginatedResponse::new(
        players.into_iter().map(PlayerResponse::from).collect(),
        pagination,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Player found", body = PlayerResponse),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn get_player(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, WebError> {
    let player = services::get_player(db.pool(), id).await?;

    Ok(Json(PlayerResponse::from(player)))
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = CreatePlayerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Player created successfully", body = PlayerResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Gamertag already exists")
    ),
    tag = "players"
)]
pub async fn create_player(
    State(db): State<Database>,
    AppJson(req): AppJson<CreatePlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player = services::create_player(db.pool(), &req.gamertag).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))).into_response())
}
