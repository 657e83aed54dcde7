use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        activity::{ApplyBonusRequest, BonusAwardResponse},
        event::{
            CreateEventRequest, EventDetailResponse, EventResponse, ManageGameRequest,
            UpdateEventRequest,
        },
        game::GameResponse,
        ranking::{AggregatedPlayerStats, GameScoresResponse, SpawnKills},
    },
    services::game_flow::ManageOutcome,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "List all events, newest first", body = Vec<EventResponse>)
    ),
    tag = "events"
)]
pub async fn list_events(State(db): State<Database>) -> Result<Json<Vec<EventResponse>>, WebError> {
    let events = services::list_events(db.pool()).await?;

    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event with participants, games and current game", body = EventDetailResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let detail = services::get_event_detail(db.pool(), id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created successfully", body = EventResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = services::create_event(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event updated successfully", body = EventResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn update_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(update_req): AppJson<UpdateEventRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_event(db.pool(), id, &update_req).await?;

    Ok(Json(EventResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Event deleted with its games and stats"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_event(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/manage-game",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = ManageGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Running or resumed game, or the event after pause/resume/cancel", body = GameResponse),
        (status = 201, description = "Next game created", body = GameResponse),
        (status = 400, description = "Action not allowed in the current state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn manage_game(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<ManageGameRequest>,
) -> Result<Response, WebError> {
    let outcome = services::manage_event(db.pool(), id, req.action).await?;

    let response = match outcome {
        ManageOutcome::Game { game, created } => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(GameResponse::from(game))).into_response()
        }
        ManageOutcome::Event(event) => Json(EventResponse::from(event)).into_response(),
    };

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/aggregated-stats",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Per-participant totals, best grand total first", body = Vec<AggregatedPlayerStats>),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn aggregated_stats(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AggregatedPlayerStats>>, WebError> {
    let stats = services::aggregated_stats(db.pool(), id).await?;

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/game-scores",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Cumulative score series per participant", body = GameScoresResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn game_scores(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameScoresResponse>, WebError> {
    let scores = services::game_scores(db.pool(), id).await?;

    Ok(Json(scores))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/kills-by-spawn",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Kills per spawn location", body = Vec<SpawnKills>),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn kills_by_spawn(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SpawnKills>>, WebError> {
    let spawns = services::kills_by_spawn(db.pool(), id).await?;

    Ok(Json(spawns))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/bonus",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = ApplyBonusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Bonus granted", body = BonusAwardResponse),
        (status = 400, description = "Validation error or bonus wheel disabled"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or game not found")
    ),
    tag = "events"
)]
pub async fn apply_bonus(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<ApplyBonusRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let bonus = services::apply_bonus(db.pool(), id, &req).await?;

    Ok((StatusCode::CREATED, Json(BonusAwardResponse::from(bonus))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/bonus",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Bonus awards in the order they were granted", body = Vec<BonusAwardResponse>),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn list_bonuses(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BonusAwardResponse>>, WebError> {
    let bonuses = services::list_bonuses(db.pool(), id).await?;

    Ok(Json(
        bonuses.into_iter().map(BonusAwardResponse::from).collect(),
    ))
}
