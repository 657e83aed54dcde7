use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::activity::{CreateRedeployRequest, CreateReviveRequest, RedeployResponse, ReviveResponse},
};
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    post,
    path = "/api/redeploy-events",
    request_body = CreateRedeployRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Redeploy logged", body = RedeployResponse),
        (status = 400, description = "Validation error, finished game or non-participant"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "activity"
)]
pub async fn create_redeploy(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateRedeployRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let logged = services::record_redeploy(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(logged)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/revive-events",
    request_body = CreateReviveRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Revive logged", body = ReviveResponse),
        (status = 400, description = "Validation error, finished game or non-participant"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found")
    ),
    tag = "activity"
)]
pub async fn create_revive(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateReviveRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let logged = services::record_revive(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(logged)).into_response())
}
