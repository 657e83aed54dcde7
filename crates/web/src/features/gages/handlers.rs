use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::gage::{CreateGageRequest, GageResponse},
};
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/gages",
    responses(
        (status = 200, description = "List all gages successfully", body = Vec<GageResponse>)
    ),
    tag = "gages"
)]
pub async fn list_gages(State(db): State<Database>) -> Result<Json<Vec<GageResponse>>, WebError> {
    let gages = services::list_gages(db.pool()).await?;

    Ok(Json(gages.into_iter().map(GageResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/gages",
    request_body = CreateGageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Gage created or matched an existing one", body = GageResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gages"
)]
pub async fn create_gage(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateGageRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let text = req.text.trim();
    if text.is_empty() {
        return Err(WebError::BadRequest("Gage text cannot be blank".to_string()));
    }

    let gage = services::create_gage(db.pool(), text).await?;

    Ok((StatusCode::CREATED, Json(GageResponse::from(gage))).into_response())
}
