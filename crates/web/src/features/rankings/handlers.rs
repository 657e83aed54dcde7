use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        ranking::AllTimeRankingEntry,
    },
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rankings/all-time",
    params(PaginationParams),
    responses(
        (status = 200, description = "All-time ranking retrieved successfully", body = PaginatedResponse<AllTimeRankingEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "rankings"
)]
pub async fn get_all_time_ranking(
    State(db): State<Database>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::get_all_time_ranking(db.pool(), &pagination).await?;

    let response = PaginatedResponse::new(entries, pagination, total_items);

    Ok(Json(response).into_response())
}
