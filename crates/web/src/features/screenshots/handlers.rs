use axum::{
    Extension, Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use storage::Database;
use uuid::Uuid;

use crate::error::WebError;

use super::services::{self, ScreenshotScanResponse, ScreenshotUpload};

const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/api/games/{id}/upload-screenshot",
    params(
        ("id" = Uuid, Path, description = "Game ID")
    ),
    request_body(content_type = "multipart/form-data", description = "Scoreboard screenshot in the `file` field"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rows read from the scoreboard", body = ScreenshotScanResponse),
        (status = 400, description = "Missing file or unreadable image"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Text recognition failed")
    ),
    tag = "games"
)]
pub async fn upload_screenshot(
    State(db): State<Database>,
    Extension(upload): Extension<ScreenshotUpload>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ScreenshotScanResponse>, WebError> {
    let image = read_file_field(&mut multipart, upload.max_bytes).await?;

    let scanned = services::scan_for_game(db.pool(), &upload.scanner, id, image).await?;

    Ok(Json(scanned))
}

async fn read_file_field(multipart: &mut Multipart, max_bytes: usize) -> Result<Vec<u8>, WebError> {
    let to_web = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            WebError::PayloadTooLarge(max_bytes)
        } else {
            WebError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(to_web)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await.map_err(to_web)?;
        if bytes.len() > max_bytes {
            return Err(WebError::PayloadTooLarge(max_bytes));
        }
        if bytes.is_empty() {
            return Err(WebError::BadRequest("The uploaded file is empty".to_string()));
        }

        return Ok(bytes.to_vec());
    }

    Err(WebError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}
