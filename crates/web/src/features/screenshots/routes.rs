use axum::{Extension, Router, extract::DefaultBodyLimit, middleware, routing::post};
use storage::Database;

use super::handlers::upload_screenshot;
use super::services::ScreenshotUpload;
use crate::middleware::auth::{ApiKeys, require_auth};

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(api_keys: ApiKeys, upload: ScreenshotUpload) -> Router<Database> {
    let body_limit = upload.max_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/:id/upload-screenshot", post(upload_screenshot))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(upload))
}
