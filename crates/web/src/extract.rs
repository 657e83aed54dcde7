use axum::extract::FromRequest;

use crate::error::WebError;

/// `axum::Json` whose rejections answer 400 with the usual error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct AppJson<T>(pub T);
