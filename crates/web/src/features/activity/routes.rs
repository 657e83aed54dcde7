use axum::{Router, middleware, routing::post};
use storage::Database;

use super::handlers::{create_redeploy, create_revive};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .route("/redeploy-events", post(create_redeploy))
        .route("/revive-events", post(create_revive))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
