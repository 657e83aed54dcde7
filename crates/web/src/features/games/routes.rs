use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};
use storage::Database;

use super::handlers::{complete_game, get_game, update_game, upsert_stats};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:id", patch(update_game))
        .route("/:id/stats/:player_id", put(upsert_stats))
        .route("/:id/complete", post(complete_game))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/:id", get(get_game)).merge(protected)
}
