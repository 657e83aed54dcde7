use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{
    aggregated_stats, apply_bonus, create_event, delete_event, game_scores, get_event,
    kills_by_spawn, list_bonuses, list_events, manage_game, update_event,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(create_event))
        .route("/:id", put(update_event).delete(delete_event))
        .route("/:id/manage-game", post(manage_game))
        .route("/:id/bonus", post(apply_bonus))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_events))
        .route("/:id", get(get_event))
        .route("/:id/aggregated-stats", get(aggregated_stats))
        .route("/:id/game-scores", get(game_scores))
        .route("/:id/kills-by-spawn", get(kills_by_spawn))
        .route("/:id/bonus", get(list_bonuses))
        .merge(protected)
}
