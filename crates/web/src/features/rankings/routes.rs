use axum::{Router, routing::get};
use storage::Database;

use super::handlers::get_all_time_ranking;

pub fn routes() -> Router<Database> {
    Router::new().route("/all-time", get(get_all_time_ranking))
}
