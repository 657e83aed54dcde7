use std::sync::Arc;

use anyhow::Context;
use scanner::{OllamaRecognizer, ScreenshotScanner};
use storage::Database;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod features;
mod middleware;
mod routes;

use config::Config;
use features::screenshots::services::ScreenshotUpload;
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::players::handlers::list_players,
        features::players::handlers::get_player,
        features::players::handlers::create_player,
        features::gages::handlers::list_gages,
        features::gages::handlers::create_gage,
        features::events::handlers::list_events,
        features::events::handlers::get_event,
        features::events::handlers::create_event,
        features::events::handlers::update_event,
        features::events::handlers::delete_event,
        features::events::handlers::manage_game,
        features::events::handlers::aggregated_stats,
        features::events::handlers::game_scores,
        features::events::handlers::kills_by_spawn,
        features::events::handlers::apply_bonus,
        features::events::handlers::list_bonuses,
        features::games::handlers::get_game,
        features::games::handlers::update_game,
        features::games::handlers::upsert_stats,
        features::games::handlers::complete_game,
        features::screenshots::handlers::upload_screenshot,
        features::activity::handlers::create_redeploy,
        features::activity::handlers::create_revive,
        features::rankings::handlers::get_all_time_ranking,
    ),
    components(
        schemas(
            storage::dto::player::CreatePlayerRequest,
            storage::dto::player::PlayerResponse,
            storage::dto::gage::CreateGageRequest,
            storage::dto::gage::GageResponse,
            storage::dto::event::CreateEventRequest,
            storage::dto::event::UpdateEventRequest,
            storage::dto::event::ManageGameRequest,
            storage::dto::event::EventResponse,
            storage::dto::event::CurrentGameInfo,
            storage::dto::event::EventDetailResponse,
            storage::dto::game::GameResponse,
            storage::dto::game::GameDetailResponse,
            storage::dto::game::UpdateGameRequest,
            storage::dto::stats::StatCounters,
            storage::dto::stats::PlayerStatsInput,
            storage::dto::stats::CompleteGameRequest,
            storage::dto::stats::CompleteGameResponse,
            storage::dto::stats::PlayerStatsResponse,
            storage::dto::activity::CreateRedeployRequest,
            storage::dto::activity::RedeployResponse,
            storage::dto::activity::CreateReviveRequest,
            storage::dto::activity::ReviveResponse,
            storage::dto::activity::ApplyBonusRequest,
            storage::dto::activity::BonusAwardResponse,
            storage::dto::ranking::AggregatedPlayerStats,
            storage::dto::ranking::GameScoresResponse,
            storage::dto::ranking::SpawnKills,
            storage::dto::ranking::AllTimeRankingEntry,
            storage::dto::common::PaginationMeta,
            storage::dto::common::PlayerInfo,
            storage::services::lifecycle::EventAction,
            storage::models::EventStatus,
            storage::models::GameStatus,
            storage::models::GulagStatus,
            features::screenshots::services::ScannedPlayer,
            features::screenshots::services::ScreenshotScanResponse,
        )
    ),
    tags(
        (name = "players", description = "Player roster"),
        (name = "gages", description = "Forfeits for the loser"),
        (name = "events", description = "Masterkill events, game flow and event statistics"),
        (name = "games", description = "Games, per-player stats and scoreboard screenshots"),
        (name = "activity", description = "Redeploy and revive logs"),
        (name = "rankings", description = "Cross-event rankings"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Masterkill API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, every write endpoint will answer 401");
    }

    let recognizer = OllamaRecognizer::new(&config.ollama_url, &config.ollama_model)
        .context("Failed to create Ollama client")?;
    match recognizer.client().verify_model().await {
        Ok(true) => tracing::info!(
            "Screenshot recognition uses {} at {}",
            config.ollama_model,
            config.ollama_url
        ),
        Ok(false) => tracing::warn!(
            "Model {} is not pulled on {}, screenshot uploads will fail",
            config.ollama_model,
            config.ollama_url
        ),
        Err(e) => tracing::warn!(
            "Ollama is not reachable at {} ({}), screenshot uploads will fail",
            config.ollama_url,
            e
        ),
    }

    let upload = ScreenshotUpload {
        scanner: ScreenshotScanner::new(Arc::new(recognizer)),
        max_bytes: config.max_upload_bytes,
    };

    let app = routes::api_router(api_keys, upload)
        .with_state(db)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
