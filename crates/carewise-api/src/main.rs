use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;

use carewise_api::{
    config::Config,
    docs::ApiDoc,
    middleware::logging,
    routes::{chat, health, records},
    state::AppState,
};
use carewise_chat::ChatService;
use carewise_history::MongoHistoryStore;
use carewise_llm::{CompletionClient, MistralClient, MistralConfig};
use carewise_records::{MongoRecordStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Carewise API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Completion client; the credential check happens here, at startup
    let mut mistral_config = MistralConfig::new(config.mistral_api_key.clone())
        .with_model(config.llm.model.clone())
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);
    if let Some(base_url) = config.llm.base_url.clone() {
        mistral_config = mistral_config.with_base_url(base_url);
    }
    let completion: Arc<dyn CompletionClient> = Arc::new(
        MistralClient::new(mistral_config)
            .map_err(|e| anyhow::anyhow!("Failed to create completion client: {}", e))?,
    );

    tracing::info!("Connecting to MongoDB");
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
    let records: Arc<dyn RecordStore> = Arc::new(MongoRecordStore::new(
        &mongo_client,
        &config.mongodb.database,
    ));
    let history = Arc::new(MongoHistoryStore::new(
        &mongo_client,
        &config.mongodb.database,
    ));
    history.ensure_indexes().await?;
    tracing::info!("MongoDB connected");

    let chat_service = ChatService::new(history, records.clone(), completion);
    let state = Arc::new(AppState::new(config.clone(), chat_service, records));

    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Main thread
        .route("/chat", post(chat::send_main_turn))
        .route("/chat/history", get(chat::get_main_history))
        .route("/chat/history", delete(chat::clear_main_history))
        // Records
        .route("/records", post(records::create_record))
        .route("/records", get(records::list_records))
        .route("/records/:record_id", get(records::get_record))
        // Record-bound threads
        .route("/records/:record_id/chat", post(chat::send_record_turn))
        .route(
            "/records/:record_id/chat/history",
            get(chat::get_record_history),
        )
        .route(
            "/records/:record_id/chat/history",
            delete(chat::clear_record_history),
        )
        // OpenAPI document
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );

    Router::new()
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(120)))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
