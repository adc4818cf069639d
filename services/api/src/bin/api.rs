//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OpenAiCoachAdapter, OpenAiScanAdapter},
    config::Config,
    error::ApiError,
    web::{chat_handler, rest::ApiDoc, scan_nutrition_handler, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use valdo_core::ports::{CoachService, NutritionScanService};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting coach service...");

    // --- 2. Initialize Service Adapters ---
    // Each provider is optional; the handlers degrade to canned replies or a
    // service-failure body when an adapter is absent.
    let coach: Option<Arc<dyn CoachService>> = match &config.hf_token {
        Some(token) => {
            let client = Client::with_config(
                OpenAIConfig::new()
                    .with_api_base(&config.hf_base_url)
                    .with_api_key(token),
            );
            Some(Arc::new(OpenAiCoachAdapter::new(
                client,
                config.chat_model.clone(),
            )))
        }
        None => {
            warn!("HF_TOKEN not set; /chat will answer from the fallback pool");
            None
        }
    };

    let scanner: Option<Arc<dyn NutritionScanService>> = match &config.openrouter_api_key {
        Some(key) => {
            let client = Client::with_config(
                OpenAIConfig::new()
                    .with_api_base(&config.openrouter_base_url)
                    .with_api_key(key),
            );
            Some(Arc::new(OpenAiScanAdapter::new(
                client,
                config.scan_model.clone(),
            )))
        }
        None => {
            warn!("OPENROUTER_API_KEY not set; /scan-nutrition will report failures");
            None
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        coach,
        scanner,
    });

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/chat", post(chat_handler))
        .route("/scan-nutrition", post(scan_nutrition_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting coach service on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
