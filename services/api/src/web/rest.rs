//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::screening::{fallback_reply, screen_message};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};
use valdo_core::domain::NutritionFacts;
use valdo_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        scan_nutrition_handler,
    ),
    components(
        schemas(ChatRequest, ChatResponse, ErrorResponse, ScanRequest, ScanResponse, NutritionData)
    ),
    tags(
        (name = "Valdo Coach API", description = "Chat and nutrition-label scanning endpoints for the health tracker.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

/// The reply payload; `source` records which stage answered (triage class,
/// the model, or the canned fallback pool).
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub source: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Base64-encoded label image, with or without a data-URL prefix.
    pub image: String,
}

/// Nutrition facts extracted from the label. Every field is nullable.
#[derive(Debug, Serialize, ToSchema)]
pub struct NutritionData {
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sugar: Option<f64>,
    pub protein: Option<f64>,
    pub serving_size: Option<String>,
}

impl From<NutritionFacts> for NutritionData {
    fn from(facts: NutritionFacts) -> Self {
        Self {
            calories: facts.calories,
            fat: facts.fat,
            carbohydrates: facts.carbohydrates,
            sugar: facts.sugar,
            protein: facts.protein,
            serving_size: facts.serving_size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition_data: Option<NutritionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Answer one chat message from the wellness coach.
///
/// The message is screened for crisis keywords before any model call; a
/// triaged message gets its fixed reply immediately. When no model token is
/// configured, or the model errors, the reply comes from the canned fallback
/// pool — this endpoint never surfaces a provider failure to the user.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "A coach reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Empty message".to_string(),
            }),
        ));
    }

    if let Some(triage) = screen_message(message) {
        info!(source = triage.source, "chat message triaged");
        return Ok(Json(ChatResponse {
            reply: triage.reply.to_string(),
            source: triage.source.to_string(),
        }));
    }

    if let Some(coach) = &app_state.coach {
        match coach.reply(message).await {
            Ok(reply) if !reply.trim().is_empty() => {
                return Ok(Json(ChatResponse {
                    reply,
                    source: "huggingface_ai".to_string(),
                }));
            }
            Ok(_) => warn!("coach model returned an empty reply, using fallback"),
            Err(err) => warn!(error = %err, "coach model call failed, using fallback"),
        }
    }

    Ok(Json(ChatResponse {
        reply: fallback_reply().to_string(),
        source: "fallback".to_string(),
    }))
}

/// Extract nutrition facts from a label photo.
///
/// Accepts a base64 image (a data-URL prefix is stripped if present) and
/// returns the structured facts, or a `success: false` body when the label
/// could not be read.
#[utoipa::path(
    post,
    path = "/scan-nutrition",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Extraction succeeded", body = ScanResponse),
        (status = 400, description = "Missing image or unreadable label", body = ScanResponse),
        (status = 500, description = "Internal error while processing the image", body = ScanResponse)
    )
)]
pub async fn scan_nutrition_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ScanRequest>,
) -> impl IntoResponse {
    if payload.image.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ScanResponse {
                success: false,
                nutrition_data: None,
                error: Some("No image data provided".to_string()),
            }),
        );
    }

    // Remove the data-URL prefix if present.
    let image_base64 = match payload.image.split_once(',') {
        Some((_, data)) => data,
        None => payload.image.as_str(),
    };

    let Some(scanner) = &app_state.scanner else {
        warn!("scan requested but no scanner provider is configured");
        return internal_scan_error();
    };

    match scanner.scan_label(image_base64).await {
        Ok(facts) => (
            StatusCode::OK,
            Json(ScanResponse {
                success: true,
                nutrition_data: Some(facts.into()),
                error: None,
            }),
        ),
        Err(PortError::Service(reason)) => {
            info!(%reason, "nutrition extraction failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ScanResponse {
                    success: false,
                    nutrition_data: None,
                    error: Some(
                        "Could not extract nutrition facts from the image. Please ensure the nutrition label is clear and try again."
                            .to_string(),
                    ),
                }),
            )
        }
        Err(err) => {
            warn!(error = %err, "nutrition scan failed");
            internal_scan_error()
        }
    }
}

fn internal_scan_error() -> (StatusCode, Json<ScanResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ScanResponse {
            success: false,
            nutrition_data: None,
            error: Some(
                "An error occurred while processing the image. Please try again.".to_string(),
            ),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use tracing::Level;
    use valdo_core::ports::{CoachService, PortResult};

    struct CannedCoach(&'static str);

    #[async_trait]
    impl CoachService for CannedCoach {
        async fn reply(&self, _message: &str) -> PortResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingCoach;

    #[async_trait]
    impl CoachService for FailingCoach {
        async fn reply(&self, _message: &str) -> PortResult<String> {
            Err(PortError::Unexpected("connection refused".to_string()))
        }
    }

    fn state_with_coach(coach: Option<Arc<dyn CoachService>>) -> Arc<AppState> {
        let config = Arc::new(Config {
            bind_address: "127.0.0.1:5000".parse().expect("valid socket addr"),
            log_level: Level::INFO,
            hf_token: None,
            hf_base_url: "http://localhost".to_string(),
            chat_model: "test-chat".to_string(),
            openrouter_api_key: None,
            openrouter_base_url: "http://localhost".to_string(),
            scan_model: "test-scan".to_string(),
        });
        Arc::new(AppState {
            config,
            coach,
            scanner: None,
        })
    }

    #[tokio::test]
    async fn empty_message_is_a_bad_request() {
        let state = state_with_coach(None);
        let result = chat_handler(
            State(state),
            Json(ChatRequest {
                message: "   ".to_string(),
            }),
        )
        .await;
        let (status, Json(body)) = result.expect_err("should be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Empty message");
    }

    #[tokio::test]
    async fn triaged_messages_never_reach_the_model() {
        let state = state_with_coach(Some(Arc::new(CannedCoach("model reply"))));
        let Json(body) = chat_handler(
            State(state),
            Json(ChatRequest {
                message: "I think I'm having a heart attack".to_string(),
            }),
        )
        .await
        .expect("triage replies are 200s");
        assert_eq!(body.source, "emergency");
        assert_ne!(body.reply, "model reply");
    }

    #[tokio::test]
    async fn model_reply_is_forwarded_with_its_source() {
        let state = state_with_coach(Some(Arc::new(CannedCoach("drink more water"))));
        let Json(body) = chat_handler(
            State(state),
            Json(ChatRequest {
                message: "any hydration tips?".to_string(),
            }),
        )
        .await
        .expect("should answer");
        assert_eq!(body.reply, "drink more water");
        assert_eq!(body.source, "huggingface_ai");
    }

    #[tokio::test]
    async fn model_failure_degrades_to_the_fallback_pool() {
        let state = state_with_coach(Some(Arc::new(FailingCoach)));
        let Json(body) = chat_handler(
            State(state),
            Json(ChatRequest {
                message: "any hydration tips?".to_string(),
            }),
        )
        .await
        .expect("fallbacks are 200s");
        assert_eq!(body.source, "fallback");
        assert!(!body.reply.is_empty());
    }

    #[tokio::test]
    async fn missing_scanner_is_an_internal_error_not_a_panic() {
        let state = state_with_coach(None);
        let response = scan_nutrition_handler(
            State(state),
            Json(ScanRequest {
                image: "aGVsbG8=".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
