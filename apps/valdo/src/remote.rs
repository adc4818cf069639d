//! apps/valdo/src/remote.rs
//!
//! HTTP implementations of the coach and scanner ports against the coach
//! service. Both calls are one-shot: any transport failure or
//! service-reported error becomes a `PortError` and the caller degrades to
//! its fixed fallback text. There are no retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use valdo_core::domain::NutritionFacts;
use valdo_core::ports::{CoachService, NutritionScanService, PortError, PortResult};

/// Shown whenever a coach reply could not be obtained, for any reason.
pub const COACH_FALLBACK_REPLY: &str =
    "I couldn't reach your coach right now. For proper medical care, please consult a healthcare professional.";

/// Shown when the scan call itself fails (as opposed to the service
/// reporting an unreadable label, which carries its own message).
pub const SCAN_NETWORK_ERROR: &str =
    "Network error. Please check your connection and try again.";

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReplyBody {
    reply: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ScanRequestBody<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct ScanReplyBody {
    #[serde(default)]
    success: bool,
    nutrition_data: Option<NutritionFacts>,
    error: Option<String>,
}

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CoachService for RemoteClient {
    async fn reply(&self, message: &str) -> PortResult<String> {
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequestBody { message })
            .send()
            .await
            .map_err(|err| PortError::Unexpected(err.to_string()))?;

        let body: ChatReplyBody = response
            .json()
            .await
            .map_err(|err| PortError::Unexpected(err.to_string()))?;

        if let Some(error) = body.error {
            return Err(PortError::Service(error));
        }
        body.reply
            .ok_or_else(|| PortError::Unexpected("chat response carried no reply".to_string()))
    }
}

#[async_trait]
impl NutritionScanService for RemoteClient {
    async fn scan_label(&self, image_base64: &str) -> PortResult<NutritionFacts> {
        let response = self
            .http
            .post(format!("{}/scan-nutrition", self.base_url))
            .json(&ScanRequestBody {
                image: image_base64,
            })
            .send()
            .await
            .map_err(|err| PortError::Unexpected(err.to_string()))?;

        let body: ScanReplyBody = response
            .json()
            .await
            .map_err(|err| PortError::Unexpected(err.to_string()))?;

        if body.success {
            if let Some(facts) = body.nutrition_data {
                return Ok(facts);
            }
        }
        Err(PortError::Service(body.error.unwrap_or_else(|| {
            "the scanner could not read the label".to_string()
        })))
    }
}
