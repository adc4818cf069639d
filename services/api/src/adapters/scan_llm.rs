//! services/api/src/adapters/scan_llm.rs
//!
//! This module contains the adapter for the nutrition-label scanner.
//! It implements the `NutritionScanService` port from the `core` crate using
//! a vision-capable model behind an OpenAI-compatible endpoint (OpenRouter
//! in production), and recovers the JSON object embedded in the reply.

const NUTRITION_SCAN_PROMPT: &str = "You are a nutrition facts scanner. Analyze the nutrition label image and extract the following information in EXACT JSON format: \
{\"calories\": number, \"fat\": number, \"carbohydrates\": number, \"sugar\": number, \"protein\": number, \"serving_size\": string}. \
Only return the JSON object, no additional text. If any value is not available, use null. \
Make sure to extract the numerical values only (without units). For example, if it says 'Calories: 250', return 250. \
If the label shows values per container with multiple servings, try to estimate per serving or use the per serving values.";

const SCAN_USER_TEXT: &str = "Extract nutrition facts from this label in JSON format.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use valdo_core::domain::NutritionFacts;
use valdo_core::ports::{NutritionScanService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `NutritionScanService` using a vision LLM.
#[derive(Clone)]
pub struct OpenAiScanAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiScanAdapter {
    /// Creates a new `OpenAiScanAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Pulls the first `{...}` block out of the model's reply and parses it.
/// The model is told to return bare JSON but routinely wraps it in prose or
/// code fences; dot-matches-newline keeps multi-line objects intact.
pub fn extract_nutrition_json(reply: &str) -> Option<NutritionFacts> {
    let json_block = Regex::new(r"(?s)\{.*\}")
        .ok()?
        .find(reply)?
        .as_str()
        .to_string();
    serde_json::from_str(&json_block).ok()
}

//=========================================================================================
// `NutritionScanService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NutritionScanService for OpenAiScanAdapter {
    /// Sends the label image to the vision model and parses the structured
    /// nutrition facts out of its reply.
    async fn scan_label(&self, image_base64: &str) -> PortResult<NutritionFacts> {
        let data_url = format!("data:image/jpeg;base64,{image_base64}");

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(NUTRITION_SCAN_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(vec![
                    ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(SCAN_USER_TEXT)
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?
                        .into(),
                    ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(
                            ImageUrlArgs::default()
                                .url(data_url)
                                .build()
                                .map_err(|e| PortError::Unexpected(e.to_string()))?,
                        )
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?
                        .into(),
                ])
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(500u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Scanner LLM response contained no text content.".to_string())
            })?;

        extract_nutrition_json(&reply).ok_or_else(|| {
            PortError::Service("no nutrition facts JSON found in the model reply".to_string())
        })
    }
}
