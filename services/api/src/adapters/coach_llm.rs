//! services/api/src/adapters/coach_llm.rs
//!
//! This module contains the adapter for the wellness-coach LLM.
//! It implements the `CoachService` port from the `core` crate against any
//! OpenAI-compatible endpoint (the Hugging Face router in production).

const CHAT_SYSTEM_PROMPT: &str = "You are a friendly, empathetic, and professional virtual healthcare support assistant. \
If users mention suicidal thoughts or emergencies, you should not respond with advice — only show empathy \
and encourage them to seek immediate professional help. \
Otherwise, keep your replies short, warm, and easy to understand, \
Your primary goal is to provide users with accurate, safe, and educational wellness information. \
You can discuss topics such as physical health, mental well-being, nutrition, exercise, sleep, stress management, \
preventive care, and general healthy lifestyle habits. \
You MUST keep the word limit of 100, unless necessary. \
You must NOT diagnose medical conditions, prescribe medication, or provide personalized treatment plans. \
Always remind users that your information is for educational and informational purposes only, \
and that they should consult a qualified healthcare professional for diagnosis or treatment. \
If a question is unrelated to physical or mental health, politely refuse and redirect the user to stay on health-related topics. \
Maintain a warm, encouraging tone, but remain professional and factual. \
Avoid unnecessary repetition, speculation, or medical jargon unless clearly explained. \
Do not provide emergency medical advice. If a user appears to be in crisis or describes urgent symptoms, \
respond with empathy and instruct them to contact emergency services or a licensed medical provider immediately. \
Keep responses concise, friendly, and easy to understand. \
Whenever appropriate, end responses with a short reminder to consult a doctor or healthcare professional.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use valdo_core::ports::{CoachService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CoachService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCoachAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCoachAdapter {
    /// Creates a new `OpenAiCoachAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `CoachService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CoachService for OpenAiCoachAdapter {
    /// Sends one user message through the coaching system prompt and returns
    /// the model's reply verbatim.
    async fn reply(&self, message: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(CHAT_SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Coach LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Coach LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
