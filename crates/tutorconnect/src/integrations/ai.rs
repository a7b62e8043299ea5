//! Gemini text generation for lesson plans and the study-buddy chat.
//!
//! Neither entry point fails: without an API key, or when the call errors,
//! the caller gets a fixed explanatory text instead.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AiConfig;

pub const LESSON_PLAN_UNAVAILABLE: &str =
    "AI features are currently unavailable. Please check your configuration.";
pub const LESSON_PLAN_FAILED: &str =
    "Error: Unable to connect to AI services. Please try again later.";
pub const LESSON_PLAN_EMPTY: &str = "I'm sorry, I couldn't generate a lesson plan at this moment.";

pub const CHAT_UNAVAILABLE: &str =
    "The Study Buddy is currently offline due to a missing API configuration.";
pub const CHAT_FAILED: &str =
    "I'm experiencing some technical difficulties. Let's try again in a bit!";
pub const CHAT_EMPTY: &str = "I'm sorry, I'm having trouble thinking right now.";

const TUTOR_PERSONA: &str = "You are 'TutorConnect AI', a helpful and encouraging South African tutor. You are expert in the CAPS and IEB curricula. Assist students with their homework and explain complex concepts simply. Use South African English and occasional local references to make the student feel at home.";

#[derive(Debug, Error)]
enum AiError {
    #[error("No API key configured")]
    MissingKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Generation API returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One turn of a conversation, in the wire shape Gemini expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

impl ChatTurn {
    pub fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: [PartRef<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartRef<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateResponse {
    /// Text of the first candidate, `None` when it is empty.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub fn lesson_plan_prompt(subject: &str, grade: &str, topic: &str) -> String {
    format!(
        "Generate a detailed lesson plan for a South African {grade} student. \n\
         Subject: {subject}. \n\
         Topic: {topic}. \n\
         Include: Learning objectives, key concepts, a 45-minute structure, and 3 practice questions suitable for CAPS/IEB curriculum."
    )
}

pub struct AiClient {
    client: Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(
        &self,
        contents: Vec<ChatTurn>,
        system: Option<&str>,
    ) -> Result<Option<String>, AiError> {
        let key = self.config.api_key.as_deref().ok_or(AiError::MissingKey)?;
        let request = GenerateRequest {
            contents,
            system_instruction: system.map(|text| SystemInstruction {
                parts: [PartRef { text }],
            }),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text())
    }

    /// A CAPS/IEB lesson plan for the given subject, grade and topic.
    pub async fn lesson_plan(&self, subject: &str, grade: &str, topic: &str) -> String {
        let prompt = lesson_plan_prompt(subject, grade, topic);
        match self
            .generate(vec![ChatTurn::text(ChatRole::User, prompt)], None)
            .await
        {
            Ok(Some(text)) => {
                info!(subject, grade, "Lesson plan generated");
                text
            }
            Ok(None) => LESSON_PLAN_EMPTY.to_string(),
            Err(AiError::MissingKey) => {
                warn!("AI key missing, lesson plan generation is disabled");
                LESSON_PLAN_UNAVAILABLE.to_string()
            }
            Err(e) => {
                error!(error = %e, "Lesson plan generation failed");
                LESSON_PLAN_FAILED.to_string()
            }
        }
    }

    /// Next tutor reply given the earlier turns and the student's message.
    pub async fn chat(&self, history: &[ChatTurn], message: &str) -> String {
        let mut contents = history.to_vec();
        contents.push(ChatTurn::text(ChatRole::User, message));

        match self.generate(contents, Some(TUTOR_PERSONA)).await {
            Ok(Some(text)) => text,
            Ok(None) => CHAT_EMPTY.to_string(),
            Err(AiError::MissingKey) => {
                warn!("AI key missing, study buddy chat is disabled");
                CHAT_UNAVAILABLE.to_string()
            }
            Err(e) => {
                error!(error = %e, "Study buddy chat failed");
                CHAT_FAILED.to_string()
            }
        }
    }
}
