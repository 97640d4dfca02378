pub mod gemini;
pub mod llm;
pub mod prompts;
pub mod retry;
pub mod streaming;
pub mod types;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    /// Capitalized, as it appears in a rendered transcript.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// History as `Role: content` lines followed by the new prompt.
pub fn format_transcript(prompt: &str, history: &[ChatTurn]) -> String {
    let mut out = String::new();
    for turn in history {
        out.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    out.push_str(&format!("User: {}", prompt));
    out
}

/// Bitmap payload returned by an image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageResponse {
    pub text: Option<String>,
    pub image: Option<InlineImage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Gemini API key not configured; set GENAI_API_KEY")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode model response: {0}")]
    Decode(String),

    #[error("model returned no content")]
    EmptyResponse,
}

impl ModelError {
    /// Server-side failures worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Status { status, .. } => (500..600).contains(status),
            ModelError::Http(e) => e.status().is_some_and(|s| s.is_server_error()),
            _ => false,
        }
    }
}

/// Ordered fragments of a streamed reply. Dropping it cancels the request.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn stream_text(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<TextStream, ModelError>;

    /// Raw JSON text constrained by the slide-list schema.
    async fn generate_structured(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ModelError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, description: &str) -> Result<ImageResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_capitalizes_roles_and_ends_with_prompt() {
        let history = vec![
            ChatTurn::system("Be brief."),
            ChatTurn::user("Slides about bees"),
            ChatTurn::assistant("Sure"),
        ];
        assert_eq!(
            format_transcript("Add one on honey", &history),
            "System: Be brief.\nUser: Slides about bees\nAssistant: Sure\nUser: Add one on honey"
        );
        assert_eq!(format_transcript("hi", &[]), "User: hi");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let turn: ChatTurn = serde_json::from_str(r#"{"role":"assistant","content":"x"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(
            serde_json::to_string(&ChatTurn::user("y")).unwrap(),
            r#"{"role":"user","content":"y"}"#
        );
    }

    #[test]
    fn only_server_errors_are_transient() {
        let status = |status| ModelError::Status {
            status,
            body: String::new(),
        };
        assert!(status(503).is_transient());
        assert!(status(500).is_transient());
        assert!(!status(429).is_transient());
        assert!(!status(400).is_transient());
        assert!(!ModelError::MissingApiKey.is_transient());
        assert!(!ModelError::EmptyResponse.is_transient());
    }
}
