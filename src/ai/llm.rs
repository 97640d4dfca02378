//! Prompt-level operations on top of a [`TextGenerator`].

use futures_util::StreamExt;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::prompts::{SLIDE_PREVIEW, SLIDE_STRUCTURE};
use super::{ChatTurn, ModelError, TextGenerator, TextStream};
use crate::slides::RawSlide;

pub const INVALID_JSON: &str = "Invalid JSON returned";

/// The structured endpoint's payload: a slide list, or the raw text when
/// the model's reply could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredOutput {
    Slides(Vec<RawSlide>),
    Invalid { error: String, raw: String },
}

impl StructuredOutput {
    pub fn invalid(raw: impl Into<String>) -> Self {
        StructuredOutput::Invalid {
            error: INVALID_JSON.to_string(),
            raw: raw.into(),
        }
    }

    pub fn slides(&self) -> Option<&[RawSlide]> {
        match self {
            StructuredOutput::Slides(slides) => Some(slides),
            StructuredOutput::Invalid { .. } => None,
        }
    }
}

fn with_system(system_prompt: &str, history: &[ChatTurn]) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.push(ChatTurn::system(system_prompt));
    turns.extend_from_slice(history);
    turns
}

/// Stream a markdown preview of the slides the prompt describes.
pub async fn chat_response(
    model: &dyn TextGenerator,
    prompt: &str,
    history: &[ChatTurn],
) -> Result<TextStream, ModelError> {
    model
        .stream_text(prompt, &with_system(SLIDE_PREVIEW, history))
        .await
}

/// [`chat_response`] gathered into one string. A reply with no visible
/// text is [`ModelError::EmptyResponse`].
pub async fn content_generation(
    model: &dyn TextGenerator,
    prompt: &str,
    history: &[ChatTurn],
) -> Result<String, ModelError> {
    let mut stream = chat_response(model, prompt, history).await?;
    let mut response = String::new();
    while let Some(fragment) = stream.next().await {
        response.push_str(&fragment?);
    }
    if response.trim().is_empty() {
        warn!("Preview stream produced no text");
        return Err(ModelError::EmptyResponse);
    }
    info!("Preview generated: {} chars", response.len());
    Ok(response)
}

/// Ask for the slide list as schema-constrained JSON.
///
/// A reply that does not parse is returned as [`StructuredOutput::Invalid`]
/// rather than an error; transport failures are still errors.
pub async fn structured_content_generation(
    model: &dyn TextGenerator,
    prompt: &str,
    history: &[ChatTurn],
) -> Result<StructuredOutput, ModelError> {
    let raw = model
        .generate_structured(prompt, &with_system(SLIDE_STRUCTURE, history))
        .await?;
    Ok(parse_structured(&raw))
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\s*```\s*$").expect("valid regex")
});

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => raw.trim(),
    }
}

/// An empty list is flagged like unparseable output.
pub fn parse_structured(raw: &str) -> StructuredOutput {
    match serde_json::from_str::<Vec<RawSlide>>(strip_code_fence(raw)) {
        Ok(slides) if slides.is_empty() => {
            warn!("Model returned an empty slide list");
            StructuredOutput::invalid(raw)
        }
        Ok(slides) => {
            info!("Structured output: {} slides", slides.len());
            StructuredOutput::Slides(slides)
        }
        Err(e) => {
            warn!("Model returned unparseable slide JSON: {}", e);
            StructuredOutput::invalid(raw)
        }
    }
}
