use std::convert::Infallible;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use axum::Json;
use futures::{stream, Stream, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AppState, SLIDES_RENDERED, SLIDES_SKIPPED};
use crate::ai::llm::{self, StructuredOutput};
use crate::ai::{ChatTurn, TextStream};
use crate::deck::PPTX_CONTENT_TYPE;
use crate::error::{AppError, AppResult};
use crate::pipeline::DeckPipeline;
use crate::slides::RawSlide;

pub const DOWNLOAD_NAME: &str = "generated_presentation.pptx";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Structured,
    Preview,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub prompt: String,
    /// Earlier turns, oldest first, not including `prompt`.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub mode: GenerationMode,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Structured(StructuredOutput),
    Preview(String),
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: GeneratedContent,
}

/// POST /content_generation_api
pub async fn content_generation(
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> AppResult<Json<ContentResponse>> {
    let Json(request) = payload?;
    info!(
        "Content request ({:?}): {} history turns",
        request.mode,
        request.history.len()
    );
    let model = state.text.as_ref();
    let content = match request.mode {
        GenerationMode::Structured => GeneratedContent::Structured(
            llm::structured_content_generation(model, &request.prompt, &request.history).await?,
        ),
        GenerationMode::Preview => GeneratedContent::Preview(
            llm::content_generation(model, &request.prompt, &request.history).await?,
        ),
    };
    Ok(Json(ContentResponse { content }))
}

/// POST /content_generation_stream
///
/// One `fragment` event per text fragment, then `done`. A failure part-way
/// through is sent as an `error` event and ends the stream.
pub async fn content_generation_stream(
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(request) = payload?;
    let fragments = llm::chat_response(state.text.as_ref(), &request.prompt, &request.history).await?;
    Ok(Sse::new(fragment_events(fragments)).keep_alive(KeepAlive::default()))
}

fn fragment_events(fragments: TextStream) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(Some(fragments), |state| async move {
        let mut fragments = state?;
        let (event, next) = match fragments.next().await {
            Some(Ok(text)) => (Event::default().event("fragment").data(text), Some(fragments)),
            Some(Err(e)) => {
                warn!("Preview stream failed: {}", e);
                (Event::default().event("error").data(e.to_string()), None)
            }
            None => (Event::default().event("done").data(""), None),
        };
        Some((event, next))
    })
    .map(Ok)
}

#[derive(Debug, Deserialize)]
pub struct GeneratePptRequest {
    /// A slide list, or the same list JSON-encoded as a string. Absent
    /// means no slides.
    #[serde(default = "empty_list")]
    pub slides: Value,
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

/// Accept either form of the `slides` field.
pub fn parse_slides(slides: Value) -> AppResult<Vec<RawSlide>> {
    match slides {
        Value::String(encoded) => serde_json::from_str(&encoded)
            .map_err(|e| AppError::BadRequest(format!("slides is not a valid JSON list: {}", e))),
        value @ Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("invalid slide list: {}", e))),
        _ => Err(AppError::BadRequest(
            "slides must be a list or a JSON-encoded list".to_string(),
        )),
    }
}

/// POST /generate_ppt
pub async fn generate_ppt(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePptRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let slides = parse_slides(request.slides)?;
    info!("Generating deck from {} slides", slides.len());

    let pipeline = DeckPipeline::new(
        Some(state.images.clone()),
        state.config.render_capabilities(),
    )
    .with_debug_dir(state.config.debug_images_dir());
    let output = pipeline.build(&slides).await?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, PPTX_CONTENT_TYPE)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename={}", DOWNLOAD_NAME),
        )
        .header(SLIDES_RENDERED, output.rendered.to_string());
    if !output.skipped.is_empty() {
        response = response.header(SLIDES_SKIPPED, output.skipped_indices());
    }
    response
        .body(Body::from(output.bytes))
        .map_err(|e| AppError::Internal(format!("failed to build deck response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slides_accepts_list_or_encoded_string() {
        let list = json!([{"slide_category": "Title Slide", "slide_content": {"title": "A"}}]);
        let encoded = Value::String(list.to_string());

        assert_eq!(parse_slides(list).unwrap(), parse_slides(encoded).unwrap());
    }

    #[test]
    fn malformed_slides_are_bad_requests() {
        for bad in [
            Value::String("[{not json".into()),
            Value::String("{}".into()),
            json!(42),
            json!([1, 2]),
        ] {
            assert!(matches!(parse_slides(bad), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn missing_slides_means_empty_list() {
        let request: GeneratePptRequest = serde_json::from_str("{}").unwrap();
        assert!(parse_slides(request.slides).unwrap().is_empty());
    }

    #[test]
    fn mode_defaults_to_structured() {
        let request: ContentRequest = serde_json::from_str(r#"{"prompt": "bees"}"#).unwrap();
        assert_eq!(request.mode, GenerationMode::Structured);
        assert!(request.history.is_empty());

        let request: ContentRequest =
            serde_json::from_str(r#"{"prompt": "bees", "mode": "preview"}"#).unwrap();
        assert_eq!(request.mode, GenerationMode::Preview);
    }
}
