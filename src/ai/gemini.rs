//! Gemini REST client for streamed text, schema-constrained JSON and images.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use futures_util::StreamExt;
use log::{debug, error};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::prompts::IMAGE_INSTRUCTIONS;
use super::retry::{retry_transient, RetryPolicy};
use super::streaming::SseLineBuffer;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use super::{
    format_transcript, ChatTurn, ImageGenerator, ImageResponse, InlineImage, ModelError,
    TextGenerator, TextStream,
};
use crate::config::AppConfig;
use crate::slides::response_schema;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    structured_model: String,
    image_model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.genai_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            structured_model: config.structured_model.clone(),
            image_model: config.image_model.clone(),
            retry: config.retry_policy(),
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    fn api_key(&self) -> Result<&str, ModelError> {
        if self.api_key.is_empty() {
            Err(ModelError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    /// POST a request and fail on non-2xx with the response body attached.
    async fn send(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, ModelError> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini error ({}): {}", status, body);
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError> {
        let url = self.endpoint(model, "generateContent");
        debug!("POST {}", url);
        let response = self.send(&url, request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ModelError::Decode(e.to_string()))
    }

    async fn request_image(&self, description: &str) -> Result<ImageResponse, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: IMAGE_INSTRUCTIONS.to_string(),
                    },
                    Part::Text {
                        text: description.to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                ..Default::default()
            }),
        };
        let response = self.generate(&self.image_model, &request).await?;
        image_response(&response)
    }
}

/// The last text part and the last inline bitmap of a response.
pub fn image_response(response: &GenerateContentResponse) -> Result<ImageResponse, ModelError> {
    let text = response.texts().last().map(str::to_string);
    let image = match response.inline_data().last() {
        Some(inline) => Some(InlineImage {
            mime_type: inline.mime_type.clone(),
            data: STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| ModelError::Decode(format!("inline image: {}", e)))?,
        }),
        None => None,
    };
    Ok(ImageResponse { text, image })
}

/// Text fragments carried by one streamed event payload.
pub fn event_fragments(data: &str) -> Result<Vec<String>, ModelError> {
    let chunk: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| ModelError::Decode(e.to_string()))?;
    Ok(chunk
        .texts()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn stream_text(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<TextStream, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(format_transcript(prompt, history))],
            generation_config: None,
        };
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&self.text_model, "streamGenerateContent")
        );
        debug!("POST {}", url);
        let response = self.send(&url, &request).await?;

        // Capacity 1: at most one fragment waits on a slow consumer.
        let (tx, rx) = mpsc::channel::<Result<String, ModelError>>(1);
        tokio::spawn(async move {
            let mut body = Box::pin(response.bytes_stream());
            let mut lines = SseLineBuffer::new();

            while let Some(chunk) = body.next().await {
                let payloads = match chunk {
                    Ok(bytes) => lines.push(&bytes),
                    Err(e) => {
                        let _ = tx.send(Err(ModelError::Http(e))).await;
                        return;
                    }
                };
                for data in payloads {
                    if forward(&tx, &data).await.is_err() {
                        // Consumer is gone; dropping `body` closes the connection.
                        return;
                    }
                }
            }
            if let Some(data) = lines.finish() {
                let _ = forward(&tx, &data).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(format_transcript(prompt, history))],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema()),
                ..Default::default()
            }),
        };
        let response = self.generate(&self.structured_model, &request).await?;
        let text: String = response.texts().collect();
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        debug!("Structured response: {} bytes", text.len());
        Ok(text)
    }
}

/// Send every fragment of `data`; `Err` once the receiver is dropped.
async fn forward(
    tx: &mpsc::Sender<Result<String, ModelError>>,
    data: &str,
) -> Result<(), ()> {
    match event_fragments(data) {
        Ok(fragments) => {
            for fragment in fragments {
                tx.send(Ok(fragment)).await.map_err(|_| ())?;
            }
            Ok(())
        }
        Err(e) => {
            tx.send(Err(e)).await.map_err(|_| ())?;
            Err(())
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, description: &str) -> Result<ImageResponse, ModelError> {
        self.api_key()?;
        retry_transient(&self.retry, || self.request_image(description)).await
    }
}
