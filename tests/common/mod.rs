//! Fake model backends and request helpers shared by the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use deckgen::ai::{
    ChatTurn, ImageGenerator, ImageResponse, InlineImage, ModelError, TextGenerator, TextStream,
};
use deckgen::api::{self, AppState};
use deckgen::config::AppConfig;

/// Text model with canned replies. Records the history of its last call.
#[derive(Default)]
pub struct FakeText {
    pub fragments: Vec<String>,
    pub structured: String,
    /// Fail before anything is streamed or returned.
    pub unavailable: bool,
    /// Emit the fragments, then a stream error.
    pub break_stream: bool,
    pub last_history: Mutex<Vec<ChatTurn>>,
}

impl FakeText {
    pub fn structured(reply: &str) -> Self {
        Self {
            structured: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    fn check(&self, history: &[ChatTurn]) -> Result<(), ModelError> {
        *self.last_history.lock() = history.to_vec();
        if self.unavailable {
            return Err(ModelError::Status {
                status: 503,
                body: "overloaded".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn stream_text(
        &self,
        _prompt: &str,
        history: &[ChatTurn],
    ) -> Result<TextStream, ModelError> {
        self.check(history)?;
        let mut items: Vec<Result<String, ModelError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if self.break_stream {
            items.push(Err(ModelError::Decode("connection reset".to_string())));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ModelError> {
        self.check(history)?;
        Ok(self.structured.clone())
    }
}

pub enum ImageBehavior {
    Png(Vec<u8>),
    Garbage,
    NoImage,
    Fail(u16),
}

pub struct FakeImages {
    pub behavior: ImageBehavior,
    pub calls: AtomicUsize,
    pub descriptions: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn new(behavior: ImageBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            descriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, description: &str) -> Result<ImageResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.descriptions.lock().push(description.to_string());
        let image = |data: Vec<u8>| ImageResponse {
            text: Some("Here you go".to_string()),
            image: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data,
            }),
        };
        match &self.behavior {
            ImageBehavior::Png(png) => Ok(image(png.clone())),
            ImageBehavior::Garbage => Ok(image(b"not an image".to_vec())),
            ImageBehavior::NoImage => Ok(ImageResponse {
                text: Some("I can't draw that".to_string()),
                image: None,
            }),
            ImageBehavior::Fail(status) => Err(ModelError::Status {
                status: *status,
                body: "image model down".to_string(),
            }),
        }
    }
}

/// A solid-colour PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Config for tests: no API key, no debug image directory.
pub fn test_config() -> AppConfig {
    AppConfig {
        debug_images_dir: String::new(),
        ..Default::default()
    }
}

pub fn build_test_app(text: Arc<FakeText>, images: Arc<FakeImages>) -> Router {
    api::router(AppState::new(test_config(), text, images))
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Text of every part in a `.pptx`, keyed by part name.
pub fn read_parts(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

pub fn part(bytes: &[u8], name: &str) -> String {
    read_parts(bytes)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, data)| String::from_utf8(data).unwrap())
        .unwrap_or_else(|| panic!("missing part {name}"))
}

pub fn has_part(bytes: &[u8], name: &str) -> bool {
    read_parts(bytes).iter().any(|(n, _)| n == name)
}
