//! Slide list to `.pptx`: per-slide validation, image generation, rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::ai::{ImageGenerator, ModelError};
use crate::deck::{DeckError, Presentation, RenderCapabilities};
use crate::render::{render_slide, ImageOutcome, SlideImage};
use crate::slides::{RawSlide, Slide};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("image generation failed: {0}")]
    Image(#[from] ModelError),

    #[error("failed to write presentation: {0}")]
    Deck(#[from] DeckError),
}

/// A slide left out of the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSlide {
    /// 1-based position in the request.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct DeckOutput {
    pub bytes: Vec<u8>,
    pub rendered: usize,
    pub skipped: Vec<SkippedSlide>,
    /// Image result per rendered slide, in order.
    pub images: Vec<ImageOutcome>,
}

impl DeckOutput {
    /// Comma-separated 1-based indices of skipped slides.
    pub fn skipped_indices(&self) -> String {
        self.skipped
            .iter()
            .map(|s| s.index.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub struct DeckPipeline {
    images: Option<Arc<dyn ImageGenerator>>,
    capabilities: RenderCapabilities,
    debug_dir: Option<PathBuf>,
}

impl DeckPipeline {
    /// `images: None` renders every image region as a placeholder.
    pub fn new(images: Option<Arc<dyn ImageGenerator>>, capabilities: RenderCapabilities) -> Self {
        Self {
            images,
            capabilities,
            debug_dir: None,
        }
    }

    /// Copy every image the model returns into `dir`, decodable or not.
    pub fn with_debug_dir(mut self, dir: Option<&Path>) -> Self {
        self.debug_dir = dir.map(Path::to_path_buf);
        self
    }

    /// Render `slides` in order. Invalid slides are skipped and reported;
    /// an image request that still fails after retries aborts the deck.
    pub async fn build(&self, slides: &[RawSlide]) -> Result<DeckOutput, PipelineError> {
        let mut deck = Presentation::new(self.capabilities);
        let mut skipped = Vec::new();
        let mut images = Vec::new();

        for (position, raw) in slides.iter().enumerate() {
            let index = position + 1;
            let slide = match raw.validate(index as u32) {
                Ok(slide) => slide,
                Err(e) => {
                    warn!("Skipping slide {}: {}", index, e);
                    skipped.push(SkippedSlide {
                        index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            info!("Processing slide {} of category: {}", index, slide.category());

            let image = self.slide_image(index, &slide).await?;
            let outcome = render_slide(&mut deck, &slide, image);
            debug!("Slide {} image: {:?}", index, outcome);
            images.push(outcome);
        }

        let bytes = deck.to_bytes()?;
        info!(
            "Deck built: {} slides rendered, {} skipped, {} bytes",
            images.len(),
            skipped.len(),
            bytes.len()
        );
        Ok(DeckOutput {
            bytes,
            rendered: images.len(),
            skipped,
            images,
        })
    }

    async fn slide_image(&self, index: usize, slide: &Slide) -> Result<SlideImage, ModelError> {
        let (Some(generator), Some(description)) =
            (self.images.as_ref(), slide.content.image_description())
        else {
            return Ok(SlideImage::Missing);
        };

        let response = generator.generate_image(description).await?;
        let Some(inline) = response.image else {
            warn!("Slide {}: model returned no image", index);
            return Ok(SlideImage::Missing);
        };

        let image = SlideImage::prepare(Some(&inline.data));
        if let Some(dir) = self.debug_dir.as_deref() {
            // Undecodable payloads are kept as received.
            let bytes = match &image {
                SlideImage::Ready(prepared) => prepared.png.as_slice(),
                _ => inline.data.as_slice(),
            };
            save_debug_image(dir, index, bytes).await;
        }
        Ok(image)
    }
}

/// Best-effort copy to `<dir>/slide_<index>_<timestamp>.png`.
async fn save_debug_image(dir: &Path, index: usize, png: &[u8]) {
    let name = format!(
        "slide_{}_{}.png",
        index,
        chrono::Local::now().format("%Y%m%d_%H%M%S_%6f")
    );
    let path = dir.join(name);
    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, png).await
    }
    .await;
    match result {
        Ok(()) => debug!("Saved image to {}", path.display()),
        Err(e) => warn!("Could not save debug image {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawSlide {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn invalid_slides_are_skipped_and_reported() {
        let pipeline = DeckPipeline::new(None, RenderCapabilities::default());
        let slides = vec![
            raw(json!({"slide_category": "Title Slide", "slide_content": {"title": "Hi"}})),
            raw(json!({"slide_category": "Quote Slide", "slide_content": {"title": "?"}})),
            raw(json!({"slide_category": "Bullet Slide", "slide_content": {"title": "no bullets"}})),
            raw(json!({"slide_category": "bullet_slide", "slide_content": {"bullets": ["a"]}})),
        ];
        let output = pipeline.build(&slides).await.unwrap();

        assert_eq!(output.rendered, 2);
        assert_eq!(output.skipped_indices(), "2,3");
        assert!(output.skipped[0].reason.contains("Quote Slide"));
        assert_eq!(
            output.images,
            vec![ImageOutcome::Placeholder, ImageOutcome::Placeholder]
        );
    }

    #[tokio::test]
    async fn empty_list_still_produces_a_package() {
        let pipeline = DeckPipeline::new(None, RenderCapabilities::default());
        let output = pipeline.build(&[]).await.unwrap();
        assert_eq!(output.rendered, 0);
        assert!(output.skipped.is_empty());
        assert_eq!(&output.bytes[..2], b"PK");
    }
}
