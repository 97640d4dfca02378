pub mod schema;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub use schema::response_schema;

/// The four slide shapes the model may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideCategory {
    Title,
    Bullet,
    TwoColumn,
    ContentWithImage,
}

impl SlideCategory {
    pub const ALL: [SlideCategory; 4] = [
        SlideCategory::Title,
        SlideCategory::Bullet,
        SlideCategory::TwoColumn,
        SlideCategory::ContentWithImage,
    ];

    /// Label used in the response schema and in previews.
    pub fn label(self) -> &'static str {
        match self {
            SlideCategory::Title => "Title Slide",
            SlideCategory::Bullet => "Bullet Slide",
            SlideCategory::TwoColumn => "Two Column Slide",
            SlideCategory::ContentWithImage => "Content with Image Slide",
        }
    }

    /// Resolve a category string as written by the model or a client.
    ///
    /// Matching is case-insensitive, treats `_` and `-` as spaces and ignores
    /// a trailing "slide", so `"Bullet Slide"`, `"bullet_slide"` and
    /// `"content_with_image"` all resolve.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.to_lowercase().replace(['_', '-'], " ");
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let words = match words.split_last() {
            Some((&"slide", rest)) => rest,
            _ => &words[..],
        };

        match words.join(" ").as_str() {
            "title" => Some(SlideCategory::Title),
            "bullet" | "bullets" => Some(SlideCategory::Bullet),
            "two column" => Some(SlideCategory::TwoColumn),
            "content with image" => Some(SlideCategory::ContentWithImage),
            _ => None,
        }
    }
}

impl fmt::Display for SlideCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleSlideContent {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletSlideContent {
    #[serde(default)]
    pub title: String,
    pub bullets: Vec<String>,
    #[serde(default)]
    pub image_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoColumnSlideContent {
    #[serde(default)]
    pub title: String,
    pub left_column: Vec<String>,
    pub right_column: Vec<String>,
    #[serde(default)]
    pub image_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentWithImageSlideContent {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_description: String,
}

/// Slide body; the variant is the category, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    Title(TitleSlideContent),
    Bullet(BulletSlideContent),
    TwoColumn(TwoColumnSlideContent),
    ContentWithImage(ContentWithImageSlideContent),
}

impl SlideContent {
    pub fn category(&self) -> SlideCategory {
        match self {
            SlideContent::Title(_) => SlideCategory::Title,
            SlideContent::Bullet(_) => SlideCategory::Bullet,
            SlideContent::TwoColumn(_) => SlideCategory::TwoColumn,
            SlideContent::ContentWithImage(_) => SlideCategory::ContentWithImage,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SlideContent::Title(c) => &c.title,
            SlideContent::Bullet(c) => &c.title,
            SlideContent::TwoColumn(c) => &c.title,
            SlideContent::ContentWithImage(c) => &c.title,
        }
    }

    /// The image prompt, if the slide asks for one.
    pub fn image_description(&self) -> Option<&str> {
        let desc = match self {
            SlideContent::Title(c) => &c.image_description,
            SlideContent::Bullet(c) => &c.image_description,
            SlideContent::TwoColumn(c) => &c.image_description,
            SlideContent::ContentWithImage(c) => &c.image_description,
        };
        let desc = desc.trim();
        (!desc.is_empty()).then_some(desc)
    }
}

/// A validated slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub slide_no: u32,
    pub content: SlideContent,
}

impl Slide {
    pub fn category(&self) -> SlideCategory {
        self.content.category()
    }
}

/// A slide exactly as the model (or a client) sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSlide {
    /// Anything but a non-negative integer (or its string form) reads as
    /// absent.
    #[serde(default, deserialize_with = "lenient_slide_no")]
    pub slide_no: Option<u32>,
    /// Non-string values read as `""`, which validation rejects.
    #[serde(default, deserialize_with = "lenient_category")]
    pub slide_category: String,
    #[serde(default = "empty_object")]
    pub slide_content: serde_json::Value,
}

fn lenient_slide_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(number.and_then(|n| u32::try_from(n).ok()))
}

fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SlideError {
    #[error("unrecognized slide category {0:?}")]
    UnknownCategory(String),

    #[error("content does not match category {category}: {reason}")]
    ContentMismatch {
        category: SlideCategory,
        reason: String,
    },
}

impl RawSlide {
    /// Validate into a [`Slide`]. `position` is the 1-based index used when
    /// the slide carries no number of its own.
    pub fn validate(&self, position: u32) -> Result<Slide, SlideError> {
        let category = SlideCategory::parse(&self.slide_category)
            .ok_or_else(|| SlideError::UnknownCategory(self.slide_category.clone()))?;

        let content = match category {
            SlideCategory::Title => SlideContent::Title(shape(category, &self.slide_content)?),
            SlideCategory::Bullet => SlideContent::Bullet(shape(category, &self.slide_content)?),
            SlideCategory::TwoColumn => {
                SlideContent::TwoColumn(shape(category, &self.slide_content)?)
            }
            SlideCategory::ContentWithImage => {
                SlideContent::ContentWithImage(shape(category, &self.slide_content)?)
            }
        };

        Ok(Slide {
            slide_no: self.slide_no.unwrap_or(position),
            content,
        })
    }
}

fn shape<T: serde::de::DeserializeOwned>(
    category: SlideCategory,
    value: &serde_json::Value,
) -> Result<T, SlideError> {
    T::deserialize(value).map_err(|e| SlideError::ContentMismatch {
        category,
        reason: e.to_string(),
    })
}
