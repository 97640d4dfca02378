//! Slide templates: turn a validated [`Slide`] into shapes on a new page.

pub mod bullet;
pub mod container;
pub mod title;
pub mod two_column;

use log::warn;

use crate::deck::{
    inches, pt, Background, Emu, Fill, ImageError, PreparedImage, Presentation,
    RenderCapabilities,
};
use crate::slides::{Slide, SlideContent};

pub const TYPEFACE: &str = "Segoe UI";

pub mod palette {
    use crate::deck::Rgb;

    pub const BACKGROUND_TOP: Rgb = Rgb(255, 230, 230);
    pub const BACKGROUND_BOTTOM: Rgb = Rgb(255, 255, 255);
    pub const BACKGROUND_FLAT: Rgb = Rgb(255, 250, 250);

    pub const TITLE: Rgb = Rgb(10, 10, 10);
    pub const SUBTITLE: Rgb = Rgb(95, 95, 95);
    pub const BODY: Rgb = Rgb(70, 70, 70);
    pub const BULLET: Rgb = Rgb(60, 60, 60);

    pub const PLACEHOLDER_FILL: Rgb = Rgb(240, 240, 240);
    pub const PLACEHOLDER_LINE: Rgb = Rgb(200, 200, 200);
    pub const PLACEHOLDER_TEXT: Rgb = Rgb(120, 120, 120);
}

/// Page size the templates lay out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: Emu,
    pub height: Emu,
}

impl PageGeometry {
    pub fn of(deck: &Presentation) -> Self {
        Self {
            width: deck.width,
            height: deck.height,
        }
    }

    /// Inset bounding all content.
    pub fn margin(&self) -> Emu {
        inches(0.7)
    }

    pub fn content_width(&self) -> Emu {
        self.width - 2 * self.margin()
    }

    /// Lowest y any content may reach.
    pub fn bottom_limit(&self) -> Emu {
        self.height - self.margin()
    }
}

/// Gap between stacked text boxes.
pub fn stack_gap() -> Emu {
    pt(6.0)
}

/// The bitmap a template receives, already decoded.
#[derive(Debug)]
pub enum SlideImage {
    Missing,
    Ready(PreparedImage),
    Failed(ImageError),
}

impl SlideImage {
    pub fn prepare(bytes: Option<&[u8]>) -> Self {
        match bytes {
            None => SlideImage::Missing,
            Some(bytes) => match PreparedImage::from_bytes(bytes) {
                Ok(image) => SlideImage::Ready(image),
                Err(e) => SlideImage::Failed(e),
            },
        }
    }
}

/// What ended up in a slide's image region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Embedded,
    Placeholder,
    /// The image could not be prepared; an error placeholder stands in.
    ErrorPlaceholder,
    Omitted,
}

pub fn background(capabilities: &RenderCapabilities) -> Background {
    Background(capabilities.fill(
        Fill::Gradient(palette::BACKGROUND_TOP, palette::BACKGROUND_BOTTOM),
        palette::BACKGROUND_FLAT,
    ))
}

/// Append one page for `slide` to `deck`.
///
/// Image problems are absorbed here (placeholder or omission) and never fail
/// the render.
pub fn render_slide(deck: &mut Presentation, slide: &Slide, image: SlideImage) -> ImageOutcome {
    let geometry = PageGeometry::of(deck);
    let capabilities = deck.capabilities;
    if let SlideImage::Failed(ref e) = image {
        warn!("Slide {}: image could not be prepared: {}", slide.slide_no, e);
    }

    let page = deck.add_slide();
    page.background = Some(background(&capabilities));

    let description = slide.content.image_description().unwrap_or_default();
    match &slide.content {
        SlideContent::Title(content) => title::render(
            page,
            geometry,
            &capabilities,
            title::TitleText {
                title: &content.title,
                subtitle: &content.subtitle,
                body: &content.content,
            },
            image,
            description,
        ),
        SlideContent::ContentWithImage(content) => title::render(
            page,
            geometry,
            &capabilities,
            title::TitleText {
                title: &content.title,
                subtitle: "",
                body: &content.content,
            },
            image,
            description,
        ),
        SlideContent::Bullet(content) => bullet::render(
            page,
            geometry,
            &capabilities,
            &content.title,
            &content.bullets,
            image,
            description,
        ),
        SlideContent::TwoColumn(content) => two_column::render(
            page,
            geometry,
            &content.title,
            [content.left_column.as_slice(), content.right_column.as_slice()],
            image,
            description,
        ),
    }
}

pub(crate) fn placeholder_text(outcome: ImageOutcome) -> &'static str {
    match outcome {
        ImageOutcome::ErrorPlaceholder => "Image Error",
        _ => "Image Placeholder",
    }
}
