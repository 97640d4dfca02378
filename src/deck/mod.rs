//! A small PresentationML writer: just enough of the format to lay out the
//! generated slides and package them as a `.pptx`.

pub mod geometry;
pub mod image;
pub mod package;
pub mod shape;
pub mod xml;

pub use geometry::{inches, pt, Emu, Rect};
pub use self::image::{ImageError, PreparedImage};
pub use shape::{
    Align, Anchor, AutoShape, Bullet, Fill, Font, Geometry, Paragraph, Picture, Rgb, Shadow,
    Shape, ShapeKind, TextBody,
};

/// 10in x 7.5in, the classic 4:3 page.
pub const DEFAULT_WIDTH: Emu = 9_144_000;
pub const DEFAULT_HEIGHT: Emu = 6_858_000;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build slide xml: {0}")]
    Xml(#[from] std::fmt::Error),
}

pub type DeckResult<T> = Result<T, DeckError>;

/// Rendering features the output may rely on, decided once per deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCapabilities {
    pub gradients: bool,
    pub shadows: bool,
}

impl Default for RenderCapabilities {
    fn default() -> Self {
        Self {
            gradients: true,
            shadows: true,
        }
    }
}

impl RenderCapabilities {
    /// `preferred` when gradients are available, otherwise a flat `fallback`.
    pub fn fill(&self, preferred: Fill, fallback: Rgb) -> Fill {
        match preferred {
            Fill::Gradient(..) if !self.gradients => Fill::Solid(fallback),
            fill => fill,
        }
    }

    pub fn shadow(&self, shadow: Shadow) -> Option<Shadow> {
        self.shadows.then_some(shadow)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background(pub Fill);

/// One page: background, shapes in z-order and the images they embed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlidePage {
    pub background: Option<Background>,
    pub shapes: Vec<Shape>,
    /// PNG payloads referenced by [`Picture::media`].
    pub media: Vec<Vec<u8>>,
}

impl SlidePage {
    fn next_id(&self) -> u32 {
        // id 1 is the shape tree itself
        self.shapes.len() as u32 + 2
    }

    pub fn add_text_box(&mut self, frame: Rect, text: TextBody) -> &Shape {
        let id = self.next_id();
        self.push(Shape {
            id,
            name: format!("TextBox {id}"),
            kind: ShapeKind::Auto(AutoShape {
                frame,
                geometry: Geometry::Rect,
                is_text_box: true,
                fill: None,
                line: None,
                shadow: None,
                text: Some(text),
            }),
        })
    }

    pub fn add_auto_shape(&mut self, name: &str, shape: AutoShape) -> &Shape {
        let id = self.next_id();
        self.push(Shape {
            id,
            name: format!("{name} {id}"),
            kind: ShapeKind::Auto(shape),
        })
    }

    pub fn add_picture(&mut self, frame: Rect, image: &PreparedImage, description: &str) -> &Shape {
        let id = self.next_id();
        self.media.push(image.png.clone());
        let media = self.media.len() - 1;
        self.push(Shape {
            id,
            name: format!("Picture {id}"),
            kind: ShapeKind::Picture(Picture {
                frame,
                media,
                description: description.to_string(),
            }),
        })
    }

    fn push(&mut self, shape: Shape) -> &Shape {
        self.shapes.push(shape);
        &self.shapes[self.shapes.len() - 1]
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &AutoShape> {
        self.shapes
            .iter()
            .filter_map(Shape::as_auto)
            .filter(|s| s.is_text_box)
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_picture())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub title: String,
    pub width: Emu,
    pub height: Emu,
    pub capabilities: RenderCapabilities,
    pub slides: Vec<SlidePage>,
}

impl Presentation {
    pub fn new(capabilities: RenderCapabilities) -> Self {
        Self {
            title: "Generated Presentation".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            capabilities,
            slides: Vec::new(),
        }
    }

    pub fn add_slide(&mut self) -> &mut SlidePage {
        self.slides.push(SlidePage::default());
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn to_bytes(&self) -> DeckResult<Vec<u8>> {
        package::write_package(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_ids_are_sequential_from_two() {
        let mut page = SlidePage::default();
        page.add_text_box(Rect::new(0, 0, 10, 10), TextBody::default());
        let second = page.add_auto_shape(
            "Image Placeholder",
            AutoShape {
                frame: Rect::new(0, 0, 10, 10),
                geometry: Geometry::Rect,
                is_text_box: false,
                fill: None,
                line: None,
                shadow: None,
                text: None,
            },
        );
        assert_eq!(second.id, 3);
        assert_eq!(second.name, "Image Placeholder 3");
        assert_eq!(page.text_boxes().count(), 1);
    }

    #[test]
    fn capabilities_downgrade_gradients_and_shadows() {
        let flat = RenderCapabilities {
            gradients: false,
            shadows: false,
        };
        let gradient = Fill::Gradient(Rgb(255, 230, 230), Rgb(255, 255, 255));
        assert_eq!(
            flat.fill(gradient.clone(), Rgb(255, 250, 250)),
            Fill::Solid(Rgb(255, 250, 250))
        );
        assert_eq!(
            flat.shadow(Shadow {
                blur: 1,
                distance: 1
            }),
            None
        );
        assert_eq!(
            RenderCapabilities::default().fill(gradient.clone(), Rgb(0, 0, 0)),
            gradient
        );
    }
}
