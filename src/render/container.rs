//! Image containers and the placeholder shown when no image can be placed.

use crate::deck::geometry::fit_within;
use crate::deck::{
    Align, Anchor, AutoShape, Fill, Font, Geometry, Paragraph, Rect, RenderCapabilities, Rgb,
    Shadow, SlidePage, TextBody,
};

use super::{palette, placeholder_text, ImageOutcome, SlideImage};

/// Look of the rounded box an image sits in.
#[derive(Debug, Clone)]
pub struct ContainerStyle {
    pub fill: Fill,
    /// Used when gradients are unavailable.
    pub flat_fill: Rgb,
    pub line: Rgb,
    pub shadow: Shadow,
    /// Fraction of the container the image may occupy on each axis.
    pub fit_ratio: f64,
}

/// Draw the container at `area`, then the image fitted inside it or a
/// placeholder covering it.
pub fn image_container(
    page: &mut SlidePage,
    area: Rect,
    style: &ContainerStyle,
    capabilities: &RenderCapabilities,
    image: SlideImage,
    description: &str,
) -> ImageOutcome {
    page.add_auto_shape(
        "Image Container",
        AutoShape {
            frame: area,
            geometry: Geometry::RoundRect,
            is_text_box: false,
            fill: Some(capabilities.fill(style.fill.clone(), style.flat_fill)),
            line: Some(style.line),
            shadow: capabilities.shadow(style.shadow),
            text: None,
        },
    );

    let outcome = match image {
        SlideImage::Ready(prepared) => {
            match fit_within(prepared.width, prepared.height, area, style.fit_ratio) {
                Some(frame) => {
                    page.add_picture(frame, &prepared, description);
                    return ImageOutcome::Embedded;
                }
                None => ImageOutcome::ErrorPlaceholder,
            }
        }
        SlideImage::Failed(_) => ImageOutcome::ErrorPlaceholder,
        SlideImage::Missing => ImageOutcome::Placeholder,
    };

    placeholder(page, area, placeholder_text(outcome));
    outcome
}

pub fn placeholder(page: &mut SlidePage, area: Rect, text: &str) {
    page.add_auto_shape(
        "Image Placeholder",
        AutoShape {
            frame: area,
            geometry: Geometry::Rect,
            is_text_box: false,
            fill: Some(Fill::Solid(palette::PLACEHOLDER_FILL)),
            line: Some(palette::PLACEHOLDER_LINE),
            shadow: None,
            text: Some(TextBody {
                paragraphs: vec![Paragraph::new(
                    text,
                    Font::sized(14.0).color(palette::PLACEHOLDER_TEXT),
                )
                .align(Align::Center)],
                word_wrap: true,
                fit_shape_to_text: false,
                anchor: Anchor::Middle,
            }),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{inches, PreparedImage, ShapeKind};

    fn style() -> ContainerStyle {
        ContainerStyle {
            fill: Fill::Gradient(Rgb(245, 245, 255), Rgb(225, 225, 240)),
            flat_fill: Rgb(235, 235, 248),
            line: Rgb(180, 180, 200),
            shadow: Shadow {
                blur: 101_600,
                distance: 50_800,
            },
            fit_ratio: 0.9,
        }
    }

    fn area() -> Rect {
        Rect::new(inches(5.3), inches(3.8), inches(4.0), inches(3.0))
    }

    #[test]
    fn missing_image_gets_placeholder() {
        let mut page = SlidePage::default();
        let outcome = image_container(
            &mut page,
            area(),
            &style(),
            &RenderCapabilities::default(),
            SlideImage::Missing,
            "",
        );
        assert_eq!(outcome, ImageOutcome::Placeholder);
        assert_eq!(page.shapes.len(), 2);
        let text = page.shapes[1].as_auto().unwrap().text.as_ref().unwrap();
        assert_eq!(text.texts(), vec!["Image Placeholder"]);
        assert!(page.media.is_empty());
    }

    #[test]
    fn failed_image_gets_error_placeholder() {
        let mut page = SlidePage::default();
        let failed = PreparedImage::from_bytes(b"nope").unwrap_err();
        let outcome = image_container(
            &mut page,
            area(),
            &style(),
            &RenderCapabilities::default(),
            SlideImage::Failed(failed),
            "",
        );
        assert_eq!(outcome, ImageOutcome::ErrorPlaceholder);
        let text = page.shapes[1].as_auto().unwrap().text.as_ref().unwrap();
        assert_eq!(text.texts(), vec!["Image Error"]);
    }

    #[test]
    fn ready_image_is_fitted_inside_the_container() {
        let mut page = SlidePage::default();
        let prepared = PreparedImage {
            png: vec![1, 2, 3],
            width: 1024,
            height: 1024,
        };
        let outcome = image_container(
            &mut page,
            area(),
            &style(),
            &RenderCapabilities::default(),
            SlideImage::Ready(prepared),
            "a chart",
        );
        assert_eq!(outcome, ImageOutcome::Embedded);
        assert_eq!(page.media.len(), 1);
        let picture = &page.shapes[1];
        assert!(matches!(picture.kind, ShapeKind::Picture(_)));
        assert!(area().contains(&picture.frame()));
        assert_eq!(picture.frame().cy, (inches(3.0) as f64 * 0.9).floor() as i64);
    }

    #[test]
    fn container_without_capabilities_is_flat_and_unshadowed() {
        let mut page = SlidePage::default();
        image_container(
            &mut page,
            area(),
            &style(),
            &RenderCapabilities {
                gradients: false,
                shadows: false,
            },
            SlideImage::Missing,
            "",
        );
        let container = page.shapes[0].as_auto().unwrap();
        assert_eq!(container.fill, Some(Fill::Solid(Rgb(235, 235, 248))));
        assert_eq!(container.shadow, None);
    }
}
