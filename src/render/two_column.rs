//! Two-column template: centered title, two text columns and an optional
//! full-width image strip along the bottom.

use log::warn;

use crate::deck::geometry::fit_scaled;
use crate::deck::{inches, Align, Font, Paragraph, Rect, SlidePage, TextBody};

use super::{ImageOutcome, PageGeometry, SlideImage};

const IMAGE_FIT_RATIO: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoColumnLayout {
    pub title: Rect,
    pub columns: [Rect; 2],
    pub image_area: Option<Rect>,
}

/// Lay out the page. `wants_image` reserves the bottom strip; it is dropped
/// when the page leaves too little room for text or image.
pub fn layout(page: PageGeometry, wants_image: bool) -> TwoColumnLayout {
    let margin = page.margin();
    let max_image_height = inches(3.0);
    let min_text_area = inches(3.0);
    let image_gap = inches(0.3);
    let column_gap = inches(0.4);

    let title = Rect::new(margin, inches(0.5), page.content_width(), inches(1.2));

    let content_top = title.bottom() + inches(0.2);
    let mut content_height = page.height - content_top - margin;

    let keep_image = wants_image && content_height > min_text_area;
    if keep_image {
        content_height -= max_image_height + image_gap;
    }

    let column_width = (page.content_width() - column_gap) / 2;
    let left = Rect::new(margin, content_top, column_width, content_height.max(0));
    let right = Rect::new(
        margin + column_width + column_gap,
        content_top,
        column_width,
        content_height.max(0),
    );

    let image_area = keep_image
        .then(|| page.height - (content_top + content_height) - margin)
        .filter(|&remaining| remaining >= inches(2.0))
        .map(|remaining| {
            let height = remaining.min(max_image_height);
            Rect::new(
                margin,
                page.height - height - margin,
                page.content_width(),
                height,
            )
        });

    TwoColumnLayout {
        title,
        columns: [left, right],
        image_area,
    }
}

pub fn render(
    page: &mut SlidePage,
    geometry: PageGeometry,
    title: &str,
    columns: [&[String]; 2],
    image: SlideImage,
    description: &str,
) -> ImageOutcome {
    let layout = layout(geometry, matches!(image, SlideImage::Ready(_)));

    page.add_text_box(
        layout.title,
        TextBody {
            paragraphs: vec![Paragraph::new(title, Font::sized(26.0).bold()).align(Align::Center)],
            word_wrap: true,
            ..Default::default()
        },
    );

    for (frame, points) in layout.columns.into_iter().zip(columns) {
        page.add_text_box(
            frame,
            TextBody {
                paragraphs: points
                    .iter()
                    .map(|point| Paragraph::new(point.as_str(), Font::sized(16.0)))
                    .collect(),
                word_wrap: true,
                ..Default::default()
            },
        );
    }

    let prepared = match image {
        SlideImage::Ready(prepared) => prepared,
        SlideImage::Failed(_) | SlideImage::Missing => return ImageOutcome::Omitted,
    };
    let Some(area) = layout.image_area else {
        warn!("No room for an image strip; image dropped");
        return ImageOutcome::Omitted;
    };

    match fit_scaled(prepared.width, prepared.height, area, IMAGE_FIT_RATIO) {
        Some(frame) => {
            page.add_picture(frame, &prepared, description);
            ImageOutcome::Embedded
        }
        None => {
            warn!("Image could not be scaled into {:?}; image dropped", area);
            ImageOutcome::Omitted
        }
    }
}
