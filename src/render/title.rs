//! Title template: stacked text on the left, image container in the
//! bottom-right corner. Also used for content-with-image slides, which have
//! no subtitle.

use crate::deck::{
    inches, pt, Fill, Font, Paragraph, Rect, RenderCapabilities, Rgb, Shadow, SlidePage, TextBody,
};

use super::container::{image_container, ContainerStyle};
use super::{palette, stack_gap, ImageOutcome, PageGeometry, SlideImage, TYPEFACE};

pub struct TitleText<'a> {
    pub title: &'a str,
    /// Empty when absent.
    pub subtitle: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleLayout {
    pub title: Rect,
    pub subtitle: Option<Rect>,
    pub body: Option<Rect>,
    pub container: Rect,
}

pub fn layout(page: PageGeometry, has_subtitle: bool, has_body: bool) -> TitleLayout {
    let margin = page.margin();
    let container_w = inches(4.0);
    let container_h = inches(3.0);

    let text_left = margin;
    // Room for the 4.5in image column plus padding.
    let text_width = page.width - margin - inches(4.5) - inches(0.25);

    let title = Rect::new(text_left, inches(0.9), text_width, inches(2.0));
    let mut next_top = title.bottom() + stack_gap();

    let subtitle = has_subtitle.then(|| {
        let rect = Rect::new(text_left, next_top, text_width, inches(1.0));
        next_top = rect.bottom() + stack_gap();
        rect
    });

    let body = has_body.then(|| {
        let height = (page.bottom_limit() - next_top).max(0);
        Rect::new(text_left, next_top, text_width, height)
    });

    let container = Rect::new(
        page.width - container_w - margin,
        page.height - container_h - margin,
        container_w,
        container_h,
    );

    TitleLayout {
        title,
        subtitle,
        body,
        container,
    }
}

fn container_style() -> ContainerStyle {
    ContainerStyle {
        fill: Fill::Gradient(Rgb(245, 245, 255), Rgb(225, 225, 240)),
        flat_fill: Rgb(245, 245, 255),
        line: Rgb(180, 180, 200),
        shadow: Shadow {
            blur: pt(8.0),
            distance: pt(4.0),
        },
        fit_ratio: 0.9,
    }
}

pub fn render(
    page: &mut SlidePage,
    geometry: PageGeometry,
    capabilities: &RenderCapabilities,
    text: TitleText<'_>,
    image: SlideImage,
    description: &str,
) -> ImageOutcome {
    let subtitle = text.subtitle.trim();
    let body = text.body.trim();
    let layout = layout(geometry, !subtitle.is_empty(), !body.is_empty());

    page.add_text_box(
        layout.title,
        TextBody {
            paragraphs: vec![Paragraph::new(
                text.title,
                Font::sized(24.0)
                    .bold()
                    .color(palette::TITLE)
                    .typeface(TYPEFACE),
            )],
            word_wrap: true,
            fit_shape_to_text: true,
            ..Default::default()
        },
    );

    if let Some(frame) = layout.subtitle {
        page.add_text_box(
            frame,
            TextBody {
                paragraphs: vec![Paragraph::new(
                    subtitle,
                    Font::sized(18.0)
                        .italic()
                        .color(palette::SUBTITLE)
                        .typeface(TYPEFACE),
                )],
                word_wrap: true,
                ..Default::default()
            },
        );
    }

    if let Some(frame) = layout.body {
        page.add_text_box(
            frame,
            TextBody {
                paragraphs: vec![Paragraph::new(
                    body,
                    Font::sized(14.0).color(palette::BODY).typeface(TYPEFACE),
                )
                .space_after(6.0)],
                word_wrap: true,
                ..Default::default()
            },
        );
    }

    image_container(
        page,
        layout.container,
        &container_style(),
        capabilities,
        image,
        description,
    )
}
