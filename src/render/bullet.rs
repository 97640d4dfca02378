//! Bullet template: title and bullet list on the left, image column on the right.

use crate::deck::{
    inches, pt, Bullet, Fill, Font, Paragraph, Rect, RenderCapabilities, Rgb, Shadow, SlidePage,
    TextBody,
};

use super::container::{image_container, ContainerStyle};
use super::{palette, stack_gap, ImageOutcome, PageGeometry, SlideImage, TYPEFACE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletLayout {
    pub title: Rect,
    pub bullets: Rect,
    pub container: Rect,
}

pub fn layout(page: PageGeometry) -> BulletLayout {
    let margin = page.margin();
    let image_col = inches(3.2).max((page.width as f64 * 0.42) as i64);
    let text_width = page.width - margin - image_col - inches(0.3) - margin;

    let title = Rect::new(margin, inches(0.7), text_width, inches(1.5));

    // The list only uses the upper half of the page.
    let bullets_top = title.bottom() + stack_gap();
    let bullets_height = (page.height / 2 - bullets_top).max(0);
    let bullets = Rect::new(margin, bullets_top, text_width, bullets_height);

    let container_top = title.bottom() + inches(0.3);
    let container = Rect::new(
        page.width - image_col - margin,
        container_top,
        image_col,
        (page.bottom_limit() - container_top).max(0),
    );

    BulletLayout {
        title,
        bullets,
        container,
    }
}

fn container_style() -> ContainerStyle {
    ContainerStyle {
        fill: Fill::Solid(Rgb(250, 250, 250)),
        flat_fill: Rgb(250, 250, 250),
        line: Rgb(200, 200, 200),
        shadow: Shadow {
            blur: pt(6.0),
            distance: pt(4.0),
        },
        fit_ratio: 0.85,
    }
}

pub fn render(
    page: &mut SlidePage,
    geometry: PageGeometry,
    capabilities: &RenderCapabilities,
    title: &str,
    bullets: &[String],
    image: SlideImage,
    description: &str,
) -> ImageOutcome {
    let layout = layout(geometry);

    page.add_text_box(
        layout.title,
        TextBody {
            paragraphs: vec![Paragraph::new(
                title,
                Font::sized(22.0)
                    .bold()
                    .color(palette::TITLE)
                    .typeface(TYPEFACE),
            )],
            word_wrap: true,
            ..Default::default()
        },
    );

    let paragraphs = bullets
        .iter()
        .map(|point| {
            Paragraph::new(
                point.as_str(),
                Font::sized(16.0).color(palette::BULLET).typeface(TYPEFACE),
            )
            .bullet(Bullet {
                char: '•',
                margin_left: 342_900,
                indent: -171_450,
            })
            .space_after(6.0)
        })
        .collect();
    page.add_text_box(
        layout.bullets,
        TextBody {
            paragraphs,
            word_wrap: true,
            ..Default::default()
        },
    );

    image_container(
        page,
        layout.container,
        &container_style(),
        capabilities,
        image,
        description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

    fn page() -> PageGeometry {
        PageGeometry {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    #[test]
    fn image_column_takes_at_least_42_percent() {
        let layout = layout(page());
        assert_eq!(layout.container.cx, (DEFAULT_WIDTH as f64 * 0.42) as i64);

        let narrow = layout_for(inches(6.0), DEFAULT_HEIGHT);
        assert_eq!(narrow.container.cx, inches(3.2));
    }

    fn layout_for(width: i64, height: i64) -> BulletLayout {
        layout(PageGeometry { width, height })
    }

    #[test]
    fn bullets_stop_at_half_page() {
        let layout = layout(page());
        assert_eq!(layout.bullets.y, layout.title.bottom() + pt(6.0));
        assert_eq!(layout.bullets.bottom(), DEFAULT_HEIGHT / 2);
        assert!(layout.bullets.right() < layout.container.x);
    }

    #[test]
    fn bullet_height_is_never_negative() {
        let layout = layout_for(DEFAULT_WIDTH, inches(3.0));
        assert_eq!(layout.bullets.cy, 0);
        assert!(layout.container.cy >= 0);
    }

    #[test]
    fn one_paragraph_per_bullet_in_order() {
        let mut slide = SlidePage::default();
        let bullets = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        render(
            &mut slide,
            page(),
            &RenderCapabilities::default(),
            "Agenda",
            &bullets,
            SlideImage::Missing,
            "",
        );
        let list = slide.text_boxes().nth(1).unwrap().text.as_ref().unwrap();
        assert_eq!(list.texts(), vec!["first", "second", "third"]);
        assert!(list.paragraphs.iter().all(|p| p.bullet.is_some()));
    }
}
