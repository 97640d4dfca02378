//! Markdown preview of a generated slide list.

use serde_json::Value;

use crate::ai::llm::StructuredOutput;
use crate::slides::{RawSlide, SlideCategory};

const MISSING: &str = "N/A";

fn field<'a>(content: &'a Value, key: &str) -> &'a str {
    content.get(key).and_then(Value::as_str).unwrap_or(MISSING)
}

fn items<'a>(content: &'a Value, key: &str) -> Vec<&'a str> {
    content
        .get(key)
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn push_list(out: &mut String, heading: &str, list: &[&str]) {
    if list.is_empty() {
        return;
    }
    out.push_str(&format!("\n\n**{}:**\n", heading));
    let lines: Vec<String> = list.iter().map(|item| format!("- {}", item)).collect();
    out.push_str(&lines.join("\n"));
}

/// One `---`-separated section per slide. Fields the model left out show
/// as `N/A`; unknown categories get only their header.
pub fn render_slides(slides: &[RawSlide]) -> String {
    let mut out = String::new();
    for (position, slide) in slides.iter().enumerate() {
        let number = slide.slide_no.unwrap_or(position as u32 + 1);
        let c = &slide.slide_content;
        out.push_str("---\n");
        out.push_str(&format!("### Slide {}", number));
        out.push_str(&format!("\n**Category:** {}\n", slide.slide_category));

        let Some(category) = SlideCategory::parse(&slide.slide_category) else {
            continue;
        };
        out.push_str(&format!("\n\n**Title:** {}", field(c, "title")));
        match category {
            SlideCategory::Title => {
                out.push_str(&format!("\n\n**Subtitle:** {}", field(c, "subtitle")));
                out.push_str(&format!("\n\n**Content:** {}", field(c, "content")));
            }
            SlideCategory::Bullet => push_list(&mut out, "Bullets", &items(c, "bullets")),
            SlideCategory::TwoColumn => {
                push_list(&mut out, "Left Column", &items(c, "left_column"));
                push_list(&mut out, "Right Column", &items(c, "right_column"));
            }
            SlideCategory::ContentWithImage => {
                if let Some(text) = c.get("content").and_then(Value::as_str) {
                    if !text.is_empty() {
                        out.push_str(&format!("\n\n**Content:**\n{}", text));
                    }
                }
            }
        }
        out.push_str(&format!(
            "\n\n**Image Description:** {}\n",
            field(c, "image_description")
        ));
    }
    out
}

pub fn render_output(output: &StructuredOutput) -> String {
    match output {
        StructuredOutput::Slides(slides) if slides.is_empty() => {
            "_The model returned no slides._".to_string()
        }
        StructuredOutput::Slides(slides) => render_slides(slides),
        StructuredOutput::Invalid { error, raw } => {
            format!("**{}**\n\n```\n{}\n```", error, raw)
        }
    }
}
