/// Free-text preview of slide content, rendered as markdown.
pub const SLIDE_PREVIEW: &str = "\
Create a concise slide content preview based on the user's input. Format the preview \
in markdown using headings, bullet points or whatever structure a presentation slide \
would normally carry. Keep the content clear, engaging and on the topic the user gave.";

/// Classification of slide text into the four slide shapes.
pub const SLIDE_STRUCTURE: &str = "\
You turn raw slide ideas into structured slides. Map every slide to exactly one category:

1. Title Slide: introduces the presentation. Fields: title, subtitle, content.
2. Bullet Slide: three to five short points. Fields: title, bullets.
3. Two Column Slide: content that splits naturally into a left and a right side. \
Fields: title, left_column, right_column.
4. Content with Image Slide: a paragraph of text paired with a visual. Fields: title, content.

For every slide:
- Fill in the fields its category requires and number slides from 1.
- Where a slide has a `content` field, write a short paragraph on what the slide is for.
- Always give an `image_description` naming the visual that would suit the slide, \
for example \"bar chart of yearly growth\" or \"team collaborating at a whiteboard\".

Answer only with JSON matching the response schema.

When the user follows up with changes, return the complete slide list again with the \
changes applied.";

/// Sent ahead of every image description.
pub const IMAGE_INSTRUCTIONS: &str = "\
Generate a single presentation-ready illustration for the description below. \
Prefer clean compositions with no embedded text.";
