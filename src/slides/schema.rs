//! Response schema sent with structured generation requests.
//!
//! Gemini accepts an OpenAPI-style subset: upper-case type names, `enum` on
//! strings and `required` lists. The slide body is a single object carrying
//! the union of all shape fields; which ones are meaningful depends on the
//! category and is checked by [`super::RawSlide::validate`].

use serde_json::{json, Value};

use super::SlideCategory;

pub fn response_schema() -> Value {
    let categories: Vec<&str> = SlideCategory::ALL.iter().map(|c| c.label()).collect();
    let text_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "slide_no": { "type": "INTEGER" },
                "slide_category": { "type": "STRING", "enum": categories },
                "slide_content": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "subtitle": { "type": "STRING" },
                        "content": { "type": "STRING" },
                        "bullets": text_list,
                        "left_column": text_list,
                        "right_column": text_list,
                        "image_description": { "type": "STRING" }
                    },
                    "required": ["title", "image_description"]
                }
            },
            "required": ["slide_no", "slide_category", "slide_content"],
            "propertyOrdering": ["slide_no", "slide_category", "slide_content"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_category() {
        let schema = response_schema();
        let values = schema["items"]["properties"]["slide_category"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(values.len(), 4);
        assert!(values.contains(&Value::from("Two Column Slide")));
    }
}
