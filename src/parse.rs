//! Extracting structured JSON from model text replies.
//!
//! The provider sometimes wraps the JSON object in a fenced code block
//! (with or without a `json` language tag). Extraction is pure text work,
//! independent of transport: strip the fence when present, otherwise parse
//! the raw text.

use crate::models::ElementDetails;

/// Return the JSON payload inside the first fenced code block, or the
/// trimmed input when no fence is found.
pub fn extract_json_block(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];
    // Skip a language tag on the fence line.
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Parse a details reply, fenced or not, into the structured schema.
pub fn parse_details(text: &str) -> Result<ElementDetails, serde_json::Error> {
    serde_json::from_str(extract_json_block(text))
}

#[cfg(test)]
mod tests {
    use crate::models::ElementType;

    use super::*;

    const RAW: &str = r#"{"elementType":"fashion_item","name":"linen blazer","colors":["ecru"]}"#;

    #[test]
    fn fenced_and_raw_parse_identically() {
        let fenced = format!("```json\n{}\n```", RAW);
        assert_eq!(parse_details(RAW).unwrap(), parse_details(&fenced).unwrap());
    }

    #[test]
    fn fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", RAW);
        let details = parse_details(&fenced).unwrap();
        assert_eq!(details.element_type, ElementType::FashionItem);
        assert_eq!(details.name, "linen blazer");
    }

    #[test]
    fn fence_with_surrounding_prose() {
        let wrapped = format!("Here you go:\n```json\n{}\n```\nHope that helps!", RAW);
        assert_eq!(parse_details(&wrapped).unwrap().name, "linen blazer");
    }

    #[test]
    fn unterminated_fence_still_extracts() {
        let open_ended = format!("```json\n{}", RAW);
        assert_eq!(extract_json_block(&open_ended), RAW);
    }

    #[test]
    fn non_json_is_an_error() {
        assert!(parse_details("a lovely mid-century lamp").is_err());
        assert!(parse_details("```json\nnot json\n```").is_err());
    }
}
