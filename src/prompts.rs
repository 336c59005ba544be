//! Prompt templates for the generation service.
//!
//! The category→variant mapping is a flat lookup on [`ImageCategory`], not a
//! hierarchy; every builder returns the final string sent to the provider.

use crate::models::{ElementDetails, ElementType, ImageCategory};

/// Fixed instructional template for mood-board generation. The category tag
/// is prepended, optional user instructions are appended.
pub const MOODBOARD_TEMPLATE: &str = "Create an annotated mood board from the attached image. \
Recompose its key visual elements into a single clean collage on a neutral background, \
keeping each element recognizable and well separated so individual elements can be pointed at. \
Then describe the board: list the dominant elements, the overall style, and the palette.";

/// Asks the model to zoom into the marked region and reply with structured
/// JSON only. The schema here must stay in sync with `models::ElementDetails`.
pub const ELEMENT_DETAILS_TEMPLATE: &str = "The attached image has a single red ring marker. \
Crop to the element under the marker and return that crop as an image, plus exactly one JSON object \
(no prose) describing it with fields: elementType (one of product, fashion_item, food_item, \
architectural_feature, design_element), name, category, subcategory, style {era, aesthetic, influences}, \
materials, colors, dimensions {width, height, depth, unit}, description, market \
{estimatedPriceRange, availability, brands}, culturalContext {origin, significance}, technicalDetails \
{construction, care}, recommendations {pairsWellWith, alternatives}, metadata.";

/// Upscale request; the reply must be image-only.
pub const ENHANCE_TEMPLATE: &str = "Upscale the attached image to a higher resolution. \
Preserve the composition, colors and every element exactly; only add detail and sharpness. \
Return the image only, no text.";

/// Mood-board prompt: literal category tag first, then the fixed template,
/// then any user instructions.
pub fn moodboard_prompt(category: ImageCategory, instructions: Option<&str>) -> String {
    let mut prompt = format!("{}\n\n{}", category.tag(), MOODBOARD_TEMPLATE);
    if let Some(extra) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str("\n\nAdditional instructions: ");
        prompt.push_str(extra);
    }
    prompt
}

/// Composite prompt for the two-image modes. `TryOn` dresses the person from
/// the second image in the first image's outfit; `Staging` places the first
/// image's subject into the second image's scene; anything else blends.
pub fn composite_prompt(category: ImageCategory, instructions: Option<&str>) -> String {
    let base = match category {
        ImageCategory::TryOn => {
            "Dress the person in the second image in the outfit from the first image. \
Keep the person's pose, face and proportions; render the clothing naturally with correct fit and lighting."
        }
        ImageCategory::Staging => {
            "Place the subject of the first image into the scene of the second image. \
Match perspective, scale, shadows and lighting so the result looks photographed in place."
        }
        _ => {
            "Combine the two attached images into one coherent photographic composition, \
keeping the main subject of each recognizable."
        }
    };
    let mut prompt = format!("{}\n\n{}", category.tag(), base);
    if let Some(extra) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str("\n\nAdditional instructions: ");
        prompt.push_str(extra);
    }
    prompt
}

/// Search phrasing for grounded similar-item lookup, keyed on the element
/// type: commerce for products and fashion, places for architecture, recipe
/// sources for food, art platforms for design elements, generic otherwise.
pub fn similar_items_query(details: &ElementDetails) -> String {
    let subject = if details.name.is_empty() {
        details.category.clone()
    } else {
        details.name.clone()
    };
    match details.element_type {
        ElementType::Product | ElementType::FashionItem => format!(
            "Find shopping links to buy \"{}\" or close matches online. \
Prefer major commerce and brand sites with current listings.",
            subject
        ),
        ElementType::ArchitecturalFeature => format!(
            "Find real places featuring \"{}\". \
Prefer map listings and location pages with the place name and where it is.",
            subject
        ),
        ElementType::FoodItem => format!(
            "Find recipes for \"{}\". Prefer recipe sites with full ingredient lists.",
            subject
        ),
        ElementType::DesignElement => format!(
            "Find reference works similar to \"{}\" on art and design platforms \
such as portfolios, galleries and design archives.",
            subject
        ),
        ElementType::Other => format!("Find web pages about \"{}\".", subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moodboard_prompt_prepends_category_tag() {
        let prompt = moodboard_prompt(ImageCategory::Food, None);
        assert!(prompt.starts_with("FOOD\n\n"));
        assert!(prompt.contains(MOODBOARD_TEMPLATE));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn moodboard_prompt_appends_trimmed_instructions() {
        let prompt = moodboard_prompt(ImageCategory::Design, Some("  warm tones  "));
        assert!(prompt.ends_with("Additional instructions: warm tones"));
        let prompt = moodboard_prompt(ImageCategory::Design, Some("   "));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn composite_prompt_varies_by_mode() {
        let try_on = composite_prompt(ImageCategory::TryOn, None);
        let staging = composite_prompt(ImageCategory::Staging, None);
        assert!(try_on.starts_with("TRY_ON"));
        assert!(try_on.contains("outfit"));
        assert!(staging.contains("scene"));
        assert_ne!(try_on, staging);
    }

    #[test]
    fn similar_query_is_location_oriented_for_architecture() {
        let details = ElementDetails {
            element_type: ElementType::ArchitecturalFeature,
            name: "flying buttress".into(),
            ..Default::default()
        };
        let query = similar_items_query(&details);
        assert!(query.contains("places"));
        assert!(query.contains("map"));
        assert!(query.contains("flying buttress"));
    }

    #[test]
    fn similar_query_is_commerce_oriented_for_products() {
        let details = ElementDetails {
            element_type: ElementType::Product,
            name: "brass floor lamp".into(),
            ..Default::default()
        };
        let query = similar_items_query(&details);
        assert!(query.contains("buy"));
        assert!(query.contains("commerce"));
    }

    #[test]
    fn similar_query_falls_back_to_category_when_unnamed() {
        let details = ElementDetails {
            element_type: ElementType::FoodItem,
            category: "pastry".into(),
            ..Default::default()
        };
        assert!(similar_items_query(&details).contains("pastry"));
    }
}
