//! Request/response records shared by the gateway, the session and the API.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag the user picks before generating; drives prompt variants
/// and which upload slots are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageCategory {
    #[default]
    General,
    Product,
    Fashion,
    Food,
    Architecture,
    Design,
    /// Outfit + person staging, needs a second image.
    TryOn,
    /// Product + background staging, needs a second image.
    Staging,
}

impl ImageCategory {
    /// Literal tag embedded in prompts.
    pub fn tag(&self) -> &'static str {
        match self {
            ImageCategory::General => "GENERAL",
            ImageCategory::Product => "PRODUCT",
            ImageCategory::Fashion => "FASHION",
            ImageCategory::Food => "FOOD",
            ImageCategory::Architecture => "ARCHITECTURE",
            ImageCategory::Design => "DESIGN",
            ImageCategory::TryOn => "TRY_ON",
            ImageCategory::Staging => "STAGING",
        }
    }

    /// Two-image modes need the secondary upload slot.
    pub fn requires_secondary(&self) -> bool {
        matches!(self, ImageCategory::TryOn | ImageCategory::Staging)
    }
}

/// Element classification returned by the details analysis; selects the
/// search phrasing for similar-item lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Product,
    FashionItem,
    FoodItem,
    ArchitecturalFeature,
    DesignElement,
    #[serde(other)]
    #[default]
    Other,
}

/// An uploaded image held in memory for the session.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl UploadedImage {
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }
}

/// Sniff the media type from the bytes; the declared multipart type is
/// untrusted.
pub fn sniff_mime(bytes: &[u8]) -> anyhow::Result<&'static str> {
    let format = image::guess_format(bytes)?;
    let mime = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::Gif => "image/gif",
        image::ImageFormat::WebP => "image/webp",
        image::ImageFormat::Bmp => "image/bmp",
        image::ImageFormat::Tiff => "image/tiff",
        other => anyhow::bail!("unsupported image format: {:?}", other),
    };
    Ok(mime)
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Split a `data:<mime>;base64,<payload>` URI back into mime + bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = general_purpose::STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "bin",
    }
}

/// Filename for a browser download: kind + timestamp + extension inferred
/// from the MIME type.
pub fn download_filename(kind: &str, mime: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}.{}",
        kind,
        at.format("%Y%m%d-%H%M%S"),
        extension_for_mime(mime)
    )
}

/// Generated mood board: image data URI, descriptive text, and a swatch
/// list the provider does not currently populate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodboardResult {
    pub image: String,
    pub text: String,
    pub palette: Vec<String>,
}

/// Crop returned by the element analysis together with its parsed details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementReport {
    pub crop: String,
    pub details: ElementDetails,
}

/// Structured description of one clicked region. Every nested object is
/// defaulted so a partial provider reply still deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementDetails {
    pub element_type: ElementType,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub style: StyleInfo,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub dimensions: Dimensions,
    pub description: String,
    pub market: MarketInfo,
    pub cultural_context: CulturalContext,
    pub technical_details: TechnicalDetails,
    pub recommendations: Recommendations,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleInfo {
    pub era: String,
    pub aesthetic: String,
    pub influences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketInfo {
    pub estimated_price_range: String,
    pub availability: String,
    pub brands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CulturalContext {
    pub origin: String,
    pub significance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalDetails {
    pub construction: String,
    pub care: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendations {
    pub pairs_well_with: Vec<String>,
    pub alternatives: Vec<String>,
}

/// One grounded web-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub title: String,
    pub uri: String,
}

/// Result of combining the two uploaded images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub image: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn data_uri_round_trip() {
        let uri = data_uri("image/png", b"hello");
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_rejects_non_data_uri() {
        assert!(decode_data_uri("https://example.com/x.png").is_none());
        assert!(decode_data_uri("data:image/png;base64,***").is_none());
    }

    #[test]
    fn download_filename_embeds_timestamp_and_extension() {
        let at = Utc.with_ymd_and_hms(2026, 8, 23, 14, 25, 1).unwrap();
        assert_eq!(
            download_filename("moodboard", "image/png", at),
            "moodboard-20260823-142501.png"
        );
        assert_eq!(
            download_filename("composite", "image/jpeg", at),
            "composite-20260823-142501.jpg"
        );
    }

    #[test]
    fn two_image_categories() {
        assert!(ImageCategory::TryOn.requires_secondary());
        assert!(ImageCategory::Staging.requires_secondary());
        assert!(!ImageCategory::Food.requires_secondary());
    }

    #[test]
    fn category_tags_are_screaming_snake() {
        assert_eq!(ImageCategory::Food.tag(), "FOOD");
        assert_eq!(ImageCategory::TryOn.tag(), "TRY_ON");
        assert_eq!(
            serde_json::to_string(&ImageCategory::TryOn).unwrap(),
            "\"TRY_ON\""
        );
    }

    #[test]
    fn unknown_element_type_falls_back_to_other() {
        let t: ElementType = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(t, ElementType::Other);
        let t: ElementType = serde_json::from_str("\"architectural_feature\"").unwrap();
        assert_eq!(t, ElementType::ArchitecturalFeature);
    }

    #[test]
    fn partial_details_deserialize_with_defaults() {
        let details: ElementDetails = serde_json::from_str(
            r#"{"elementType":"product","name":"brass lamp"}"#,
        )
        .unwrap();
        assert_eq!(details.element_type, ElementType::Product);
        assert_eq!(details.name, "brass lamp");
        assert!(details.materials.is_empty());
        assert_eq!(details.market, MarketInfo::default());
    }
}
