//! Gateway to the generative service.
//!
//! One function per capability, each a single `generateContent` call whose
//! reply parts are demultiplexed into typed results. Demultiplexing is kept
//! separate from transport so reply handling is testable without a network.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    data_uri, CompositeResult, ElementReport, MoodboardResult, SimilarItem, UploadedImage,
};
use crate::parse;

/// Model used for image generation and image+text analysis.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
/// Model used for grounded text-only search.
pub const TEXT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// How much of an unexpected text reply gets surfaced to the user.
const TEXT_EXCERPT_LEN: usize = 160;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("generation blocked by the provider's safety filter ({reason})")]
    Blocked { reason: String },
    #[error("the provider returned no image for {op}")]
    NoImage { op: &'static str },
    #[error("element details were not valid JSON: {source}")]
    InvalidDetails {
        #[source]
        source: serde_json::Error,
    },
    #[error("the provider returned text instead of an image: {excerpt}")]
    TextInsteadOfImage { excerpt: String },
    #[error("{op} request failed: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op} request failed with status {status}: {body}")]
    Api {
        op: &'static str,
        status: u16,
        body: String,
    },
    #[error("{op} reply could not be decoded: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ---- wire shapes ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "inlineData",
        alias = "inline_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        inline_data: None,
    }
}

fn image_part(image: &UploadedImage) -> Part {
    Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: image.mime.clone(),
            data: general_purpose::STANDARD.encode(&image.bytes),
        }),
    }
}

// ---- reply helpers ----

fn parts(reply: &GenerateContentResponse) -> &[Part] {
    reply
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or(&[])
}

fn first_image(reply: &GenerateContentResponse) -> Option<&InlineData> {
    parts(reply).iter().find_map(|p| p.inline_data.as_ref())
}

fn first_text(reply: &GenerateContentResponse) -> Option<&str> {
    parts(reply)
        .iter()
        .find_map(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
}

fn block_reason(reply: &GenerateContentResponse) -> Option<&str> {
    reply
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
}

fn image_data_uri(inline: &InlineData) -> Result<String, GatewayError> {
    // Re-encoding through bytes validates the payload; the mime travels as-is.
    let bytes = general_purpose::STANDARD
        .decode(&inline.data)
        .map_err(|_| GatewayError::NoImage { op: "reply image" })?;
    Ok(data_uri(&inline.mime_type, &bytes))
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= TEXT_EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(TEXT_EXCERPT_LEN).collect();
        format!("{}…", cut)
    }
}

// ---- demultiplexers (pure) ----

fn demux_moodboard(reply: &GenerateContentResponse) -> Result<MoodboardResult, GatewayError> {
    if let Some(reason) = block_reason(reply) {
        return Err(GatewayError::Blocked {
            reason: reason.to_string(),
        });
    }
    let image = first_image(reply).ok_or(GatewayError::NoImage {
        op: "mood board generation",
    })?;
    Ok(MoodboardResult {
        image: image_data_uri(image)?,
        text: first_text(reply).unwrap_or_default().to_string(),
        palette: Vec::new(),
    })
}

fn demux_details(reply: &GenerateContentResponse) -> Result<ElementReport, GatewayError> {
    let image = first_image(reply).ok_or(GatewayError::NoImage {
        op: "element analysis",
    })?;
    let text = first_text(reply).ok_or(GatewayError::NoImage {
        op: "element analysis (no description)",
    })?;
    let details =
        parse::parse_details(text).map_err(|source| GatewayError::InvalidDetails { source })?;
    Ok(ElementReport {
        crop: image_data_uri(image)?,
        details,
    })
}

fn demux_enhance(reply: &GenerateContentResponse) -> Result<String, GatewayError> {
    let image = first_image(reply).ok_or(GatewayError::NoImage {
        op: "resolution enhancement",
    })?;
    image_data_uri(image)
}

fn demux_similar(reply: &GenerateContentResponse) -> Vec<SimilarItem> {
    reply
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|g| {
            g.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter(|web| !web.uri.is_empty())
                .map(|web| SimilarItem {
                    title: if web.title.is_empty() {
                        web.uri.clone()
                    } else {
                        web.title.clone()
                    },
                    uri: web.uri.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn demux_composite(reply: &GenerateContentResponse) -> Result<CompositeResult, GatewayError> {
    if let Some(image) = first_image(reply) {
        return Ok(CompositeResult {
            image: image_data_uri(image)?,
        });
    }
    if let Some(text) = first_text(reply) {
        return Err(GatewayError::TextInsteadOfImage {
            excerpt: excerpt(text),
        });
    }
    Err(GatewayError::NoImage {
        op: "composite generation",
    })
}

// ---- client ----

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    async fn generate(
        &self,
        op: &'static str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        tracing::debug!(op, model, "calling generation service");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { op, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport { op, source })?;
        if !status.is_success() {
            tracing::warn!(op, status = status.as_u16(), "service returned an error");
            return Err(GatewayError::Api {
                op,
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        serde_json::from_str(&body).map_err(|source| GatewayError::Decode { op, source })
    }

    /// Generate a mood board from one image and a composed prompt.
    pub async fn generate_moodboard(
        &self,
        image: &UploadedImage,
        prompt: &str,
    ) -> Result<MoodboardResult, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![text_part(prompt), image_part(image)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            }),
            tools: None,
        };
        let reply = self.generate("mood board generation", IMAGE_MODEL, &request).await?;
        demux_moodboard(&reply)
    }

    /// Analyze the marked copy of the mood board: returns the crop plus the
    /// structured details parsed from the text part.
    pub async fn get_element_details(
        &self,
        marked: &UploadedImage,
        prompt: &str,
    ) -> Result<ElementReport, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![text_part(prompt), image_part(marked)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            }),
            tools: None,
        };
        let reply = self.generate("element analysis", IMAGE_MODEL, &request).await?;
        demux_details(&reply)
    }

    /// Upscale an image; the reply must be image-only.
    pub async fn enhance_resolution(
        &self,
        image: &UploadedImage,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![text_part(prompt), image_part(image)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
            }),
            tools: None,
        };
        let reply = self
            .generate("resolution enhancement", IMAGE_MODEL, &request)
            .await?;
        demux_enhance(&reply)
    }

    /// Grounded web search for similar items. No grounding chunks in the
    /// reply means no results, not an error.
    pub async fn find_similar_items(
        &self,
        query: &str,
    ) -> Result<Vec<SimilarItem>, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![text_part(query)],
            }],
            generation_config: None,
            tools: Some(vec![Tool {
                google_search: serde_json::json!({}),
            }]),
        };
        let reply = self.generate("similar item search", TEXT_MODEL, &request).await?;
        Ok(demux_similar(&reply))
    }

    /// Combine the two uploaded images into one synthesized result.
    pub async fn generate_composite(
        &self,
        first: &UploadedImage,
        second: &UploadedImage,
        prompt: &str,
    ) -> Result<CompositeResult, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![text_part(prompt), image_part(first), image_part(second)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
            }),
            tools: None,
        };
        let reply = self
            .generate("composite generation", IMAGE_MODEL, &request)
            .await?;
        demux_composite(&reply)
    }
}
