//! Backend traits for vibe-os.
//!
//! The session and client layers talk to a [`GenerationBackend`]; concrete
//! providers (Gemini REST, scripted mocks) live in `vibe-inference`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// =============================================================================
// GENERATION TYPES
// =============================================================================

/// One piece of multimodal request or response content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Base64-encoded binary payload.
    InlineData { mime_type: String, data: String },
    Text(String),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A single generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub parts: Vec<ContentPart>,
    /// Structured-output constraint in the provider schema dialect.
    pub response_schema: Option<Value>,
    /// Requested response MIME type (e.g. `application/json`).
    pub response_mime_type: Option<String>,
    /// Reasoning budget. `None` omits the setting entirely.
    pub thinking_budget: Option<u32>,
}

impl GenerationRequest {
    pub fn new(parts: Vec<ContentPart>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    /// Constrain output to JSON matching `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }

    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Total characters of text parts.
    pub fn prompt_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(t) => t.len(),
                ContentPart::InlineData { .. } => 0,
            })
            .sum()
    }
}

/// Content returned by a generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    pub parts: Vec<ContentPart>,
}

impl GenerationResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// Concatenated text parts, or `None` if the response carried no text.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// First inline binary part as `(mime_type, base64 data)`.
    pub fn first_inline(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|p| match p {
            ContentPart::InlineData { mime_type, data } => {
                Some((mime_type.as_str(), data.as_str()))
            }
            _ => None,
        })
    }
}

// =============================================================================
// BACKEND TRAITS
// =============================================================================

/// Backend for multimodal content generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation call.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let req = GenerationRequest::new(vec![
            ContentPart::inline("image/png", "QUJD"),
            ContentPart::text("describe"),
        ])
        .with_json_schema(json!({"type": "OBJECT"}))
        .with_thinking_budget(Some(1024));

        assert_eq!(req.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(req.thinking_budget, Some(1024));
        assert_eq!(req.prompt_len(), "describe".len());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let resp = GenerationResponse {
            parts: vec![
                ContentPart::text("{\"a\":"),
                ContentPart::inline("image/png", "xx"),
                ContentPart::text("1}"),
            ],
        };
        assert_eq!(resp.text().as_deref(), Some("{\"a\":1}"));
        assert_eq!(resp.first_inline(), Some(("image/png", "xx")));
    }

    #[test]
    fn test_empty_response() {
        let resp = GenerationResponse::default();
        assert!(resp.text().is_none());
        assert!(resp.first_inline().is_none());
    }
}
