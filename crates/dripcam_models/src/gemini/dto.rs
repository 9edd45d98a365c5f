//! Request bodies for the Gemini `generateContent` endpoint.
//!
//! Responses are not modeled; see the `extract` module.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::Serialize;

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    /// MIME type of the decoded bytes
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// One part of a content block.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    /// Text instruction
    Text {
        /// Prompt text
        text: String,
    },
    /// Inline binary data
    Inline {
        /// The payload
        inline_data: InlineData,
    },
}

/// A content block.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    /// Ordered parts
    pub parts: Vec<Part>,
}

/// Request body for `{model}:generateContent`.
#[derive(Debug, Clone, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct GenerateContentRequest {
    /// Content blocks
    contents: Vec<RequestContent>,
}

impl GenerateContentRequest {
    /// Creates a new builder for GenerateContentRequest.
    pub fn builder() -> GenerateContentRequestBuilder {
        GenerateContentRequestBuilder::default()
    }

    /// Single-turn request: the prompt followed by one inline image.
    pub fn image_edit(
        prompt: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    Part::Text {
                        text: prompt.into(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.into(),
                            data: data.into(),
                        },
                    },
                ],
            }],
        }
    }
}
