//! Image generation provider integrations for Dripcam.
//!
//! Currently one provider: Google Gemini's image-capable models, called over
//! plain HTTPS with `reqwest`.

mod gemini;

pub use gemini::{
    GeminiImageClient, GenerateContentRequest, GenerateContentRequestBuilder, InlineData, Part,
    RequestContent, extract_declined_text, extract_inline_image,
};
