//! Gemini `generateContent` image client.

mod client;
mod dto;
mod extract;

pub use client::GeminiImageClient;
pub use dto::{
    GenerateContentRequest, GenerateContentRequestBuilder, InlineData, Part, RequestContent,
};
pub use extract::{extract_declined_text, extract_inline_image};
