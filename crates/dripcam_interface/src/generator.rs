//! External image generation.

use async_trait::async_trait;
use dripcam_error::GenerationError;

/// A provider that turns a source image and prompt into a new image.
///
/// Implementations make a single attempt per call. Retry policy belongs to
/// the caller.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image from `source_image` guided by `prompt`.
    async fn generate(&self, source_image: &[u8], prompt: &str)
    -> Result<Vec<u8>, GenerationError>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &str {
        "unknown"
    }
}
