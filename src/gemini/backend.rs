use crate::{
    error::Result,
    models::{ImageGenerationRequest, ImagePayload},
};
use async_trait::async_trait;

/// The remote image-generation capability.
///
/// Implementations perform exactly one call per invocation and return every
/// image the service produced, in order.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_images(&self, request: &ImageGenerationRequest) -> Result<Vec<ImagePayload>>;

    fn name(&self) -> &str;
}
