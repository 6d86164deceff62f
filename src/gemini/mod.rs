pub mod backend;
pub mod data_uri;
pub mod image_client;
pub mod imagen;
#[cfg(test)]
pub(crate) mod testing;

use crate::config::GeminiConfig;
use std::sync::Arc;

pub use backend::ImageBackend;
pub use image_client::ImageClient;
pub use imagen::ImagenBackend;

/// Entry point to the Gemini API capabilities used by the studio.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        if config.api_key.is_none() {
            log::warn!("No API key configured, image generation requests will fail");
        }

        Self::with_backend(Arc::new(ImagenBackend::new(&config)))
    }

    pub fn with_backend(backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            image_client: ImageClient::new(backend),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
