use crate::{
    error::{BrewError, Result},
    gemini::{backend::ImageBackend, data_uri},
    logger,
    models::{AspectRatio, ImageGenerationRequest, IMAGE_MODEL_ID},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn ImageBackend>,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![(IMAGE_MODEL_ID, "Imagen 4", "Google")]
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Requests one JPEG for `prompt` and returns it as a data URI.
    ///
    /// Makes a single attempt; any failure is returned to the caller as is.
    pub async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<String> {
        let request = ImageGenerationRequest::new(prompt, aspect_ratio);

        log::info!(
            "Generating image with model: {} ({})",
            request.model,
            request.aspect_ratio
        );
        let timer = logger::timer("imagen generate");
        let images = self.backend.generate_images(&request).await?;
        drop(timer);

        let image = images
            .into_iter()
            .next()
            .ok_or_else(|| BrewError::ResponseError("No images generated".into()))?;

        log::debug!("Received image payload of {} bytes", image.bytes.len());
        Ok(data_uri::encode_jpeg(&image.bytes))
    }
}
