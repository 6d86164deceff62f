use crate::{
    config::GeminiConfig,
    error::{BrewError, Result},
    gemini::backend::ImageBackend,
    models::{ImageGenerationRequest, ImagePayload, PredictRequest, PredictResponse},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Imagen over the Gemini API `:predict` REST endpoint.
#[derive(Clone)]
pub struct ImagenBackend {
    client: Client,
    api_key: Option<String>,
    api_base: String,
}

impl ImagenBackend {
    pub fn new(config: &GeminiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.resolved_api_base(),
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:predict", self.api_base, model)
    }

    fn build_headers(&self, api_key: &str) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        let value: reqwest::header::HeaderValue = api_key
            .parse()
            .map_err(|_| BrewError::ConfigError("API key is not a valid header value".into()))?;
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }
}

#[async_trait]
impl ImageBackend for ImagenBackend {
    async fn generate_images(&self, request: &ImageGenerationRequest) -> Result<Vec<ImagePayload>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BrewError::ConfigError("API_KEY is not set".into()))?;

        let endpoint = self.endpoint(&request.model);
        let payload = PredictRequest::from(request);

        log::debug!(
            "Imagen request: model={} aspect_ratio={} sample_count={}",
            request.model,
            request.aspect_ratio,
            payload.parameters.sample_count
        );

        let response = self
            .client
            .post(&endpoint)
            .headers(self.build_headers(api_key)?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BrewError::RequestError(format!("Imagen request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BrewError::ResponseError(format!("Imagen body read failed: {}", e)))?;

        if !status.is_success() {
            return Err(BrewError::ResponseError(format!(
                "Imagen returned {}: {}",
                status.as_u16(),
                truncate(&body, 512)
            )));
        }

        parse_predictions(&body)
    }

    fn name(&self) -> &str {
        "imagen"
    }
}

pub(crate) fn parse_predictions(body: &str) -> Result<Vec<ImagePayload>> {
    let response: PredictResponse = serde_json::from_str(body)
        .map_err(|e| BrewError::ResponseError(format!("Invalid Imagen payload: {}", e)))?;

    let mut images = Vec::with_capacity(response.predictions.len());
    let mut filtered = None;
    for prediction in response.predictions {
        match prediction.bytes_base64_encoded {
            Some(encoded) => images.push(ImagePayload {
                bytes: STANDARD.decode(encoded.as_bytes())?,
            }),
            None => filtered = filtered.or(prediction.rai_filtered_reason),
        }
    }

    if images.is_empty() {
        if let Some(reason) = filtered {
            return Err(BrewError::ResponseError(format!(
                "Image was filtered: {}",
                reason
            )));
        }
    }

    Ok(images)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let backend = ImagenBackend::new(
            &GeminiConfig::new().with_api_base("http://localhost:9000/v1beta/"),
        );
        assert_eq!(
            backend.endpoint("imagen-4.0-generate-001"),
            "http://localhost:9000/v1beta/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_parse_predictions() {
        let images = parse_predictions(
            r#"{"predictions":[{"bytesBase64Encoded":"/9j/","mimeType":"image/jpeg"}]}"#,
        )
        .unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_parse_predictions_errors() {
        assert!(parse_predictions("not json").is_err());
        assert!(parse_predictions(r#"{"predictions":[{"bytesBase64Encoded":"***"}]}"#).is_err());

        let err = parse_predictions(r#"{"predictions":[{"raiFilteredReason":"unsafe"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unsafe"));

        assert!(parse_predictions("{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let backend = ImagenBackend::new(&GeminiConfig::new());
        let request = ImageGenerationRequest::new("espresso", Default::default());
        let err = backend.generate_images(&request).await.unwrap_err();
        assert!(matches!(err, BrewError::ConfigError(_)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
