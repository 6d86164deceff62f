//! In-memory `ImageBackend` for tests.

use crate::{
    error::{BrewError, Result},
    gemini::backend::ImageBackend,
    models::{ImageGenerationRequest, ImagePayload},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Records every request and replays queued responses.
///
/// With nothing queued it answers with a single three-byte JPEG header.
/// When gated, each call waits for one `release()` before answering.
pub struct RecordingBackend {
    requests: Mutex<Vec<ImageGenerationRequest>>,
    responses: Mutex<VecDeque<Result<Vec<ImagePayload>>>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::new()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn push_images(&self, images: Vec<Vec<u8>>) {
        let payloads = images
            .into_iter()
            .map(|bytes| ImagePayload { bytes })
            .collect();
        self.responses.lock().unwrap().push_back(Ok(payloads));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(BrewError::RequestError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<ImageGenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageBackend for RecordingBackend {
    async fn generate_images(&self, request: &ImageGenerationRequest) -> Result<Vec<ImagePayload>> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(vec![ImagePayload {
                    bytes: vec![0xff, 0xd8, 0xff],
                }])
            })
    }

    fn name(&self) -> &str {
        "recording"
    }
}
