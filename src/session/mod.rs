pub mod history;

use crate::{
    gemini::ImageClient,
    models::{
        AspectRatio, GenerateOutcome, GeneratedImage, SessionInput, SessionSnapshot,
        SessionState, SkipReason, GENERATION_FAILED_MESSAGE,
    },
};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub use history::{History, THUMBNAIL_COUNT};

struct SessionData {
    state: SessionState,
    input: SessionInput,
    history: History,
}

/// Drives one user's generation session.
///
/// Holds the current input, the session state and the image history. At most
/// one generation is in flight at a time; the lock is released while the
/// remote call is pending so the session stays readable.
pub struct GenerationSession {
    client: ImageClient,
    data: Mutex<SessionData>,
}

impl GenerationSession {
    pub fn new(client: ImageClient, history_capacity: usize) -> Self {
        Self {
            client,
            data: Mutex::new(SessionData {
                state: SessionState::Idle,
                input: SessionInput::default(),
                history: History::with_capacity(history_capacity),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock().input.prompt = prompt.into();
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.lock().input.aspect_ratio = aspect_ratio;
    }

    /// Replaces the input unless a generation is running. Returns false if it is.
    pub fn update_input(&self, prompt: impl Into<String>, aspect_ratio: Option<AspectRatio>) -> bool {
        let mut data = self.lock();
        if data.state.is_generating() {
            return false;
        }
        data.input.prompt = prompt.into();
        if let Some(aspect_ratio) = aspect_ratio {
            data.input.aspect_ratio = aspect_ratio;
        }
        true
    }

    pub fn input(&self) -> SessionInput {
        self.lock().input.clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Whether the trigger control is enabled.
    pub fn can_generate(&self) -> bool {
        let data = self.lock();
        !data.state.is_generating() && data.input.has_prompt()
    }

    pub fn history(&self) -> Vec<Arc<GeneratedImage>> {
        self.lock().history.iter().cloned().collect()
    }

    pub fn image(&self, id: Uuid) -> Option<Arc<GeneratedImage>> {
        self.lock().history.get(id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let data = self.lock();
        SessionSnapshot {
            state: data.state.clone(),
            input: data.input.clone(),
            can_generate: !data.state.is_generating() && data.input.has_prompt(),
            featured: data.history.featured().map(|image| (*image).clone()),
            thumbnails: data
                .history
                .thumbnails()
                .map(|image| (**image).clone())
                .collect(),
            history_len: data.history.len(),
        }
    }

    /// Moves a history entry to the front. Never touches the session state.
    pub fn select(&self, id: Uuid) -> bool {
        let promoted = self.lock().history.promote(id);
        if promoted {
            log::debug!("Promoted image {} to the front of history", id);
        }
        promoted
    }

    /// Runs one generation with the current input.
    ///
    /// Failures are recorded in the session state, never returned as errors.
    pub async fn generate(&self) -> GenerateOutcome {
        let input = {
            let mut data = self.lock();
            if !data.input.has_prompt() {
                return GenerateOutcome::Skipped {
                    reason: SkipReason::BlankPrompt,
                };
            }
            if data.state.is_generating() {
                return GenerateOutcome::Skipped {
                    reason: SkipReason::InFlight,
                };
            }
            data.state = SessionState::Generating {
                started_at: Utc::now(),
            };
            data.input.clone()
        };
        let in_flight = InFlightGuard {
            session: self,
            armed: true,
        };

        let requested_at = Utc::now().timestamp_millis();
        let result = self
            .client
            .generate(&input.prompt, input.aspect_ratio)
            .await;
        in_flight.disarm();

        let mut data = self.lock();
        match result {
            Ok(url) => {
                let timestamp = Utc::now().timestamp_millis().max(requested_at);
                let image = data.history.prepend(GeneratedImage::new(
                    url,
                    input.prompt,
                    input.aspect_ratio,
                    timestamp,
                ));
                data.state = SessionState::Idle;
                log::info!("Image {} added to history ({} total)", image.id, data.history.len());
                GenerateOutcome::Completed {
                    image: (*image).clone(),
                }
            }
            Err(e) => {
                log::error!("Error generating image: {}", e);
                data.state = SessionState::Failed {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                };
                GenerateOutcome::Failed {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }
}

/// Returns the session to `Idle` when a generation future is dropped mid-flight.
struct InFlightGuard<'a> {
    session: &'a GenerationSession,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut data = self.session.lock();
        if data.state.is_generating() {
            log::warn!("Generation abandoned before the image arrived");
            data.state = SessionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::RecordingBackend;
    use crate::models::ImageGenerationRequest;
    use std::time::Duration;

    fn session_with(backend: Arc<RecordingBackend>, capacity: usize) -> GenerationSession {
        GenerationSession::new(ImageClient::new(backend), capacity)
    }

    #[tokio::test]
    async fn test_successful_generation_prepends_entry() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend.clone(), 10);
        session.set_prompt("latte with galaxy art");
        session.set_aspect_ratio(AspectRatio::Square);

        let before = Utc::now().timestamp_millis();
        let outcome = session.generate().await;
        assert!(matches!(outcome, GenerateOutcome::Completed { .. }));

        assert_eq!(
            backend.requests(),
            vec![ImageGenerationRequest {
                model: "imagen-4.0-generate-001".into(),
                prompt: "latte with galaxy art".into(),
                number_of_images: 1,
                output_mime_type: "image/jpeg".into(),
                aspect_ratio: AspectRatio::Square,
            }]
        );

        let history = session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "latte with galaxy art");
        assert_eq!(history[0].aspect_ratio, AspectRatio::Square);
        assert!(!history[0].url.is_empty());
        assert!(history[0].timestamp >= before);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_new_entries_shift_prior_ones_down() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend, 10);

        session.set_prompt("first");
        session.generate().await;
        session.set_prompt("second");
        session.set_aspect_ratio(AspectRatio::Landscape16x9);
        session.generate().await;

        let prompts: Vec<String> = session.history().iter().map(|i| i.prompt.clone()).collect();
        assert_eq!(prompts, vec!["second", "first"]);
        assert_eq!(session.history()[0].aspect_ratio, AspectRatio::Landscape16x9);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_a_no_op() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend.clone(), 10);

        for prompt in ["", "   ", "\n\t"] {
            session.set_prompt(prompt);
            assert!(!session.can_generate());
            let outcome = session.generate().await;
            assert_eq!(
                outcome,
                GenerateOutcome::Skipped {
                    reason: SkipReason::BlankPrompt
                }
            );
        }

        assert!(backend.requests().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_history_and_records_message() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend.clone(), 10);
        session.set_prompt("cortado");
        session.generate().await;

        backend.push_failure("network unreachable");
        let outcome = session.generate().await;
        assert_eq!(
            outcome,
            GenerateOutcome::Failed {
                message: GENERATION_FAILED_MESSAGE.into()
            }
        );
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.state().error_message(),
            Some(GENERATION_FAILED_MESSAGE)
        );
        assert!(session.can_generate());

        // a manual retry clears the error
        let outcome = session.generate().await;
        assert!(matches!(outcome, GenerateOutcome::Completed { .. }));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_single_request_in_flight() {
        let backend = Arc::new(RecordingBackend::gated());
        let session = session_with(backend.clone(), 10);
        session.set_prompt("golden coffee");

        let first = session.generate();
        let observer = async {
            tokio::task::yield_now().await;
            assert!(session.state().is_generating());
            assert!(!session.can_generate());
            let second = session.generate().await;
            backend.release();
            second
        };

        let (first, second) = futures::join!(first, observer);
        assert!(matches!(first, GenerateOutcome::Completed { .. }));
        assert_eq!(
            second,
            GenerateOutcome::Skipped {
                reason: SkipReason::InFlight
            }
        );
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(session.history().len(), 1);
        assert!(session.can_generate());
    }

    #[tokio::test]
    async fn test_abandoned_generation_can_be_retried() {
        let backend = Arc::new(RecordingBackend::gated());
        let session = session_with(backend.clone(), 10);
        session.set_prompt("irish coffee");

        let abandoned = tokio::time::timeout(Duration::from_millis(20), session.generate()).await;
        assert!(abandoned.is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.can_generate());
        assert!(session.history().is_empty());

        backend.release();
        let outcome = session.generate().await;
        assert!(matches!(outcome, GenerateOutcome::Completed { .. }));
        assert_eq!(backend.requests().len(), 2);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_update_input_refused_while_generating() {
        let backend = Arc::new(RecordingBackend::gated());
        let session = session_with(backend.clone(), 10);
        assert!(session.update_input("flat white", Some(AspectRatio::Portrait3x4)));

        let first = session.generate();
        let observer = async {
            while backend.requests().is_empty() {
                tokio::task::yield_now().await;
            }
            let accepted = session.update_input("ristretto", Some(AspectRatio::Square));
            backend.release();
            accepted
        };
        let (_, accepted) = futures::join!(first, observer);

        assert!(!accepted);
        let input = session.input();
        assert_eq!(input.prompt, "flat white");
        assert_eq!(input.aspect_ratio, AspectRatio::Portrait3x4);

        assert!(session.update_input("ristretto", None));
        assert_eq!(session.input().aspect_ratio, AspectRatio::Portrait3x4);
    }

    #[tokio::test]
    async fn test_select_reorders_without_generating() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend.clone(), 10);
        for prompt in ["a", "b", "c", "d"] {
            session.set_prompt(prompt);
            session.generate().await;
        }
        // history: d c b a
        let target = session.history()[2].id;

        assert!(session.select(target));
        let prompts: Vec<String> = session.history().iter().map(|i| i.prompt.clone()).collect();
        assert_eq!(prompts, vec!["b", "d", "c", "a"]);
        assert_eq!(backend.requests().len(), 4);
        assert_eq!(session.state(), SessionState::Idle);

        assert!(!session.select(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_snapshot_view() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session_with(backend, 3);

        let empty = session.snapshot();
        assert!(empty.featured.is_none());
        assert!(!empty.can_generate);

        session.set_prompt("plum tea");
        for _ in 0..4 {
            session.generate().await;
        }
        let snapshot = session.snapshot();
        assert_eq!(snapshot.history_len, 3);
        assert!(snapshot.featured.is_some());
        assert_eq!(snapshot.thumbnails.len(), 2);
        assert!(snapshot.can_generate);
    }
}
