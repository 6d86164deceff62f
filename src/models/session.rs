use super::image::{AspectRatio, GeneratedImage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing message recorded for every failed generation.
pub const GENERATION_FAILED_MESSAGE: &str = "图片生成失败，请重试。";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Generating { started_at: DateTime<Utc> },
    Failed { message: String },
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    pub fn is_generating(&self) -> bool {
        matches!(self, SessionState::Generating { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl SessionInput {
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    BlankPrompt,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GenerateOutcome {
    Completed { image: GeneratedImage },
    Failed { message: String },
    Skipped { reason: SkipReason },
}

/// Serializable view of a session, as rendered by the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub input: SessionInput,
    pub can_generate: bool,
    pub featured: Option<GeneratedImage>,
    pub thumbnails: Vec<GeneratedImage>,
    pub history_len: usize,
}
