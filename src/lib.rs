//! BrewMaster AI: coffee artwork generation with Google Imagen.
//!
//! [`GeminiClient`] talks to the remote image model, [`GenerationSession`]
//! keeps the per-session state and history, and the optional `server`
//! feature exposes both as a small web studio.

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

pub use config::{Config, GeminiConfig};
pub use error::{BrewError, Result};
pub use gemini::{GeminiClient, ImageBackend, ImageClient, ImagenBackend};
pub use models::{
    AspectRatio, GenerateOutcome, GeneratedImage, ImageGenerationRequest, ImagePayload,
    SessionInput, SessionSnapshot, SessionState, SkipReason,
};
pub use session::{GenerationSession, History};
