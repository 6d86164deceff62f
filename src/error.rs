use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrewError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<reqwest::Error> for BrewError {
    fn from(err: reqwest::Error) -> Self {
        BrewError::RequestError(err.to_string())
    }
}

impl From<base64::DecodeError> for BrewError {
    fn from(err: base64::DecodeError) -> Self {
        BrewError::EncodingError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BrewError>;
