use crate::logger::LogLevel;
use std::env;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub history_capacity: Option<usize>,
    pub log_json: bool,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<String>,
    pub gemini: Option<GeminiConfig>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            api_base: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `API_KEY` (or `GEMINI_API_KEY`) and `IMAGEN_API_BASE`.
    ///
    /// A missing key is not an error here; requests made without one fail.
    pub fn from_env() -> Self {
        let api_key = non_empty_env("API_KEY").or_else(|| non_empty_env("GEMINI_API_KEY"));
        let api_base = non_empty_env("IMAGEN_API_BASE");

        GeminiConfig { api_key, api_base }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn resolved_api_base(&self) -> String {
        self.api_base
            .as_deref()
            .map(|base| base.trim().trim_end_matches('/'))
            .filter(|base| !base.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            port: None,
            history_capacity: None,
            log_json: false,
            log_level: None,
            log_file: None,
            gemini: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = non_empty_env("HOST");
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let history_capacity = env::var("HISTORY_CAPACITY")
            .ok()
            .and_then(|val| val.parse().ok())
            .filter(|capacity: &usize| *capacity > 0);
        let log_json = env::var("LOG_FORMAT")
            .ok()
            .map_or(false, |val| val.eq_ignore_ascii_case("json"));
        let log_level = non_empty_env("LOG_LEVEL").and_then(|val| LogLevel::from_name(&val));
        let log_file = non_empty_env("LOG_FILE");

        Config {
            host,
            port,
            history_capacity,
            log_json,
            log_level,
            log_file,
            gemini: Some(GeminiConfig::from_env()),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity.max(1));
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Also appends every log line to `path`.
    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn capacity(&self) -> usize {
        self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
