use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("SSE parsing error: {0}")]
    SseParsing(String),

    /// A desktop operation backing an action was rejected.
    #[error("Executor error: {0}")]
    Executor(String),

    /// Tool-call arguments were not a valid action payload.
    #[error("Action parse error: {0}")]
    ActionParse(String),

    #[error("Desktop error: {0}")]
    Desktop(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl serde::Serialize for SurfError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type SurfResult<T> = Result<T, SurfError>;
