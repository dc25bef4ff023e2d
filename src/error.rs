use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("source unavailable [{source_id}]: {message}")]
    SourceUnavailable {
        source_id: &'static str,
        message: String,
    },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RadarError>;
