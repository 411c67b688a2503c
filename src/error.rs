use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatlateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat source error: {0}")]
    Source(String),

    #[error("No live stream is currently active on the channel")]
    NoActiveStream,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatlateError>;
