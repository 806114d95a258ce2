use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load tickets from {path}: {message}")]
    Load { path: String, message: String },

    #[error("Unrecognized date format: {0}")]
    DateParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("No tickets found for company: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
