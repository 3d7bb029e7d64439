use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vocabulary file is inconsistent: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, TokenizerError>;
