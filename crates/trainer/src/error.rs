use nlm_core::NetworkError;
use std::path::PathBuf;
use thiserror::Error;
use tokenizer::TokenizerError;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error("Cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot create {path:?}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Reserved token {0:?} is missing from the vocabulary")]
    MissingSpecialToken(String),

    #[error("Input contains no tokens")]
    EmptyInput,

    #[error("Perplexity is not finite (average log10 probability {0})")]
    NonFinite(f64),

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TrainError>;
