use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid network configuration: {0}")]
    InvalidConfig(String),

    #[error("Context has {actual} ids, network expects {expected}")]
    ContextLength { expected: usize, actual: usize },

    #[error("Token id {id} is outside the vocabulary (size {vocab_size})")]
    IdOutOfRange { id: i64, vocab_size: i64 },

    #[error("Learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),

    #[error("Parameter {0} does not exist in this network")]
    ParameterOutOfRange(String),

    #[error("Non-finite log probability {value} for target {target}")]
    NonFinite { value: f64, target: i64 },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
