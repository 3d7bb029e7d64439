use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::{NetworkError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// N-gram order. The network conditions on the previous `context_size - 1` tokens.
    pub context_size: i64,
    /// Size of each word representation (rows of the embedding table).
    pub embedding_size: i64,
    /// Size of the hidden layer.
    pub hidden_size: i64,
    /// Size of the vocabulary. Normally taken from the built vocabulary.
    pub vocab_size: i64,
    /// Nonlinearity applied to the summed projections.
    pub activation: Activation,
    /// Seed of the single generator used to initialise every matrix.
    pub seed: u64,
    /// Half-width of each of the three uniform draws summed per weight.
    pub init_range: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            context_size: 3,
            embedding_size: 30,
            hidden_size: 30,
            vocab_size: 0,
            activation: Activation::Tanh,
            seed: 1,
            init_range: 0.1,
        }
    }
}

impl NetworkConfig {
    /// Number of context positions (N - 1).
    pub fn context_width(&self) -> usize {
        (self.context_size - 1).max(0) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.context_size < 2 {
            return Err(NetworkError::InvalidConfig(format!(
                "context_size must be at least 2, got {}",
                self.context_size
            )));
        }
        for (name, value) in [
            ("embedding_size", self.embedding_size),
            ("hidden_size", self.hidden_size),
            ("vocab_size", self.vocab_size),
        ] {
            if value <= 0 {
                return Err(NetworkError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "init_range must be positive, got {}",
                self.init_range
            )));
        }
        Ok(())
    }
}
