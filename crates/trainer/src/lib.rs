pub mod dataset;
pub mod error;
pub mod schedule;
pub mod tally;
pub mod train;

pub use error::TrainError;
pub use schedule::{Annealing, Decision};
pub use tally::LogProbTally;
pub use train::{TrainOutcome, TrainState, Trainer};

use serde::{Deserialize, Serialize};
use tokenizer::SpecialTokens;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Initial learning rate. Halved by the annealing schedule.
    pub learning_rate: f64,
    /// Lines between held-out evaluations.
    pub epoch_lines: usize,
    /// Factor a held-out log perplexity must beat the previous one by.
    pub improvement_tolerance: f64,
    pub special_tokens: SpecialTokens,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epoch_lines: 4000,
            improvement_tolerance: 1.003,
            special_tokens: SpecialTokens::default(),
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> error::Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epoch_lines == 0 {
            return Err(TrainError::InvalidConfig(
                "epoch_lines must be positive".to_string(),
            ));
        }
        if !(self.improvement_tolerance.is_finite() && self.improvement_tolerance >= 1.0) {
            return Err(TrainError::InvalidConfig(format!(
                "improvement_tolerance must be at least 1, got {}",
                self.improvement_tolerance
            )));
        }
        Ok(())
    }
}
