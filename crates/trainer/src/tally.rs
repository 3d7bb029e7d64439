use crate::error::{Result, TrainError};

/// Running sum of log10 probabilities and the number of tokens scored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogProbTally {
    log_sum: f64,
    tokens: usize,
}

impl LogProbTally {
    pub fn add(&mut self, log10_prob: f64) {
        self.log_sum += log10_prob;
        self.tokens += 1;
    }

    pub fn log_sum(&self) -> f64 {
        self.log_sum
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Mean log10 probability per token.
    pub fn average(&self) -> Result<f64> {
        if self.tokens == 0 {
            return Err(TrainError::EmptyInput);
        }
        Ok(self.log_sum / self.tokens as f64)
    }

    /// `10 ^ (-average)`
    pub fn perplexity(&self) -> Result<f64> {
        let average = self.average()?;
        let perplexity = 10f64.powf(-average);
        if !perplexity.is_finite() {
            return Err(TrainError::NonFinite(average));
        }
        Ok(perplexity)
    }
}
