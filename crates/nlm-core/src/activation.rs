use serde::{Deserialize, Serialize};
use tch::Tensor;

/// Hidden-layer nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Tanh,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, x: &Tensor) -> Tensor {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => x.sigmoid(),
        }
    }

    /// Derivative expressed through the activation's output `y = f(x)`.
    pub fn derivative(&self, y: &Tensor) -> Tensor {
        match self {
            Activation::Tanh => (y * y).neg() + 1.0,
            Activation::Sigmoid => y * (y.neg() + 1.0),
        }
    }
}
