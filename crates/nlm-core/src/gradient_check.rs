//! Finite-difference verification of [`Network::update`].

use crate::error::Result;
use crate::network::{Network, ParameterRef};

#[derive(Debug, Clone, Copy)]
pub struct GradientCheck {
    /// Centered finite-difference estimate of dLoss/dParam.
    pub numeric: f64,
    /// Change applied by one update, divided by -learning_rate.
    pub analytic: f64,
}

impl GradientCheck {
    pub fn abs_error(&self) -> f64 {
        (self.numeric - self.analytic).abs()
    }

    pub fn passes(&self, tolerance: f64) -> bool {
        self.abs_error() < tolerance
    }
}

/// Compares the analytic gradient of one weight against a centered difference.
///
/// The weight is restored after probing, but the final update is kept, so the
/// network has taken one training step when this returns.
pub fn gradient_check(
    network: &mut Network,
    context: &[i64],
    target: i64,
    param: ParameterRef,
    epsilon: f64,
    learning_rate: f64,
) -> Result<GradientCheck> {
    let original = network.parameter(param)?;

    network.set_parameter(param, original + epsilon)?;
    let loss_plus = network.loss(context, target)?;
    network.set_parameter(param, original - epsilon)?;
    let loss_minus = network.loss(context, target)?;
    network.set_parameter(param, original)?;

    let numeric = (loss_plus - loss_minus) / (2.0 * epsilon);

    let activations = network.forward(context, target)?;
    network.update(activations, learning_rate)?;
    let analytic = (network.parameter(param)? - original) / -learning_rate;

    Ok(GradientCheck { numeric, analytic })
}
