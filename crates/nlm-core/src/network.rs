use log::debug;
use std::fmt;
use tch::{Device, IndexOp, Kind, Tensor};

use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::init::IrwinHallInit;

/// Everything the backward pass needs from one forward pass.
///
/// Produced by [`Network::forward`] and consumed by [`Network::update`], so an
/// update can only ever use the context and target it was evaluated on.
pub struct Activations {
    target: i64,
    ids: Tensor,
    /// Gathered embeddings, one row per context position: [N-1, M]
    inputs: Tensor,
    /// [H]
    hidden: Tensor,
    /// Softmax distribution over the vocabulary: [V]
    output: Tensor,
    ln_prob: f64,
}

impl Activations {
    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn hidden(&self) -> &Tensor {
        &self.hidden
    }

    pub fn output(&self) -> &Tensor {
        &self.output
    }

    /// Base-10 log probability of the target.
    pub fn log10_prob(&self) -> f64 {
        self.ln_prob / std::f64::consts::LN_10
    }

    /// Natural-log negative log-likelihood of the target.
    pub fn loss(&self) -> f64 {
        -self.ln_prob
    }
}

/// Addresses one scalar weight inside the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRef {
    Embedding { id: i64, dim: i64 },
    Projection { position: usize, row: i64, col: i64 },
    Output { row: i64, col: i64 },
}

impl fmt::Display for ParameterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterRef::Embedding { id, dim } => write!(f, "E[{}][{}]", id, dim),
            ParameterRef::Projection { position, row, col } => {
                write!(f, "W{}[{}][{}]", position, row, col)
            }
            ParameterRef::Output { row, col } => write!(f, "Wout[{}][{}]", row, col),
        }
    }
}

/// Feed-forward n-gram language model.
///
/// The previous N-1 token embeddings are each projected by their own H x M
/// matrix, summed, squashed, and mapped to a softmax over the vocabulary.
pub struct Network {
    config: NetworkConfig,
    /// [V, M], row `i` is the representation of token id `i`.
    embeddings: Tensor,
    /// N-1 matrices of shape [H, M], one per context position.
    projections: Vec<Tensor>,
    /// [V, H]
    output_weights: Tensor,
}

impl Network {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        config.validate()?;

        let mut init = IrwinHallInit::new(config.seed, config.init_range);
        let embeddings = init.matrix(config.vocab_size, config.embedding_size);
        let projections = (0..config.context_width())
            .map(|_| init.matrix(config.hidden_size, config.embedding_size))
            .collect();
        let output_weights = init.matrix(config.vocab_size, config.hidden_size);

        debug!(
            "Initialised network: V={} N={} M={} H={} activation={:?} seed={}",
            config.vocab_size,
            config.context_size,
            config.embedding_size,
            config.hidden_size,
            config.activation,
            config.seed
        );

        Ok(Self {
            config: config.clone(),
            embeddings,
            projections,
            output_weights,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn vocab_size(&self) -> i64 {
        self.config.vocab_size
    }

    pub fn context_width(&self) -> usize {
        self.projections.len()
    }

    fn check_id(&self, id: i64) -> Result<()> {
        if id < 0 || id >= self.config.vocab_size {
            return Err(NetworkError::IdOutOfRange {
                id,
                vocab_size: self.config.vocab_size,
            });
        }
        Ok(())
    }

    fn check_example(&self, context: &[i64], target: i64) -> Result<()> {
        if context.len() != self.context_width() {
            return Err(NetworkError::ContextLength {
                expected: self.context_width(),
                actual: context.len(),
            });
        }
        for &id in context {
            self.check_id(id)?;
        }
        self.check_id(target)
    }

    /// Runs the network on one example without touching any weight.
    pub fn forward(&self, context: &[i64], target: i64) -> Result<Activations> {
        self.check_example(context, target)?;
        let _guard = tch::no_grad_guard();

        let ids = Tensor::from_slice(context);
        let inputs = self.embeddings.index_select(0, &ids);

        let mut pre_activation = Tensor::zeros(
            &[self.config.hidden_size],
            (Kind::Double, Device::Cpu),
        );
        for (position, projection) in self.projections.iter().enumerate() {
            pre_activation = pre_activation + projection.matmul(&inputs.get(position as i64));
        }
        let hidden = self.config.activation.apply(&pre_activation);

        // Shift by the max score so exp() cannot overflow.
        let scores = self.output_weights.matmul(&hidden);
        let shifted = &scores - scores.max();
        let exp = shifted.exp();
        let norm = exp.sum(Kind::Double);
        let ln_norm = norm.log().double_value(&[]);
        let output = exp / norm;

        let ln_prob = shifted.double_value(&[target]) - ln_norm;
        if !ln_prob.is_finite() {
            return Err(NetworkError::NonFinite {
                value: ln_prob,
                target,
            });
        }

        Ok(Activations {
            target,
            ids,
            inputs,
            hidden,
            output,
            ln_prob,
        })
    }

    /// Base-10 log probability of `target` following `context`. Always <= 0.
    pub fn evaluate(&self, context: &[i64], target: i64) -> Result<f64> {
        Ok(self.forward(context, target)?.log10_prob())
    }

    /// Natural-log cross-entropy loss of `target` following `context`.
    pub fn loss(&self, context: &[i64], target: i64) -> Result<f64> {
        Ok(self.forward(context, target)?.loss())
    }

    /// One step of gradient descent on the negative log-likelihood of the
    /// example that produced `activations`.
    ///
    /// Every gradient is taken from the weights as they were during the
    /// forward pass; only then are the weights changed. Embedding rows outside
    /// the context are left alone.
    pub fn update(&mut self, activations: Activations, learning_rate: f64) -> Result<()> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NetworkError::InvalidLearningRate(learning_rate));
        }
        let _guard = tch::no_grad_guard();

        let Activations {
            target,
            ids,
            inputs,
            hidden,
            output,
            ..
        } = activations;

        // Softmax + cross-entropy: p - onehot(target)
        let grad_scores = output;
        let p_target = grad_scores.double_value(&[target]);
        let _ = grad_scores.i(target).fill_(p_target - 1.0);

        let grad_hidden = grad_scores.matmul(&self.output_weights)
            * self.config.activation.derivative(&hidden);
        let grad_inputs: Vec<Tensor> = self
            .projections
            .iter()
            .map(|projection| grad_hidden.matmul(projection))
            .collect();

        let _ = self
            .output_weights
            .g_sub_(&(outer(&grad_scores, &hidden) * learning_rate));
        for (position, projection) in self.projections.iter_mut().enumerate() {
            let grad = outer(&grad_hidden, &inputs.get(position as i64));
            let _ = projection.g_sub_(&(grad * learning_rate));
        }
        // Repeated ids in the context accumulate into the same row.
        let embedding_step = Tensor::stack(&grad_inputs, 0) * (-learning_rate);
        let _ = self.embeddings.index_add_(0, &ids, &embedding_step);

        Ok(())
    }

    /// Forward pass followed by an update; returns the pre-update log10 probability.
    pub fn train_step(&mut self, context: &[i64], target: i64, learning_rate: f64) -> Result<f64> {
        let activations = self.forward(context, target)?;
        let log10_prob = activations.log10_prob();
        self.update(activations, learning_rate)?;
        Ok(log10_prob)
    }

    fn locate(&self, param: ParameterRef) -> Result<(&Tensor, i64, i64)> {
        let (tensor, row, col) = match param {
            ParameterRef::Embedding { id, dim } => (&self.embeddings, id, dim),
            ParameterRef::Projection { position, row, col } => match self.projections.get(position)
            {
                Some(projection) => (projection, row, col),
                None => return Err(NetworkError::ParameterOutOfRange(param.to_string())),
            },
            ParameterRef::Output { row, col } => (&self.output_weights, row, col),
        };
        let size = tensor.size();
        if row < 0 || col < 0 || row >= size[0] || col >= size[1] {
            return Err(NetworkError::ParameterOutOfRange(param.to_string()));
        }
        Ok((tensor, row, col))
    }

    pub fn parameter(&self, param: ParameterRef) -> Result<f64> {
        let (tensor, row, col) = self.locate(param)?;
        Ok(tensor.double_value(&[row, col]))
    }

    pub fn set_parameter(&mut self, param: ParameterRef, value: f64) -> Result<()> {
        let (tensor, row, col) = self.locate(param)?;
        let _ = tensor.i((row, col)).fill_(value);
        Ok(())
    }
}

/// `column ⊗ row` as a [len(column), len(row)] matrix.
fn outer(column: &Tensor, row: &Tensor) -> Tensor {
    column.unsqueeze(1).matmul(&row.unsqueeze(0))
}
