//! Categorical distribution
use tch::{Kind, Tensor};

/// Categorical distribution(s).
///
/// Stored in log space so that zero-probability events have log-probability `-inf`
/// and sampled events always have a finite log-probability.
#[derive(Debug)]
pub struct Categorical {
    /// Normalized log probability of each event.
    ///
    /// An f32 tensor of shape `[BATCH_SHAPE.., NUM_EVENTS]`.
    logits: Tensor,
}

impl Categorical {
    /// Initialze from possibly unnormalized log probabilities.
    ///
    /// The log probabilities are normalized by adding some value `C` to each
    /// such that `sum_i exp(log_prob[i] + C) = 1`.
    pub fn new(logits: &Tensor) -> Self {
        Self {
            logits: logits.log_softmax(-1, Kind::Float),
        }
    }

    /// Number of events in the distribution.
    pub fn num_events(&self) -> i64 {
        self.logits.size().last().copied().unwrap_or(0)
    }

    /// Sample one event index per distribution in the batch.
    ///
    /// Returns an i64 tensor of shape `[BATCH_SHAPE..]`.
    pub fn sample(&self) -> Tensor {
        self.logits.exp().multinomial(1, true).squeeze_dim(-1)
    }

    /// Log probability of the given event indices.
    ///
    /// `elements` is an i64 tensor of shape `[BATCH_SHAPE..]`.
    pub fn log_probs(&self, elements: &Tensor) -> Tensor {
        self.logits
            .gather(-1, &elements.unsqueeze(-1), false)
            .squeeze_dim(-1)
    }

    /// Normalized event probabilities.
    pub fn probs(&self) -> Tensor {
        self.logits.exp()
    }
}
