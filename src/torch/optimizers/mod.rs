//! Optimizers
mod coptimizer;

pub use coptimizer::{AdamConfig, RmsPropConfig, SgdConfig};

use clap::ArgEnum;
use serde::{Deserialize, Serialize};
use tch::{nn::VarStore, COptimizer, TchError, Tensor};
use thiserror::Error;

/// Base optimizer interface
pub trait BaseOptimizer {
    /// Zero out the gradients of all optimized tensors
    fn zero_grad(&mut self) -> Result<(), TchError>;
}

/// Optimizer that minimizes a loss tensor using a single gradient evaluation per step.
pub trait OnceOptimizer: BaseOptimizer {
    /// Perform a loss minimization step (parameter update).
    ///
    /// Uses the existing gradients stored with the parameter tensors.
    fn step_once(&mut self) -> Result<(), OptimizerStepError>;

    /// Back-propagate the loss, take an optimization step, then clear the gradients.
    ///
    /// A NaN loss is reported as an error before any parameter is touched.
    fn backward_step_once(&mut self, loss: &Tensor) -> Result<(), OptimizerStepError> {
        if f64::from(loss).is_nan() {
            return Err(OptimizerStepError::NaNLoss);
        }
        loss.backward();
        self.step_once()?;
        self.zero_grad()?;
        Ok(())
    }
}

/// Error performing an optimization step.
#[derive(Debug, Error)]
pub enum OptimizerStepError {
    #[error("loss is NaN")]
    NaNLoss,
    #[error(transparent)]
    Torch(#[from] TchError),
}

/// Build an optimizer
pub trait BuildOptimizer {
    /// Build an optimizer for the trainable variables in a variable store.
    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError>;
}

/// Optimizer algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ArgEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerType {
    Sgd,
    RmsProp,
    Adam,
}

impl Default for OptimizerType {
    fn default() -> Self {
        Self::Adam
    }
}

impl OptimizerType {
    /// Default configuration of this optimizer with the given learning rate.
    pub fn with_learning_rate(self, learning_rate: f64) -> OptimizerConfig {
        match self {
            Self::Sgd => OptimizerConfig::Sgd(SgdConfig {
                learning_rate,
                ..SgdConfig::default()
            }),
            Self::RmsProp => OptimizerConfig::RmsProp(RmsPropConfig {
                learning_rate,
                ..RmsPropConfig::default()
            }),
            Self::Adam => OptimizerConfig::Adam(AdamConfig {
                learning_rate,
                ..AdamConfig::default()
            }),
        }
    }
}

/// Configuration of any supported optimizer.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerConfig {
    Sgd(SgdConfig),
    RmsProp(RmsPropConfig),
    Adam(AdamConfig),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam(AdamConfig::default())
    }
}

impl BuildOptimizer for OptimizerConfig {
    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError> {
        match self {
            Self::Sgd(config) => config.build_optimizer(vs),
            Self::RmsProp(config) => config.build_optimizer(vs),
            Self::Adam(config) => config.build_optimizer(vs),
        }
    }
}
