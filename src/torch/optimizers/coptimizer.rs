//! Torch optimizer wrappers and configuration
use super::{BaseOptimizer, BuildOptimizer, OnceOptimizer, OptimizerStepError};
use std::convert::{TryFrom, TryInto};
use tch::{nn::VarStore, COptimizer, TchError};

impl BaseOptimizer for COptimizer {
    fn zero_grad(&mut self) -> Result<(), TchError> {
        Self::zero_grad(self)
    }
}

impl OnceOptimizer for COptimizer {
    fn step_once(&mut self) -> Result<(), OptimizerStepError> {
        Self::step(self)?;
        Ok(())
    }
}

/// Any config convertible into a bare `COptimizer` builds one over the trainable variables.
fn build_coptimizer<T>(config: &T, vs: &VarStore) -> Result<COptimizer, TchError>
where
    for<'a> &'a T: TryInto<COptimizer, Error = TchError>,
{
    let mut optimizer: COptimizer = config.try_into()?;
    for tensor in vs.trainable_variables() {
        optimizer.add_parameters(&tensor, 0)?;
    }
    Ok(optimizer)
}

/// Configuration for the SGD optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SgdConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Momentum
    pub momentum: f64,
    /// Weight decay (L2 penalty)
    pub weight_decay: f64,
    /// Dampening for momentum
    pub dampening: f64,
    /// Enables Nesterov momentum
    pub nesterov: bool,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            momentum: 0.0,
            weight_decay: 0.0,
            dampening: 0.0,
            nesterov: false,
        }
    }
}

impl TryFrom<&SgdConfig> for COptimizer {
    type Error = TchError;
    fn try_from(config: &SgdConfig) -> Result<Self, Self::Error> {
        Self::sgd(
            config.learning_rate,
            config.momentum,
            config.dampening,
            config.weight_decay,
            config.nesterov,
        )
    }
}

impl BuildOptimizer for SgdConfig {
    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError> {
        build_coptimizer(self, vs)
    }
}

#[allow(clippy::doc_markdown)] // false positive on RMSProp
/// Configuration for the RMSProp optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RmsPropConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Momentum
    pub momentum: f64,
    /// Smoothing factor
    pub alpha: f64,
    /// A term added to the denominator to improve numerical stability
    pub eps: f64,
    /// If true, normalize the gradient by the estimated variance.
    pub centered: bool,
    /// Weight decay (L2 penalty)
    pub weight_decay: f64,
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            momentum: 0.0,
            alpha: 0.99,
            eps: 1e-8,
            centered: false,
            weight_decay: 0.0,
        }
    }
}

impl TryFrom<&RmsPropConfig> for COptimizer {
    type Error = TchError;
    fn try_from(config: &RmsPropConfig) -> Result<Self, Self::Error> {
        Self::rms_prop(
            config.learning_rate,
            config.alpha,
            config.eps,
            config.weight_decay,
            config.momentum,
            config.centered,
        )
    }
}

impl BuildOptimizer for RmsPropConfig {
    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError> {
        build_coptimizer(self, vs)
    }
}

/// Configuration for the Adam optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct AdamConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Coefficient for the running average of the gradient
    pub beta1: f64,
    /// Coefficient for the running average of the square of the gradient
    pub beta2: f64,
    /// Weight decay (L2 penalty)
    pub weight_decay: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            weight_decay: 0.0,
        }
    }
}

impl TryFrom<&AdamConfig> for COptimizer {
    type Error = TchError;
    fn try_from(config: &AdamConfig) -> Result<Self, Self::Error> {
        Self::adam(
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.weight_decay,
        )
    }
}

impl BuildOptimizer for AdamConfig {
    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError> {
        build_coptimizer(self, vs)
    }
}
