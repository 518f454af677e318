//! Activation functions.
use clap::ArgEnum;
use serde::{Deserialize, Serialize};
use tch::Tensor;

/// Activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ArgEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// No transformation
    Identity,
    /// Rectified linear
    Relu,
    /// Sigmoid function
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
}

impl Default for Activation {
    #[inline]
    fn default() -> Self {
        Self::Relu
    }
}

impl Activation {
    /// Apply to a tensor
    pub fn forward(&self, tensor: &Tensor) -> Tensor {
        match self {
            Self::Identity => tensor.shallow_clone(),
            Self::Relu => tensor.relu(),
            Self::Sigmoid => tensor.sigmoid(),
            Self::Tanh => tensor.tanh(),
        }
    }

    /// Apply to an owned tensor
    #[inline]
    pub fn forward_owned(&self, tensor: Tensor) -> Tensor {
        match self {
            Self::Identity => tensor,
            _ => self.forward(&tensor),
        }
    }
}
