//! Torch components
pub mod distributions;
pub mod modules;
pub mod optimizers;

pub use distributions::Categorical;
pub use modules::{Activation, Mlp, MlpConfig};
pub use optimizers::{BuildOptimizer, OnceOptimizer, OptimizerConfig, OptimizerType};
