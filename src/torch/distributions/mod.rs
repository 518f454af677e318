//! Probability distributions
mod categorical;

pub use categorical::Categorical;
