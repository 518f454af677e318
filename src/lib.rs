//! An episodic REINFORCE policy-gradient trainer.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::for_kv_map)] // part of warn(clippy::all), specifically style?
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)] // also triggered by macro expansions
pub mod agents;
pub mod cli;
pub mod envs;
mod error;
pub mod logging;
pub mod returns;
pub mod torch;
pub mod trainer;
pub mod utils;
pub mod video;

pub use agents::{CategoricalPolicy, Policy, PolicyOutput, TrajectoryCollector};
pub use envs::{make_env, Environment, Transition};
pub use error::RLError;
pub use returns::ReturnMode;
pub use trainer::{Trainer, TrainerConfig, TrainerState};

/// Pseudo-random number generator type used by environments.
pub type Prng = rand_chacha::ChaCha8Rng;
