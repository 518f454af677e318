//! Error type
use crate::agents::{PolicyError, RolloutError};
use crate::envs::{BuildEnvError, EnvError};
use crate::logging::LogError;
use crate::torch::optimizers::OptimizerStepError;
use crate::trainer::{ConfigError, TrainerState};
use crate::video::VideoError;
use tch::TchError;
use thiserror::Error;

/// Error from a training run.
#[derive(Error, Debug)]
pub enum RLError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("error building environment")]
    BuildEnv(#[from] BuildEnvError),
    #[error("environment error")]
    Env(#[from] EnvError),
    #[error("policy error")]
    Policy(#[from] PolicyError),
    #[error("malformed rollout")]
    Rollout(#[from] RolloutError),
    #[error("optimizer step failed")]
    OptimizerStep(#[from] OptimizerStepError),
    #[error("logging error")]
    Log(#[from] LogError),
    #[error("failed to record video")]
    Video(#[from] VideoError),
    #[error("cannot {operation} in the {state:?} state")]
    InvalidTransition {
        operation: &'static str,
        state: TrainerState,
    },
    #[error(transparent)]
    Torch(#[from] TchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
