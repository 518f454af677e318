use crate::returns::ReturnMode;
use crate::torch::{Activation, MlpConfig, OptimizerConfig, OptimizerType};
use crate::video::video_dir;
use crate::RLError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tch::Device;
use thiserror::Error;

/// Configuration of a training run.
///
/// Missing keys in a configuration file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Environment id passed to [`make_env`](crate::envs::make_env).
    pub env_name: String,
    /// Width of the policy hidden layer.
    pub hidden_dim: usize,
    /// Optimizer learning rate.
    pub lr: f64,
    pub optimizer: OptimizerType,
    /// Hidden layer nonlinearity.
    pub activation: Activation,
    /// Number of training iterations.
    pub n_rollout: usize,
    /// Number of episodes collected per iteration.
    pub n_trajectory_per_rollout: usize,
    /// Weight each step by the rewards from that step onward.
    pub reward_to_go: bool,
    /// Weight each step by the discounted rewards from that step onward.
    pub reward_discount: bool,
    /// Discount factor used when `reward_discount` is set.
    pub discount_factor: f64,
    /// Seed for environment resets and policy sampling.
    pub rng_seed: Option<u64>,
    /// Base name of the saved reward history.
    pub exp_name: String,
    /// Record an episode of the trained policy.
    pub video: bool,
    /// Maximum number of steps in the recorded episode.
    pub max_video_frames: usize,
    /// Place the policy on a CUDA device if one is available.
    pub cuda: bool,
    /// Directory for run outputs.
    pub output_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            env_name: "CartPole-v1".into(),
            hidden_dim: 128,
            lr: 3e-3,
            optimizer: OptimizerType::Adam,
            activation: Activation::Relu,
            n_rollout: 100,
            n_trajectory_per_rollout: 60,
            reward_to_go: false,
            reward_discount: false,
            discount_factor: 0.99,
            rng_seed: Some(1),
            exp_name: "reinforce".into(),
            video: true,
            max_video_frames: 1000,
            cuda: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl TrainerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RLError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check that the configuration describes a runnable experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.return_mode()?;
        if self.n_trajectory_per_rollout == 0 {
            return Err(ConfigError::NoTrajectories);
        }
        if self.hidden_dim == 0 {
            return Err(ConfigError::ZeroHiddenDim);
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.lr));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(ConfigError::InvalidDiscountFactor(self.discount_factor));
        }
        Ok(())
    }

    /// The selected reward shaping mode. Raw if neither shaping flag is set.
    pub fn return_mode(&self) -> Result<ReturnMode, ConfigError> {
        match (self.reward_to_go, self.reward_discount) {
            (true, true) => Err(ConfigError::ConflictingReturnModes),
            (true, false) => Ok(ReturnMode::RewardToGo),
            (false, true) => Ok(ReturnMode::Discounted {
                discount_factor: self.discount_factor,
            }),
            (false, false) => Ok(ReturnMode::Raw),
        }
    }

    /// Policy network: one hidden layer producing action logits.
    pub fn mlp_config(&self) -> MlpConfig {
        MlpConfig {
            hidden_sizes: vec![self.hidden_dim],
            activation: self.activation,
            ..MlpConfig::default()
        }
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        self.optimizer.with_learning_rate(self.lr)
    }

    pub fn device(&self) -> Device {
        if self.cuda {
            Device::cuda_if_available()
        } else {
            Device::Cpu
        }
    }

    /// Path of the saved reward history: `<output_dir>/<exp_name>.json`.
    pub fn history_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.exp_name))
    }

    /// Directory for the recorded video.
    pub fn video_path(&self) -> PathBuf {
        self.output_dir.join(video_dir(&self.env_name))
    }
}

/// Invalid [`TrainerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("reward_to_go and reward_discount are mutually exclusive")]
    ConflictingReturnModes,
    #[error("n_trajectory_per_rollout must be at least 1")]
    NoTrajectories,
    #[error("hidden_dim must be at least 1")]
    ZeroHiddenDim,
    #[error("learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),
    #[error("discount factor must be in [0, 1], got {0}")]
    InvalidDiscountFactor(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_valid() {
        let config = TrainerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.return_mode(), Ok(ReturnMode::Raw));
    }

    #[rstest]
    #[case(false, false, ReturnMode::Raw)]
    #[case(true, false, ReturnMode::RewardToGo)]
    #[case(false, true, ReturnMode::Discounted { discount_factor: 0.99 })]
    fn return_modes(
        #[case] reward_to_go: bool,
        #[case] reward_discount: bool,
        #[case] expected: ReturnMode,
    ) {
        let config = TrainerConfig {
            reward_to_go,
            reward_discount,
            ..TrainerConfig::default()
        };
        assert_eq!(config.return_mode(), Ok(expected));
    }

    #[test]
    fn conflicting_flags_rejected() {
        let config = TrainerConfig {
            reward_to_go: true,
            reward_discount: true,
            ..TrainerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ConflictingReturnModes));
    }

    #[rstest]
    #[case::no_trajectories(TrainerConfig { n_trajectory_per_rollout: 0, ..TrainerConfig::default() }, ConfigError::NoTrajectories)]
    #[case::zero_hidden(TrainerConfig { hidden_dim: 0, ..TrainerConfig::default() }, ConfigError::ZeroHiddenDim)]
    #[case::negative_lr(TrainerConfig { lr: -1.0, ..TrainerConfig::default() }, ConfigError::InvalidLearningRate(-1.0))]
    #[case::large_gamma(TrainerConfig { discount_factor: 1.5, ..TrainerConfig::default() }, ConfigError::InvalidDiscountFactor(1.5))]
    fn invalid(#[case] config: TrainerConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn nan_lr_rejected() {
        let config = TrainerConfig {
            lr: f64::NAN,
            ..TrainerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: TrainerConfig =
            serde_json::from_str(r#"{"env_name": "CartPole-v0", "reward_to_go": true, "optimizer": "sgd"}"#)
                .unwrap();
        assert_eq!(config.env_name, "CartPole-v0");
        assert!(config.reward_to_go);
        assert_eq!(config.optimizer, OptimizerType::Sgd);
        assert_eq!(config.hidden_dim, 128);
        assert_eq!(config.n_trajectory_per_rollout, 60);
    }

    #[test]
    fn output_paths() {
        let config = TrainerConfig {
            output_dir: PathBuf::from("out"),
            exp_name: "run".into(),
            ..TrainerConfig::default()
        };
        assert_eq!(config.history_path(), PathBuf::from("out/run.json"));
        assert_eq!(config.video_path(), PathBuf::from("out/CartPole"));
    }
}
