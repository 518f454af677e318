//! Command-line options
use super::{Update, WithUpdate};
use crate::torch::{Activation, OptimizerType};
use crate::trainer::TrainerConfig;
use crate::RLError;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(version, about)]
pub struct Options {
    #[clap(long)]
    /// JSON configuration file. Other options override its values.
    pub config: Option<PathBuf>,

    // Environment options
    #[clap(long)]
    /// Environment id (CartPole-v0, CartPole-v1, DeterministicBandit-v0)
    pub env_name: Option<String>,

    // Policy options
    #[clap(long)]
    /// Width of the policy hidden layer
    pub hidden_dim: Option<usize>,

    #[clap(long, arg_enum)]
    /// Hidden layer nonlinearity
    pub activation: Option<Activation>,

    #[clap(long, arg_enum)]
    /// Optimizer type
    pub optimizer: Option<OptimizerType>,

    #[clap(long)]
    /// Optimizer learning rate
    pub lr: Option<f64>,

    // Training options
    #[clap(long)]
    /// Number of training iterations
    pub n_rollout: Option<usize>,

    #[clap(long)]
    /// Number of episodes collected per iteration
    pub n_trajectory_per_rollout: Option<usize>,

    #[clap(long)]
    /// Weight each step by the rewards that follow it
    pub reward_to_go: bool,

    #[clap(long)]
    /// Weight each step by the discounted rewards that follow it
    pub reward_discount: bool,

    #[clap(long)]
    /// Discount factor for --reward-discount
    pub discount_factor: Option<f64>,

    #[clap(long)]
    /// Random seed
    pub rng_seed: Option<u64>,

    #[clap(long)]
    /// Train on a CUDA device if available
    pub cuda: bool,

    // Output options
    #[clap(long)]
    /// Experiment name; the reward history is saved to <EXP_NAME>.json
    pub exp_name: Option<String>,

    #[clap(long)]
    /// Directory for the reward history and video
    pub output_dir: Option<PathBuf>,

    #[clap(long)]
    /// Do not record a video of the trained policy
    pub no_video: bool,

    #[clap(long)]
    /// Maximum number of steps in the recorded video
    pub max_video_frames: Option<usize>,

    #[clap(long)]
    /// Log statistics to TensorBoard under runs/<timestamp>
    pub tensorboard: bool,

    #[clap(long)]
    /// Log statistics to TensorBoard in this directory
    pub tensorboard_dir: Option<PathBuf>,
}

impl Options {
    /// Training configuration: the `--config` file (or defaults) overridden by other options.
    pub fn trainer_config(&self) -> Result<TrainerConfig, RLError> {
        let base = match &self.config {
            Some(path) => TrainerConfig::from_json_file(path)?,
            None => TrainerConfig::default(),
        };
        Ok(base.with_update(self))
    }

    /// TensorBoard log directory, if TensorBoard logging is enabled.
    pub fn tensorboard_dir(&self) -> Option<PathBuf> {
        match (&self.tensorboard_dir, self.tensorboard) {
            (Some(dir), _) => Some(dir.clone()),
            (None, true) => Some(
                ["runs", &chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string()]
                    .iter()
                    .collect(),
            ),
            (None, false) => None,
        }
    }
}

impl Update<&Options> for TrainerConfig {
    fn update(&mut self, opts: &Options) {
        if let Some(env_name) = &opts.env_name {
            self.env_name = env_name.clone();
        }
        if let Some(hidden_dim) = opts.hidden_dim {
            self.hidden_dim = hidden_dim;
        }
        if let Some(activation) = opts.activation {
            self.activation = activation;
        }
        if let Some(optimizer) = opts.optimizer {
            self.optimizer = optimizer;
        }
        if let Some(lr) = opts.lr {
            self.lr = lr;
        }
        if let Some(n_rollout) = opts.n_rollout {
            self.n_rollout = n_rollout;
        }
        if let Some(n_trajectory_per_rollout) = opts.n_trajectory_per_rollout {
            self.n_trajectory_per_rollout = n_trajectory_per_rollout;
        }
        if opts.reward_to_go {
            self.reward_to_go = true;
        }
        if opts.reward_discount {
            self.reward_discount = true;
        }
        if let Some(discount_factor) = opts.discount_factor {
            self.discount_factor = discount_factor;
        }
        if opts.rng_seed.is_some() {
            self.rng_seed = opts.rng_seed;
        }
        if opts.cuda {
            self.cuda = true;
        }
        if let Some(exp_name) = &opts.exp_name {
            self.exp_name = exp_name.clone();
        }
        if let Some(output_dir) = &opts.output_dir {
            self.output_dir = output_dir.clone();
        }
        if opts.no_video {
            self.video = false;
        }
        if let Some(max_video_frames) = opts.max_video_frames {
            self.max_video_frames = max_video_frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::ReturnMode;
    use std::fs;

    #[test]
    fn defaults_without_options() {
        let opts = Options::try_parse_from(["reinforce"]).unwrap();
        assert_eq!(opts.trainer_config().unwrap(), TrainerConfig::default());
        assert_eq!(opts.tensorboard_dir(), None);
    }

    #[test]
    fn overrides() {
        let opts = Options::try_parse_from([
            "reinforce",
            "--env-name",
            "CartPole-v0",
            "--lr",
            "0.01",
            "--optimizer",
            "rms-prop",
            "--activation",
            "tanh",
            "--reward-discount",
            "--discount-factor",
            "0.9",
            "--no-video",
        ])
        .unwrap();
        let config = opts.trainer_config().unwrap();
        assert_eq!(config.env_name, "CartPole-v0");
        assert_eq!(config.lr, 0.01);
        assert_eq!(config.optimizer, OptimizerType::RmsProp);
        assert_eq!(config.activation, Activation::Tanh);
        assert!(!config.video);
        assert_eq!(
            config.return_mode(),
            Ok(ReturnMode::Discounted {
                discount_factor: 0.9
            })
        );
    }

    #[test]
    fn options_override_config_file() {
        let dir = std::env::temp_dir().join("reinforce-cli-config");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(
            &path,
            r#"{"n_rollout": 5, "n_trajectory_per_rollout": 7, "exp_name": "from-file"}"#,
        )
        .unwrap();

        let path_arg = path.to_str().unwrap();
        let opts =
            Options::try_parse_from(["reinforce", "--config", path_arg, "--n-rollout", "9"])
                .unwrap();
        let config = opts.trainer_config().unwrap();
        assert_eq!(config.n_rollout, 9);
        assert_eq!(config.n_trajectory_per_rollout, 7);
        assert_eq!(config.exp_name, "from-file");
    }

    #[test]
    fn missing_config_file() {
        let opts = Options::try_parse_from([
            "reinforce",
            "--config",
            "/nonexistent/reinforce/config.json",
        ])
        .unwrap();
        assert!(matches!(opts.trainer_config(), Err(RLError::Io(_))));
    }

    #[test]
    fn tensorboard_dir() {
        let opts = Options::try_parse_from(["reinforce", "--tensorboard-dir", "logs"]).unwrap();
        assert_eq!(opts.tensorboard_dir(), Some(PathBuf::from("logs")));

        let opts = Options::try_parse_from(["reinforce", "--tensorboard"]).unwrap();
        assert!(opts.tensorboard_dir().unwrap().starts_with("runs"));
    }

    #[test]
    fn invalid_activation() {
        assert!(Options::try_parse_from(["reinforce", "--activation", "softmax"]).is_err());
    }
}
