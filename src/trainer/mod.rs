//! REINFORCE training loop
mod config;
mod history;

pub use config::{ConfigError, TrainerConfig};
pub use history::RewardHistory;

use crate::agents::{CategoricalPolicy, RolloutError, SerializedRollout, TrajectoryCollector};
use crate::envs::{make_env, Environment};
use crate::logging::StatsLogger;
use crate::returns::ReturnMode;
use crate::torch::{BuildOptimizer, OnceOptimizer};
use crate::video::{record_episode, PngSequenceWriter};
use crate::RLError;
use std::fmt;
use tch::{COptimizer, Kind, Tensor};

/// Stage of a [`Trainer`] within the current rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainerState {
    /// Ready to collect the next rollout.
    Idle,
    /// Episodes have been collected for the current rollout.
    RolloutInProgress,
    /// The loss of the current rollout has been computed.
    LossEstimated,
    /// The policy has been updated from the current rollout.
    ParametersUpdated,
    /// Training is complete and outputs have been written.
    Done,
}

/// Statistics of one completed rollout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutSummary {
    /// Index of the rollout, starting from 0.
    pub index: usize,
    /// Total reward of all episodes divided by the number of episodes.
    pub average_reward: f64,
    /// Policy-gradient loss before the update.
    pub loss: f64,
    /// Number of environment steps in the rollout.
    pub num_steps: usize,
}

impl fmt::Display for RolloutSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "End of rollout {}: Average trajectory reward is {:.2}",
            self.index, self.average_reward
        )
    }
}

/// Episodic REINFORCE policy-gradient trainer.
///
/// Each rollout moves through
/// `Idle -> RolloutInProgress -> LossEstimated -> ParametersUpdated -> Idle`.
/// After the last rollout, [`Trainer::finish`] saves the reward history and moves to `Done`.
pub struct Trainer {
    config: TrainerConfig,
    env: Box<dyn Environment>,
    policy: CategoricalPolicy,
    optimizer: COptimizer,
    collector: TrajectoryCollector,
    return_mode: ReturnMode,
    history: RewardHistory,
    state: TrainerState,
}

impl Trainer {
    /// Create a trainer for the environment named in the configuration.
    pub fn new(config: TrainerConfig) -> Result<Self, RLError> {
        config.validate()?;
        let env = make_env(&config.env_name)?;
        Self::with_env(config, env)
    }

    /// Create a trainer for a given environment, ignoring `config.env_name` except for naming
    /// the video directory.
    pub fn with_env(config: TrainerConfig, env: Box<dyn Environment>) -> Result<Self, RLError> {
        config.validate()?;
        let return_mode = config.return_mode()?;
        if let Some(seed) = config.rng_seed {
            #[allow(clippy::cast_possible_wrap)]
            let seed = seed as i64;
            tch::manual_seed(seed);
        }
        let policy = CategoricalPolicy::new(
            env.observation_dim(),
            env.num_actions(),
            &config.mlp_config(),
            config.device(),
        );
        let optimizer = config.optimizer_config().build_optimizer(policy.var_store())?;
        let collector = TrajectoryCollector::new(config.n_trajectory_per_rollout, config.rng_seed);
        Ok(Self {
            config,
            env,
            policy,
            optimizer,
            collector,
            return_mode,
            history: RewardHistory::new(),
            state: TrainerState::Idle,
        })
    }

    pub const fn state(&self) -> TrainerState {
        self.state
    }

    pub const fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub const fn policy(&self) -> &CategoricalPolicy {
        &self.policy
    }

    pub const fn return_mode(&self) -> ReturnMode {
        self.return_mode
    }

    /// Average reward of each completed rollout.
    pub const fn reward_history(&self) -> &RewardHistory {
        &self.history
    }

    /// Check that `operation` may run in the current state.
    ///
    /// The state only advances once the operation succeeds, so a failed step can be retried.
    fn expect_state(&self, operation: &'static str, expected: TrainerState) -> Result<(), RLError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RLError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// Collect `n_trajectory_per_rollout` episodes with the current policy.
    pub fn collect_rollout<L>(&mut self, logger: &mut L) -> Result<SerializedRollout, RLError>
    where
        L: StatsLogger + ?Sized,
    {
        self.expect_state("collect a rollout", TrainerState::Idle)?;
        let rollout = self
            .collector
            .collect(self.env.as_mut(), &self.policy, logger)?
            .into_serialized();
        rollout.validate()?;
        self.state = TrainerState::RolloutInProgress;
        Ok(rollout)
    }

    /// Policy-gradient loss of the collected rollout under the configured return mode.
    pub fn estimate_loss(&mut self, rollout: &SerializedRollout) -> Result<Tensor, RLError> {
        self.expect_state("estimate the loss", TrainerState::RolloutInProgress)?;
        let loss = policy_gradient_loss(rollout, self.return_mode)?;
        self.state = TrainerState::LossEstimated;
        Ok(loss)
    }

    /// Back-propagate the loss, step the optimizer and clear the gradients.
    pub fn update_policy(&mut self, loss: &Tensor) -> Result<(), RLError> {
        self.expect_state("update the policy", TrainerState::LossEstimated)?;
        self.optimizer.backward_step_once(loss)?;
        self.state = TrainerState::ParametersUpdated;
        Ok(())
    }

    /// Run one full rollout: collect, estimate the loss, update and record the average reward.
    pub fn train_rollout<L>(&mut self, logger: &mut L) -> Result<RolloutSummary, RLError>
    where
        L: StatsLogger + ?Sized,
    {
        let rollout = self.collect_rollout(logger)?;
        let average_reward = rollout
            .average_return()
            .ok_or(RolloutError::EmptyRollout)?;
        let num_steps = rollout.rewards.iter().map(Vec::len).sum();

        let loss = self.estimate_loss(&rollout)?;
        let loss_value = f64::from(&loss);
        self.update_policy(&loss)?;

        let summary = RolloutSummary {
            index: self.history.len(),
            average_reward,
            loss: loss_value,
            num_steps,
        };
        self.expect_state("complete the rollout", TrainerState::ParametersUpdated)?;
        self.history.push(average_reward);
        self.state = TrainerState::Idle;

        logger.group_start();
        logger.group_log("average_reward", average_reward.into())?;
        logger.group_log("loss", loss_value.into())?;
        logger.group_log("return_mode", self.return_mode.name().into())?;
        logger.group_end();
        logger.log_counter_increment("rollout_steps", num_steps as u64)?;
        logger.flush();
        Ok(summary)
    }

    /// Save the reward history, record a video if enabled and release the environment.
    pub fn finish<L>(&mut self, logger: &mut L) -> Result<(), RLError>
    where
        L: StatsLogger + ?Sized,
    {
        self.expect_state("finish", TrainerState::Idle)?;
        std::fs::create_dir_all(&self.config.output_dir)?;
        self.history.save(self.config.history_path())?;

        if self.config.video {
            let mut writer =
                PngSequenceWriter::new(self.config.video_path(), self.env.render_fps());
            let num_frames = record_episode(
                self.env.as_mut(),
                &self.policy,
                self.config.max_video_frames,
                &mut writer,
            )?;
            #[allow(clippy::cast_precision_loss)]
            let num_frames = num_frames as f64;
            logger.log_scalar("video_frames", num_frames)?;
            logger.flush();
        }

        self.env.close();
        self.state = TrainerState::Done;
        Ok(())
    }

    /// Train for `n_rollout` rollouts then [`finish`](Self::finish).
    ///
    /// `on_rollout` is called with the summary of each completed rollout.
    pub fn run<L, F>(&mut self, logger: &mut L, mut on_rollout: F) -> Result<&RewardHistory, RLError>
    where
        L: StatsLogger + ?Sized,
        F: FnMut(&RolloutSummary),
    {
        for _ in 0..self.config.n_rollout {
            let summary = self.train_rollout(logger)?;
            on_rollout(&summary);
        }
        self.finish(logger)?;
        Ok(&self.history)
    }
}

/// REINFORCE loss of a rollout.
///
/// For each episode `i`, the loss is `-sum_t log_probs[i][t] * g[t]` where `g` is the reward
/// sequence of episode `i` shaped by `return_mode`. The result is the mean over episodes.
pub fn policy_gradient_loss(
    rollout: &SerializedRollout,
    return_mode: ReturnMode,
) -> Result<Tensor, RLError> {
    rollout.validate()?;
    let episode_losses = rollout
        .log_probs
        .iter()
        .zip(&rollout.rewards)
        .map(|(log_probs, rewards)| {
            let signal = Tensor::f_of_slice(&return_mode.shape(rewards))?
                .f_to_kind(log_probs.kind())?
                .f_to_device(log_probs.device())?;
            Ok(-(log_probs * signal).sum(Kind::Float))
        })
        .collect::<Result<Vec<_>, RLError>>()?;
    Ok(Tensor::stack(&episode_losses, 0).mean(Kind::Float))
}
