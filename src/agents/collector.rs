use super::{Episode, EpisodeStep, Policy, PolicyOutput, Rollout};
use crate::envs::Environment;
use crate::logging::StatsLogger;
use crate::RLError;

/// Collects complete episodes by running a fixed policy in an environment.
///
/// Episodes run until the environment signals termination or truncation;
/// there is no step cap here beyond what the environment imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryCollector {
    /// Number of episodes per rollout.
    pub num_episodes: usize,
    /// Seed for the environment reset at the start of each rollout.
    pub seed: Option<u64>,
}

impl TrajectoryCollector {
    pub const fn new(num_episodes: usize, seed: Option<u64>) -> Self {
        Self { num_episodes, seed }
    }

    /// Run `num_episodes` episodes of `policy` in `env`.
    ///
    /// The first episode starts from a reset with `seed`, later episodes from unseeded resets.
    /// Logs the length and total reward of each episode along with every action taken.
    pub fn collect<E, P, L>(&self, env: &mut E, policy: &P, logger: &mut L) -> Result<Rollout, RLError>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
        L: StatsLogger + ?Sized,
    {
        let num_actions = env.num_actions();
        let mut episodes = Vec::with_capacity(self.num_episodes);
        for i in 0..self.num_episodes {
            let mut observation = env.reset(if i == 0 { self.seed } else { None });
            let mut episode = Episode::new();
            loop {
                let PolicyOutput { action, log_prob } = policy.sample_action(&observation)?;
                let transition = env.step(action)?;
                logger.log_index("action", action, num_actions)?;
                episode.push(EpisodeStep {
                    log_prob,
                    reward: transition.reward,
                });
                if transition.episode_done() {
                    break;
                }
                observation = transition.observation;
            }

            #[allow(clippy::cast_precision_loss)]
            let length = episode.len() as f64;
            logger.group_start();
            logger.group_log("episode_length", length.into())?;
            logger.group_log("episode_reward", episode.total_reward().into())?;
            logger.group_end();
            episodes.push(episode);
        }
        Ok(Rollout::new(episodes))
    }
}
