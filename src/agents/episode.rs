//! Recorded episodes and rollouts
use tch::Tensor;
use thiserror::Error;

/// One step of an episode: the log-probability of the action taken and the reward received.
#[derive(Debug)]
pub struct EpisodeStep {
    /// Scalar log-probability tensor, differentiable with respect to the policy parameters.
    pub log_prob: Tensor,
    pub reward: f64,
}

/// The steps of a single episode, in order.
#[derive(Debug, Default)]
pub struct Episode {
    steps: Vec<EpisodeStep>,
}

impl Episode {
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: EpisodeStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[EpisodeStep] {
        &self.steps
    }

    pub fn rewards(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps.iter().map(|step| step.reward)
    }

    /// Undiscounted sum of rewards.
    pub fn total_reward(&self) -> f64 {
        self.rewards().sum()
    }
}

impl FromIterator<EpisodeStep> for Episode {
    fn from_iter<I: IntoIterator<Item = EpisodeStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// The episodes collected under one policy snapshot.
#[derive(Debug, Default)]
pub struct Rollout {
    episodes: Vec<Episode>,
}

impl Rollout {
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self { episodes }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn num_episodes(&self) -> usize {
        self.episodes.len()
    }

    /// Total number of steps over all episodes.
    pub fn num_steps(&self) -> usize {
        self.episodes.iter().map(Episode::len).sum()
    }

    /// Transpose into per-episode log-probability tensors and reward sequences.
    ///
    /// Empty episodes produce an empty log-probability tensor.
    pub fn into_serialized(self) -> SerializedRollout {
        let mut log_probs = Vec::with_capacity(self.episodes.len());
        let mut rewards = Vec::with_capacity(self.episodes.len());
        for episode in self.episodes {
            let (episode_log_probs, episode_rewards): (Vec<_>, Vec<_>) = episode
                .steps
                .into_iter()
                .map(|step| (step.log_prob, step.reward))
                .unzip();
            log_probs.push(if episode_log_probs.is_empty() {
                Tensor::zeros(&[0], tch::kind::FLOAT_CPU)
            } else {
                Tensor::stack(&episode_log_probs, 0)
            });
            rewards.push(episode_rewards);
        }
        SerializedRollout { log_probs, rewards }
    }
}

/// A rollout as two parallel per-episode sequences.
///
/// `log_probs[i]` is a 1D tensor holding the log-probability of each action in episode `i`
/// and `rewards[i]` holds the matching rewards.
#[derive(Debug)]
pub struct SerializedRollout {
    pub log_probs: Vec<Tensor>,
    pub rewards: Vec<Vec<f64>>,
}

impl SerializedRollout {
    pub fn num_episodes(&self) -> usize {
        self.rewards.len()
    }

    /// Check that the rollout is non-empty and the two sequences line up.
    pub fn validate(&self) -> Result<(), RolloutError> {
        if self.rewards.is_empty() {
            return Err(RolloutError::EmptyRollout);
        }
        if self.log_probs.len() != self.rewards.len() {
            return Err(RolloutError::EpisodeCountMismatch {
                log_probs: self.log_probs.len(),
                rewards: self.rewards.len(),
            });
        }
        for (episode, (log_probs, rewards)) in self.log_probs.iter().zip(&self.rewards).enumerate() {
            let num_log_probs = log_probs.numel();
            if num_log_probs != rewards.len() {
                return Err(RolloutError::LengthMismatch {
                    episode,
                    log_probs: num_log_probs,
                    rewards: rewards.len(),
                });
            }
        }
        Ok(())
    }

    /// Sum of all episode rewards divided by the number of episodes.
    ///
    /// Returns `None` for an empty rollout.
    pub fn average_return(&self) -> Option<f64> {
        if self.rewards.is_empty() {
            return None;
        }
        let total: f64 = self.rewards.iter().flatten().sum();
        #[allow(clippy::cast_precision_loss)]
        Some(total / self.rewards.len() as f64)
    }
}

/// Malformed rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RolloutError {
    #[error("rollout contains no episodes")]
    EmptyRollout,
    #[error("{log_probs} log-prob sequences but {rewards} reward sequences")]
    EpisodeCountMismatch { log_probs: usize, rewards: usize },
    #[error("episode {episode} has {log_probs} log-probs but {rewards} rewards")]
    LengthMismatch {
        episode: usize,
        log_probs: usize,
        rewards: usize,
    },
}
