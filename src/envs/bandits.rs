use super::{check_action, EnvError, Environment, Observation, Transition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A multi-armed bandit with a fixed reward for each arm.
///
/// Every episode is a single step. The observation is always `[1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicBandit {
    rewards: Vec<f64>,
    #[serde(skip)]
    ready: bool,
}

impl DeterministicBandit {
    /// Create a bandit from the reward of each arm.
    pub fn from_rewards(rewards: Vec<f64>) -> Self {
        Self {
            rewards,
            ready: false,
        }
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }
}

impl Default for DeterministicBandit {
    fn default() -> Self {
        Self::from_rewards(vec![0.0, 1.0])
    }
}

impl fmt::Display for DeterministicBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DeterministicBandit({:?})", self.rewards)
    }
}

impl Environment for DeterministicBandit {
    fn observation_dim(&self) -> usize {
        1
    }

    fn num_actions(&self) -> usize {
        self.rewards.len()
    }

    fn reset(&mut self, _seed: Option<u64>) -> Observation {
        self.ready = true;
        vec![1.0]
    }

    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        check_action(action, self.num_actions())?;
        if !self.ready {
            return Err(EnvError::NotReset);
        }
        self.ready = false;
        Ok(Transition {
            observation: vec![1.0],
            reward: self.rewards[action],
            terminated: true,
            truncated: false,
        })
    }
}
