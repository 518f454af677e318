//! Per-step learning signals shaped from episode rewards.
//!
//! Each function maps the reward sequence `r[0], ..., r[T-1]` of a single episode to a
//! sequence `g[0], ..., g[T-1]` of the same length. The value `g[t]` is the coefficient
//! applied to the log-probability of the action taken at step `t` in the policy-gradient loss.
use serde::{Deserialize, Serialize};

/// How episode rewards are turned into per-step policy-gradient coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnMode {
    /// Every step is weighted by the total episode return.
    Raw,
    /// Each step is weighted by the sum of the rewards from that step onward.
    RewardToGo,
    /// Each step is weighted by the discounted sum of the rewards from that step onward.
    Discounted {
        /// Discount factor applied per step. A value in `[0, 1]`.
        discount_factor: f64,
    },
}

impl Default for ReturnMode {
    #[inline]
    fn default() -> Self {
        Self::Raw
    }
}

impl ReturnMode {
    /// Shape the rewards of one episode into per-step learning signals.
    ///
    /// The output always has the same length as `rewards`.
    pub fn shape(&self, rewards: &[f64]) -> Vec<f64> {
        match *self {
            Self::Raw => vec![total_return(rewards); rewards.len()],
            Self::RewardToGo => reward_to_go(rewards),
            Self::Discounted { discount_factor } => discounted_return(rewards, discount_factor),
        }
    }

    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::RewardToGo => "reward-to-go",
            Self::Discounted { .. } => "discounted",
        }
    }
}

/// Sum of all rewards in the episode.
#[inline]
pub fn total_return(rewards: &[f64]) -> f64 {
    rewards.iter().sum()
}

/// Suffix sums: `g[t] = r[t] + r[t+1] + ... + r[T-1]`.
pub fn reward_to_go(rewards: &[f64]) -> Vec<f64> {
    discounted_return(rewards, 1.0)
}

/// Discounted suffix sums: `g[t] = sum_{k in t..T} discount_factor ** (k - t) * r[k]`.
///
/// Evaluated from the end of the episode towards the start with a single accumulator.
pub fn discounted_return(rewards: &[f64], discount_factor: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut accumulator = 0.0;
    for (g, r) in returns.iter_mut().zip(rewards).rev() {
        accumulator = r + discount_factor * accumulator;
        *g = accumulator;
    }
    returns
}
