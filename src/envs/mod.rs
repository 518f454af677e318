//! Reinforcement learning environments
mod bandits;
mod builder;
mod cartpole;
mod frame;
mod step_limit;
#[cfg(test)]
pub mod testing;

pub use bandits::DeterministicBandit;
pub use builder::{make_env, parse_env_id, BuildEnvError};
pub use cartpole::{CartPole, CartPoleConfig, EnvironmentParams, PhysicalConstants};
pub use frame::{Frame, Rgb};
pub use step_limit::StepLimit;

use thiserror::Error;

/// Environment observation: a fixed-length feature vector.
pub type Observation = Vec<f64>;

/// Frame rate reported by environments that do not specify one.
pub const DEFAULT_RENDER_FPS: u32 = 30;

/// The result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation of the resulting state.
    pub observation: Observation,
    /// Reward for this transition.
    pub reward: f64,
    /// The resulting state is terminal; all future rewards would be zero.
    pub terminated: bool,
    /// The episode was cut off without reaching a terminal state (e.g. by a step limit).
    pub truncated: bool,
}

impl Transition {
    /// Whether this step ends the episode.
    #[inline]
    pub const fn episode_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// A reinforcement learning environment with internal state.
///
/// The episode state is advanced by [`Environment::step`] and restarted by
/// [`Environment::reset`]. `reset` must be called before the first step and after any step
/// that ends the episode.
pub trait Environment {
    /// Number of features in each observation.
    fn observation_dim(&self) -> usize;

    /// Number of discrete actions. Valid actions are `0 .. num_actions()`.
    fn num_actions(&self) -> usize;

    /// Start a new episode.
    ///
    /// # Args
    /// * `seed` - If set, re-seed the internal random state before sampling the initial state.
    ///     Otherwise the random state continues from where it left off.
    ///
    /// # Returns
    /// An observation of the initial state.
    fn reset(&mut self, seed: Option<u64>) -> Observation;

    /// Take a step in the environment.
    fn step(&mut self, action: usize) -> Result<Transition, EnvError>;

    /// Render the current state as an RGB frame.
    ///
    /// Returns `None` if the environment does not support rendering.
    fn render(&self) -> Option<Frame> {
        None
    }

    /// Frame rate for videos of rendered frames.
    fn render_fps(&self) -> u32 {
        DEFAULT_RENDER_FPS
    }

    /// Release any resources held by the environment.
    fn close(&mut self) {}
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observation_dim(&self) -> usize {
        E::observation_dim(self)
    }
    fn num_actions(&self) -> usize {
        E::num_actions(self)
    }
    fn reset(&mut self, seed: Option<u64>) -> Observation {
        E::reset(self, seed)
    }
    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        E::step(self, action)
    }
    fn render(&self) -> Option<Frame> {
        E::render(self)
    }
    fn render_fps(&self) -> u32 {
        E::render_fps(self)
    }
    fn close(&mut self) {
        E::close(self)
    }
}

/// Error taking an environment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("action {action} is not in the action space of size {num_actions}")]
    InvalidAction { action: usize, num_actions: usize },
    #[error("step called before reset or after the end of an episode")]
    NotReset,
}

/// Check that an action is in `0 .. num_actions`.
#[inline]
pub(crate) const fn check_action(action: usize, num_actions: usize) -> Result<(), EnvError> {
    if action < num_actions {
        Ok(())
    } else {
        Err(EnvError::InvalidAction {
            action,
            num_actions,
        })
    }
}
