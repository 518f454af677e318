use super::{EnvError, Environment, Frame, Observation, Transition};

/// Environment wrapper that cuts off episodes after a set number of steps.
///
/// Reaching the limit sets [`Transition::truncated`]; whether the final state is terminal is
/// left as reported by the inner environment. Once an episode ends, `step` returns
/// [`EnvError::NotReset`] until the next `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLimit<E> {
    inner: E,
    /// Maximum number of steps per episode
    max_steps_per_episode: u64,
    current_steps: u64,
    done: bool,
}

impl<E> StepLimit<E> {
    pub const fn new(inner: E, max_steps_per_episode: u64) -> Self {
        Self {
            inner,
            max_steps_per_episode,
            current_steps: 0,
            done: false,
        }
    }

    pub const fn max_steps_per_episode(&self) -> u64 {
        self.max_steps_per_episode
    }

    pub const fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Environment> Environment for StepLimit<E> {
    fn observation_dim(&self) -> usize {
        self.inner.observation_dim()
    }

    fn num_actions(&self) -> usize {
        self.inner.num_actions()
    }

    fn reset(&mut self, seed: Option<u64>) -> Observation {
        self.current_steps = 0;
        self.done = false;
        self.inner.reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        if self.done {
            return Err(EnvError::NotReset);
        }
        let mut transition = self.inner.step(action)?;
        self.current_steps += 1;
        if self.current_steps >= self.max_steps_per_episode {
            transition.truncated = true;
        }
        self.done = transition.episode_done();
        Ok(transition)
    }

    fn render(&self) -> Option<Frame> {
        self.inner.render()
    }

    fn render_fps(&self) -> u32 {
        self.inner.render_fps()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}
