//! Environment testing utilities
use super::{check_action, EnvError, Environment, Observation, Transition};
use crate::Prng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

/// Run an environment with uniform random actions and check that invariants are satisfied.
pub fn check_env<E: Environment + ?Sized>(env: &mut E, num_steps: u64, seed: u64) {
    let mut rng = Prng::seed_from_u64(seed);
    let observation_dim = env.observation_dim();
    let num_actions = env.num_actions();
    assert!(num_actions > 0);

    let observation = env.reset(Some(seed));
    assert_eq!(observation.len(), observation_dim);
    for _ in 0..num_steps {
        let action = rng.gen_range(0..num_actions);
        let transition = env.step(action).unwrap();
        assert_eq!(transition.observation.len(), observation_dim);
        assert!(transition.reward.is_finite());
        if transition.episode_done() {
            assert_eq!(env.step(action), Err(EnvError::NotReset));
            let observation = env.reset(None);
            assert_eq!(observation.len(), observation_dim);
        }
    }
    env.close();
}

/// Shared record of the seeds passed to [`ScriptedEnv::reset`].
pub type SeedLog = Rc<RefCell<Vec<Option<u64>>>>;

/// Environment that replays scripted reward sequences, one per episode.
///
/// Each reset starts the next script, cycling back to the first. An episode terminates
/// after the last reward of its script. Every action is accepted and ignored. Observations
/// are `[step_index, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedEnv {
    episodes: Vec<Vec<f64>>,
    /// Index of the next script to start on reset.
    next_episode: usize,
    current: Option<(usize, usize)>,
    /// Number of resets so far.
    pub num_resets: usize,
    seeds: SeedLog,
}

impl ScriptedEnv {
    pub fn new(episodes: Vec<Vec<f64>>) -> Self {
        assert!(episodes.iter().all(|rewards| !rewards.is_empty()));
        Self {
            episodes,
            next_episode: 0,
            current: None,
            num_resets: 0,
            seeds: SeedLog::default(),
        }
    }

    /// Seeds passed to each reset, in order.
    pub fn seeds(&self) -> Vec<Option<u64>> {
        self.seeds.borrow().clone()
    }

    /// Handle to the seed record that outlives moving the environment into a trainer.
    pub fn seed_log(&self) -> SeedLog {
        Rc::clone(&self.seeds)
    }
}

impl Environment for ScriptedEnv {
    fn observation_dim(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self, seed: Option<u64>) -> Observation {
        self.num_resets += 1;
        self.seeds.borrow_mut().push(seed);
        self.current = Some((self.next_episode, 0));
        self.next_episode = (self.next_episode + 1) % self.episodes.len();
        vec![0.0, 1.0]
    }

    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        check_action(action, self.num_actions())?;
        let (episode, step) = self.current.ok_or(EnvError::NotReset)?;
        let rewards = &self.episodes[episode];
        let terminated = step + 1 >= rewards.len();
        let transition = Transition {
            observation: vec![(step + 1) as f64, 1.0],
            reward: rewards[step],
            terminated,
            truncated: false,
        };
        self.current = if terminated {
            None
        } else {
            Some((episode, step + 1))
        };
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_replays_rewards() {
        let mut env = ScriptedEnv::new(vec![vec![1.0, 2.0], vec![3.0]]);
        let _ = env.reset(Some(5));
        assert_eq!(env.step(0).unwrap().reward, 1.0);
        let last = env.step(1).unwrap();
        assert_eq!(last.reward, 2.0);
        assert!(last.terminated);

        let _ = env.reset(None);
        assert!(env.step(0).unwrap().terminated);
        assert_eq!(env.seeds(), vec![Some(5), None]);
    }

    #[test]
    fn run_scripted() {
        check_env(&mut ScriptedEnv::new(vec![vec![0.5; 3], vec![1.0]]), 50, 2);
    }
}
