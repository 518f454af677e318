//! Agent testing utilities
use super::{Policy, PolicyError, PolicyOutput};
use crate::envs::{DeterministicBandit, Environment};
use tch::Tensor;

/// Policy that always selects the same action with a fixed log-probability.
///
/// The log-probability is derived from a leaf tensor that requires gradients so
/// that the gradient of a loss with respect to it can be inspected.
#[derive(Debug)]
pub struct FixedPolicy {
    pub action: usize,
    pub log_prob: Tensor,
}

impl FixedPolicy {
    pub fn new(action: usize) -> Self {
        Self {
            action,
            log_prob: Tensor::zeros(&[], tch::kind::FLOAT_CPU).set_requires_grad(true),
        }
    }
}

impl Policy for FixedPolicy {
    fn sample_action(&self, _observation: &[f64]) -> Result<PolicyOutput, PolicyError> {
        Ok(PolicyOutput {
            action: self.action,
            log_prob: &self.log_prob * 1.0,
        })
    }
}

/// Check that a policy selects the rewarding arm of the 0-1 deterministic bandit
/// in at least `threshold` of evaluation episodes.
pub fn eval_deterministic_bandit<P: Policy + ?Sized>(policy: &P, threshold: f64) {
    let mut env = DeterministicBandit::default();
    let num_eval_steps = 1000;
    let mut num_correct = 0;
    for _ in 0..num_eval_steps {
        let observation = env.reset(None);
        let output = tch::no_grad(|| policy.sample_action(&observation)).unwrap();
        let transition = env.step(output.action).unwrap();
        if transition.reward > 0.5 {
            num_correct += 1;
        }
    }
    let fraction = f64::from(num_correct) / f64::from(num_eval_steps);
    assert!(
        fraction >= threshold,
        "selected the rewarding arm in {} of episodes",
        fraction
    );
}
