use crate::torch::{Categorical, Mlp, MlpConfig};
use tch::{nn, nn::Module, Device, Kind, TchError, Tensor};
use thiserror::Error;

/// An action sampled from a policy along with its log-probability.
#[derive(Debug)]
pub struct PolicyOutput {
    /// Index of the sampled action.
    pub action: usize,
    /// Log-probability of `action` under the current policy.
    ///
    /// A scalar tensor connected to the policy parameters in the autograd graph.
    pub log_prob: Tensor,
}

/// Stochastic policy over a discrete action set.
pub trait Policy {
    /// Sample an action for an observation.
    fn sample_action(&self, observation: &[f64]) -> Result<PolicyOutput, PolicyError>;
}

impl<T: Policy + ?Sized> Policy for &T {
    fn sample_action(&self, observation: &[f64]) -> Result<PolicyOutput, PolicyError> {
        T::sample_action(self, observation)
    }
}

/// Error evaluating a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("observation has {actual} features, expected {expected}")]
    ObservationSize { expected: usize, actual: usize },
    #[error(transparent)]
    Torch(#[from] TchError),
}

/// Neural network policy with a categorical action distribution.
///
/// An [`Mlp`] maps observations to action logits which parameterize a [`Categorical`].
pub struct CategoricalPolicy {
    vs: nn::VarStore,
    mlp: Mlp,
    observation_dim: usize,
    num_actions: usize,
}

impl CategoricalPolicy {
    pub fn new(
        observation_dim: usize,
        num_actions: usize,
        mlp_config: &MlpConfig,
        device: Device,
    ) -> Self {
        let vs = nn::VarStore::new(device);
        let mlp = mlp_config.build_module(&(&vs.root() / "policy"), observation_dim, num_actions);
        Self {
            vs,
            mlp,
            observation_dim,
            num_actions,
        }
    }

    /// Variable store holding the policy parameters.
    pub const fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    pub const fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub const fn observation_dim(&self) -> usize {
        self.observation_dim
    }

    /// Action distribution for an observation.
    pub fn distribution(&self, observation: &[f64]) -> Result<Categorical, PolicyError> {
        if observation.len() != self.observation_dim {
            return Err(PolicyError::ObservationSize {
                expected: self.observation_dim,
                actual: observation.len(),
            });
        }
        let input = Tensor::f_of_slice(observation)?
            .f_to_kind(Kind::Float)?
            .f_to_device(self.vs.device())?;
        Ok(Categorical::new(&self.mlp.forward(&input)))
    }
}

impl Policy for CategoricalPolicy {
    fn sample_action(&self, observation: &[f64]) -> Result<PolicyOutput, PolicyError> {
        let distribution = self.distribution(observation)?;
        let action = tch::no_grad(|| distribution.sample());
        let log_prob = distribution.log_probs(&action);
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let action = i64::from(&action) as usize;
        Ok(PolicyOutput { action, log_prob })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn policy() -> CategoricalPolicy {
        tch::manual_seed(0);
        CategoricalPolicy::new(4, 3, &MlpConfig::default(), Device::Cpu)
    }

    #[rstest]
    fn sample_in_range(policy: CategoricalPolicy) {
        for _ in 0..50 {
            let output = policy.sample_action(&[0.1, -0.2, 0.3, 0.0]).unwrap();
            assert!(output.action < 3);
            assert_eq!(output.log_prob.size(), Vec::<i64>::new());
            let log_prob = f64::from(&output.log_prob);
            assert!(log_prob <= 0.0 && log_prob.is_finite());
        }
    }

    #[rstest]
    fn log_prob_matches_distribution(policy: CategoricalPolicy) {
        let observation = [1.0, 0.5, -0.5, 2.0];
        let output = policy.sample_action(&observation).unwrap();
        let probs = policy.distribution(&observation).unwrap().probs();
        #[allow(clippy::cast_possible_wrap)]
        let expected = probs.double_value(&[output.action as i64]).ln();
        assert!((f64::from(&output.log_prob) - expected).abs() < 1e-5);
    }

    #[rstest]
    fn log_prob_has_gradient(policy: CategoricalPolicy) {
        let output = policy.sample_action(&[0.0, 0.0, 1.0, 0.0]).unwrap();
        assert!(output.log_prob.requires_grad());
        output.log_prob.backward();
        let grad_norm: f64 = policy
            .var_store()
            .trainable_variables()
            .iter()
            .map(|t| f64::from(t.grad().abs().sum(Kind::Float)))
            .sum();
        assert!(grad_norm > 0.0);
    }

    #[rstest]
    fn wrong_observation_size(policy: CategoricalPolicy) {
        assert!(matches!(
            policy.sample_action(&[1.0]),
            Err(PolicyError::ObservationSize {
                expected: 4,
                actual: 1
            })
        ));
    }
}
