//! Multi-layer perceptron
use super::Activation;
use std::iter;
use tch::{
    nn::{self, Linear, LinearConfig, Module, Path},
    Tensor,
};

/// Configuration for the [`Mlp`] module.
#[derive(Debug, Clone)]
pub struct MlpConfig {
    /// Sizes of the hidden layers
    pub hidden_sizes: Vec<usize>,
    /// Activation function between hidden layers.
    pub activation: Activation,
    /// Activation function on the output.
    pub output_activation: Activation,
    /// Configuration for the linear layers
    pub linear_config: LinearConfig,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![128],
            activation: Activation::Relu,
            output_activation: Activation::Identity,
            linear_config: LinearConfig::default(),
        }
    }
}

impl MlpConfig {
    pub fn build_module(&self, vs: &Path, in_dim: usize, out_dim: usize) -> Mlp {
        Mlp::new(vs, in_dim, out_dim, self)
    }
}

/// Multi-layer perceptron
///
/// Dense layers named `layer_0`, `layer_1`, ... under the given variable path,
/// with the hidden activation applied between consecutive layers.
#[derive(Debug)]
pub struct Mlp {
    layers: Vec<Linear>,
    activation: Activation,
    output_activation: Activation,
}

impl Mlp {
    #[allow(clippy::cast_possible_wrap)]
    pub fn new(vs: &Path, in_dim: usize, out_dim: usize, config: &MlpConfig) -> Self {
        let in_dims = iter::once(&in_dim).chain(&config.hidden_sizes);
        let out_dims = config.hidden_sizes.iter().chain(iter::once(&out_dim));

        let layers: Vec<_> = in_dims
            .zip(out_dims)
            .enumerate()
            .map(|(i, (in_, out_))| {
                nn::linear(
                    vs / format!("layer_{}", i),
                    *in_ as i64,
                    *out_ as i64,
                    config.linear_config,
                )
            })
            .collect();

        Self {
            layers,
            activation: config.activation,
            output_activation: config.output_activation,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Module for Mlp {
    fn forward(&self, input: &Tensor) -> Tensor {
        let mut hidden = input.shallow_clone();
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                hidden = self.activation.forward_owned(hidden);
            }
            hidden = layer.forward(&hidden);
        }
        self.output_activation.forward_owned(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tch::{nn::OptimizerConfig, Device, Kind};

    #[fixture]
    fn default_module() -> (nn::VarStore, Mlp) {
        let vs = nn::VarStore::new(Device::Cpu);
        let module = MlpConfig::default().build_module(&vs.root(), 3, 2);
        (vs, module)
    }

    #[rstest]
    fn forward_batch(default_module: (nn::VarStore, Mlp)) {
        let (_vs, mlp) = default_module;
        let input = Tensor::ones(&[4, 3], (Kind::Float, Device::Cpu));
        assert_eq!(mlp.forward(&input).size(), vec![4, 2]);
    }

    #[rstest]
    fn forward_single(default_module: (nn::VarStore, Mlp)) {
        let (_vs, mlp) = default_module;
        let input = Tensor::ones(&[3], (Kind::Float, Device::Cpu));
        assert_eq!(mlp.forward(&input).size(), vec![2]);
    }

    #[rstest]
    fn layer_variables(default_module: (nn::VarStore, Mlp)) {
        let (vs, mlp) = default_module;
        assert_eq!(mlp.num_layers(), 2);
        let mut names: Vec<_> = vs.variables().into_keys().collect();
        names.sort();
        assert_eq!(
            names,
            vec!["layer_0.bias", "layer_0.weight", "layer_1.bias", "layer_1.weight"]
        );
    }

    #[test]
    fn forward_gradient_descent() {
        let vs = nn::VarStore::new(Device::Cpu);
        let mlp = MlpConfig {
            hidden_sizes: vec![16],
            ..MlpConfig::default()
        }
        .build_module(&vs.root(), 3, 2);
        let mut optimizer = nn::Sgd::default().build(&vs, 1e-1).unwrap();

        let input = Tensor::of_slice(&[1.0_f32, -1.0, 0.5]).reshape(&[1, 3]);
        let target = Tensor::of_slice(&[0.5_f32, -0.5]).reshape(&[1, 2]);
        let loss_fn = || (mlp.forward(&input) - &target).square().mean(Kind::Float);

        let initial_loss = f64::from(loss_fn());
        for _ in 0..100 {
            optimizer.backward_step(&loss_fn());
        }
        let final_loss = f64::from(loss_fn());
        assert!(final_loss < initial_loss / 10.0, "{} -> {}", initial_loss, final_loss);
    }
}
