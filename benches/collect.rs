//! Benchmark trajectory collection on CartPole.
use criterion::{criterion_group, criterion_main, Criterion};
use reinforce::envs::{CartPole, StepLimit};
use reinforce::torch::MlpConfig;
use reinforce::{CategoricalPolicy, Environment, TrajectoryCollector};
use tch::Device;

fn bench_collect(c: &mut Criterion) {
    let mut env = StepLimit::new(CartPole::default(), 500);
    let policy = CategoricalPolicy::new(
        env.observation_dim(),
        env.num_actions(),
        &MlpConfig::default(),
        Device::Cpu,
    );
    let collector = TrajectoryCollector::new(10, Some(0));
    c.bench_function("collect_cartpole_10_episodes", |b| {
        b.iter(|| collector.collect(&mut env, &policy, &mut ()).unwrap())
    });
}

fn bench_env_step(c: &mut Criterion) {
    let mut env = CartPole::default();
    let _ = env.reset(Some(0));
    let mut action = 0;
    c.bench_function("cartpole_step", |b| {
        b.iter(|| {
            action = 1 - action;
            if env.step(action).map_or(true, |t| t.episode_done()) {
                let _ = env.reset(None);
            }
        })
    });
}

criterion_group!(benches, bench_collect, bench_env_step);
criterion_main!(benches);
