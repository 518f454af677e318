//! Policies and experience collection
mod collector;
mod episode;
mod policy;
#[cfg(test)]
pub mod testing;

pub use collector::TrajectoryCollector;
pub use episode::{Episode, EpisodeStep, Rollout, RolloutError, SerializedRollout};
pub use policy::{CategoricalPolicy, Policy, PolicyError, PolicyOutput};
