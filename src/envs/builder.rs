use super::{CartPole, DeterministicBandit, Environment, StepLimit};
use thiserror::Error;

/// Error building an environment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildEnvError {
    #[error("unknown environment id {0:?}")]
    UnknownEnvironment(String),
}

/// Build a registered environment by id.
///
/// | id | environment | step limit |
/// |---|---|---|
/// | `CartPole-v0` | [`CartPole`] | 200 |
/// | `CartPole-v1` | [`CartPole`] | 500 |
/// | `DeterministicBandit-v0` | [`DeterministicBandit`] with arm rewards `[0, 1]` | 1 |
pub fn make_env(id: &str) -> Result<Box<dyn Environment>, BuildEnvError> {
    let env: Box<dyn Environment> = match parse_env_id(id) {
        ("CartPole", Some(0)) => Box::new(StepLimit::new(CartPole::default(), 200)),
        ("CartPole", Some(1)) => Box::new(StepLimit::new(CartPole::default(), 500)),
        ("DeterministicBandit", Some(0)) => {
            Box::new(StepLimit::new(DeterministicBandit::default(), 1))
        }
        _ => return Err(BuildEnvError::UnknownEnvironment(id.into())),
    };
    Ok(env)
}

/// Split an environment id of the form `Name-vN` into its name and version.
///
/// Ids without a valid version suffix are returned whole with no version.
pub fn parse_env_id(id: &str) -> (&str, Option<u32>) {
    if let Some((name, version)) = id.rsplit_once("-v") {
        if let Ok(version) = version.parse() {
            return (name, Some(version));
        }
    }
    (id, None)
}
