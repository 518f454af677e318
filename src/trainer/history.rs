use crate::RLError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::Deref;
use std::path::Path;

/// Average trajectory reward of each rollout, in order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardHistory(Vec<f64>);

impl RewardHistory {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, average_reward: f64) {
        self.0.push(average_reward);
    }

    /// Write as a JSON array of numbers.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RLError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RLError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Deref for RewardHistory {
    type Target = [f64];
    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for RewardHistory {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
