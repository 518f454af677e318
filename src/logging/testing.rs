//! Logging test utilities
use super::{Id, LogError, Loggable, StatsLogger};

/// Logger that records every logged value in order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingLogger {
    pub values: Vec<(Id, Loggable)>,
    /// Number of completed groups
    pub groups: usize,
    pub flushes: usize,
}

impl RecordingLogger {
    /// All scalar values logged under `id`.
    pub fn scalars(&self, id: Id) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|(i, value)| match value {
                Loggable::Scalar(x) if *i == id => Some(*x),
                _ => None,
            })
            .collect()
    }

    /// All messages logged under `id`.
    pub fn messages(&self, id: Id) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|(i, value)| match value {
                Loggable::Message(m) if *i == id => Some(m.to_string()),
                _ => None,
            })
            .collect()
    }
}

impl StatsLogger for RecordingLogger {
    fn group_start(&mut self) {}
    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        self.values.push((id, value));
        Ok(())
    }
    fn group_end(&mut self) {
        self.groups += 1;
    }
    fn flush(&mut self) {
        self.flushes += 1;
    }
}
