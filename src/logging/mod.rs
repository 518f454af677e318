//! Logging statistics from training runs
mod chunk;
mod display;
mod tensorboard;
#[cfg(test)]
pub mod testing;

pub use chunk::{ChunkLogger, ChunkSummary, SummaryWriter};
pub use display::{DisplayBackend, DisplayLogger};
pub use tensorboard::{TensorBoardBackend, TensorBoardLogger};

use std::borrow::Cow;
use thiserror::Error;

/// Identifier of a logged value.
pub type Id = &'static str;

/// A value that can be logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Loggable {
    /// Nothing. No data to log.
    ///
    /// Logging Nothing data may still produce a placeholder entry for the name.
    Nothing,
    /// Increment a counter.
    CounterIncrement(u64),
    /// A scalar value. Aggregate by taking means.
    Scalar(f64),
    /// A sample from a distrbution over `0 .. (size-1)`
    Index { value: usize, size: usize },
    /// A message. Aggregate by counting distinct messages.
    Message(Cow<'static, str>),
}

impl Loggable {
    /// The name of this variant
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Nothing => "Nothing",
            Self::CounterIncrement(_) => "CounterIncrement",
            Self::Scalar(_) => "Scalar",
            Self::Index { .. } => "Index",
            Self::Message(_) => "Message",
        }
    }
}

impl From<f64> for Loggable {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<f32> for Loggable {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<&'static str> for Loggable {
    #[inline]
    fn from(message: &'static str) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for Loggable {
    #[inline]
    fn from(message: String) -> Self {
        Self::Message(message.into())
    }
}

/// Error logging a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("incompatible value type; previously {prev} now {now}")]
    IncompatibleValue {
        prev: &'static str,
        now: &'static str,
    },
    #[error("incompatible index size; previously {prev} now {now}")]
    IncompatibleIndexSize { prev: usize, now: usize },
    #[error("index {value} is out of range for size {size}")]
    IndexOutOfRange { value: usize, size: usize },
}

/// Log statistics from a training run.
///
/// Values are logged in groups. A group is a set of values that belong to the same instant,
/// like the statistics of one episode. Groups are aggregated into summaries that are written
/// out when the logger is flushed.
pub trait StatsLogger {
    /// Start a group of logs.
    fn group_start(&mut self);

    /// Log a value within a group.
    ///
    /// # Returns
    /// May return an error if the logged value is structurally incompatible
    /// with previous values logged under the same id.
    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError>;

    /// End a group of logs.
    fn group_end(&mut self);

    /// Write out the summaries aggregated so far.
    fn flush(&mut self);

    /// Log a single value as its own group.
    fn log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        self.group_start();
        let result = self.group_log(id, value);
        self.group_end();
        result
    }

    /// Log a scalar value.
    #[inline]
    fn log_scalar(&mut self, id: Id, value: f64) -> Result<(), LogError> {
        self.log(id, Loggable::Scalar(value))
    }

    /// Log a sample from a distribution over `0 .. size`.
    #[inline]
    fn log_index(&mut self, id: Id, value: usize, size: usize) -> Result<(), LogError> {
        self.log(id, Loggable::Index { value, size })
    }

    /// Increment a counter.
    #[inline]
    fn log_counter_increment(&mut self, id: Id, increment: u64) -> Result<(), LogError> {
        self.log(id, Loggable::CounterIncrement(increment))
    }
}

/// Logger that does nothing
impl StatsLogger for () {
    #[inline]
    fn group_start(&mut self) {}
    #[inline]
    fn group_log(&mut self, _: Id, _: Loggable) -> Result<(), LogError> {
        Ok(())
    }
    #[inline]
    fn group_end(&mut self) {}
    #[inline]
    fn flush(&mut self) {}
}

/// Log to both loggers.
///
/// The first error is returned but the value is always passed to both loggers.
impl<A: StatsLogger, B: StatsLogger> StatsLogger for (A, B) {
    fn group_start(&mut self) {
        self.0.group_start();
        self.1.group_start();
    }
    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        let r1 = self.0.group_log(id, value.clone());
        let r2 = self.1.group_log(id, value);
        r1.and(r2)
    }
    fn group_end(&mut self) {
        self.0.group_end();
        self.1.group_end();
    }
    fn flush(&mut self) {
        self.0.flush();
        self.1.flush();
    }
}

impl<T: StatsLogger + ?Sized> StatsLogger for Box<T> {
    #[inline]
    fn group_start(&mut self) {
        T::group_start(self)
    }
    #[inline]
    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        T::group_log(self, id, value)
    }
    #[inline]
    fn group_end(&mut self) {
        T::group_end(self)
    }
    #[inline]
    fn flush(&mut self) {
        T::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger as Recorder;
    use super::*;

    #[test]
    fn pair_logs_to_both() {
        let mut logger = (Recorder::default(), Recorder::default());
        logger.log_scalar("x", 1.0).unwrap();
        logger.flush();
        for recorder in [&logger.0, &logger.1] {
            assert_eq!(recorder.values, vec![("x", Loggable::Scalar(1.0))]);
            assert_eq!(recorder.groups, 1);
            assert_eq!(recorder.flushes, 1);
        }
    }

    #[test]
    fn unit_logger_accepts_anything() {
        let mut logger = ();
        assert!(logger.log_index("a", 3, 2).is_ok());
    }

    #[test]
    fn loggable_from() {
        assert_eq!(Loggable::from(2.0_f32), Loggable::Scalar(2.0));
        assert_eq!(Loggable::from("hi"), Loggable::Message("hi".into()));
    }
}
