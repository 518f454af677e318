use super::{Id, LogError, Loggable, StatsLogger};
use crate::utils::stats::OnlineMeanVariance;
use std::borrow::Cow;
use std::collections::{btree_map::Entry, BTreeMap};
use std::ops::Drop;
use std::time::{Duration, Instant};

/// Write out summaries to a backend.
pub trait SummaryWriter {
    fn write_summaries<'a, I>(&mut self, summaries: I, elapsed: Duration)
    where
        I: Iterator<Item = (&'a Id, &'a ChunkSummary)>;
}

/// Logs time series statistics by breaking the time series into chunks and summarizing each chunk.
///
/// A chunk ends whenever the logger is flushed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLogger<W: SummaryWriter> {
    writer: W,

    // A binary tree is used so that keys are retrieved in sorted order
    summaries: BTreeMap<Id, Node>,

    // Start time of the current chunk.
    chunk_start: Instant,
}

impl<W: SummaryWriter> ChunkLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            summaries: BTreeMap::new(),
            chunk_start: Instant::now(),
        }
    }

    /// The current summary for `id`, if it has been logged in this chunk.
    pub fn summary(&self, id: Id) -> Option<&ChunkSummary> {
        self.summaries
            .get(id)
            .filter(|node| node.dirty)
            .map(|node| &node.summary)
    }
}

impl<W: SummaryWriter + Default> Default for ChunkLogger<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}

impl<W: SummaryWriter> StatsLogger for ChunkLogger<W> {
    #[inline]
    fn group_start(&mut self) {}

    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        match self.summaries.entry(id) {
            Entry::Vacant(e) => {
                e.insert(Node::new(ChunkSummary::try_from(value)?));
            }
            Entry::Occupied(e) => e.into_mut().push(value)?,
        };
        Ok(())
    }

    #[inline]
    fn group_end(&mut self) {}

    fn flush(&mut self) {
        if !self.summaries.values().any(|node| node.dirty) {
            return;
        }
        self.writer.write_summaries(
            self.summaries.iter().filter_map(|(id, node)| {
                if node.dirty {
                    Some((id, &node.summary))
                } else {
                    None
                }
            }),
            self.chunk_start.elapsed(),
        );

        // Reset
        for node in self.summaries.values_mut() {
            node.reset();
        }
        self.chunk_start = Instant::now();
    }
}

/// Flush when dropped
impl<W: SummaryWriter> Drop for ChunkLogger<W> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    /// Variable chunk summary
    summary: ChunkSummary,
    /// Whether the summary has been updated in this chunk
    dirty: bool,
}

impl Node {
    const fn new(summary: ChunkSummary) -> Self {
        Self {
            summary,
            dirty: true,
        }
    }

    fn push(&mut self, value: Loggable) -> Result<(), LogError> {
        self.summary.push(value)?;
        self.dirty = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.dirty = false;
        self.summary.reset()
    }
}

/// Summary of the values logged under one id within a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkSummary {
    Nothing,
    Counter {
        increment: u64,
        initial_value: u64,
    },
    Scalar {
        stats: OnlineMeanVariance<f64>,
    },
    Index {
        counts: Vec<usize>,
    },
    Message {
        counts: BTreeMap<Cow<'static, str>, usize>,
    },
}

impl TryFrom<Loggable> for ChunkSummary {
    type Error = LogError;

    fn try_from(value: Loggable) -> Result<Self, Self::Error> {
        Ok(match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::CounterIncrement(i) => Self::Counter {
                increment: i,
                initial_value: 0,
            },
            Loggable::Scalar(v) => {
                let mut stats = OnlineMeanVariance::new();
                stats.push(v);
                Self::Scalar { stats }
            }
            Loggable::Index { value: v, size } => {
                if v >= size {
                    return Err(LogError::IndexOutOfRange { value: v, size });
                }
                let mut counts = vec![0; size];
                counts[v] += 1;
                Self::Index { counts }
            }
            Loggable::Message(s) => {
                let mut counts = BTreeMap::new();
                counts.insert(s, 1);
                Self::Message { counts }
            }
        })
    }
}

impl ChunkSummary {
    /// Add a value to the summary
    ///
    /// Returns and error and does not insert the value if it is incompatible with the current
    /// summary. The value will be incompatible if the summary was created from a different
    /// loggable variant, or if some other structure of the loggable is different.
    fn push(&mut self, value: Loggable) -> Result<(), LogError> {
        match (self, value) {
            (Self::Nothing, Loggable::Nothing) => {}
            (Self::Counter { increment, .. }, Loggable::CounterIncrement(i)) => {
                *increment += i;
            }
            (Self::Scalar { stats }, Loggable::Scalar(v)) => stats.push(v),
            (Self::Index { counts }, Loggable::Index { value: v, size }) => {
                if counts.len() != size {
                    return Err(LogError::IncompatibleIndexSize {
                        prev: counts.len(),
                        now: size,
                    });
                }
                if v >= size {
                    return Err(LogError::IndexOutOfRange { value: v, size });
                }
                counts[v] += 1;
            }
            (Self::Message { counts }, Loggable::Message(s)) => {
                *counts.entry(s).or_insert(0) += 1;
            }
            (summary, value) => {
                return Err(LogError::IncompatibleValue {
                    prev: summary.loggable_variant_name(),
                    now: value.variant_name(),
                })
            }
        };
        Ok(())
    }

    /// Reset for the start of the next chunk.
    fn reset(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Counter {
                increment,
                initial_value,
            } => {
                *initial_value += *increment;
                *increment = 0
            }
            Self::Scalar { stats } => *stats = OnlineMeanVariance::new(),
            Self::Index { counts } => counts.iter_mut().for_each(|c| *c = 0),
            Self::Message { counts } => counts.clear(),
        }
    }

    /// The name of the associated loggable variant
    const fn loggable_variant_name(&self) -> &'static str {
        match self {
            Self::Nothing => "Nothing",
            Self::Counter { .. } => "CounterIncrement",
            Self::Scalar { .. } => "Scalar",
            Self::Index { .. } => "Index",
            Self::Message { .. } => "Message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer that records the written chunks.
    #[derive(Debug, Default, Clone)]
    struct RecordingWriter(Rc<RefCell<Vec<Vec<(Id, ChunkSummary)>>>>);

    impl SummaryWriter for RecordingWriter {
        fn write_summaries<'a, I>(&mut self, summaries: I, _: Duration)
        where
            I: Iterator<Item = (&'a Id, &'a ChunkSummary)>,
        {
            self.0
                .borrow_mut()
                .push(summaries.map(|(id, s)| (*id, s.clone())).collect());
        }
    }

    #[test]
    fn scalar_mean_per_chunk() {
        let writer = RecordingWriter::default();
        let chunks = Rc::clone(&writer.0);
        let mut logger = ChunkLogger::new(writer);

        logger.log_scalar("x", 1.0).unwrap();
        logger.log_scalar("x", 3.0).unwrap();
        logger.flush();
        logger.log_scalar("x", 10.0).unwrap();
        logger.flush();

        let chunks = chunks.borrow();
        assert_eq!(chunks.len(), 2);
        match &chunks[0][0] {
            ("x", ChunkSummary::Scalar { stats }) => assert_eq!(stats.mean(), Some(2.0)),
            other => panic!("unexpected summary {:?}", other),
        }
        match &chunks[1][0] {
            ("x", ChunkSummary::Scalar { stats }) => assert_eq!(stats.mean(), Some(10.0)),
            other => panic!("unexpected summary {:?}", other),
        }
    }

    #[test]
    fn counter_carries_over() {
        let mut logger = ChunkLogger::new(RecordingWriter::default());
        logger.log_counter_increment("n", 2).unwrap();
        logger.flush();
        logger.log_counter_increment("n", 3).unwrap();
        assert_eq!(
            logger.summary("n"),
            Some(&ChunkSummary::Counter {
                increment: 3,
                initial_value: 2
            })
        );
    }

    #[test]
    fn clean_ids_are_not_written() {
        let writer = RecordingWriter::default();
        let chunks = Rc::clone(&writer.0);
        let mut logger = ChunkLogger::new(writer);
        logger.log_scalar("a", 1.0).unwrap();
        logger.flush();
        logger.log_scalar("b", 1.0).unwrap();
        logger.flush();
        logger.flush();

        let chunks = chunks.borrow();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].len(), 1);
        assert_eq!(chunks[1][0].0, "b");
    }

    #[test]
    fn index_histogram() {
        let mut logger = ChunkLogger::new(RecordingWriter::default());
        logger.log_index("action", 1, 3).unwrap();
        logger.log_index("action", 1, 3).unwrap();
        logger.log_index("action", 0, 3).unwrap();
        assert_eq!(
            logger.summary("action"),
            Some(&ChunkSummary::Index {
                counts: vec![1, 2, 0]
            })
        );
    }

    #[test]
    fn incompatible_value_is_rejected() {
        let mut logger = ChunkLogger::new(RecordingWriter::default());
        logger.log_scalar("x", 1.0).unwrap();
        assert_eq!(
            logger.log_index("x", 0, 2),
            Err(LogError::IncompatibleValue {
                prev: "Scalar",
                now: "Index"
            })
        );
    }

    #[test]
    fn incompatible_index_size_is_rejected() {
        let mut logger = ChunkLogger::new(RecordingWriter::default());
        logger.log_index("a", 0, 2).unwrap();
        assert_eq!(
            logger.log_index("a", 0, 3),
            Err(LogError::IncompatibleIndexSize { prev: 2, now: 3 })
        );
    }
}
