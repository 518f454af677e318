//! Command-line logger
use super::chunk::{ChunkLogger, ChunkSummary, SummaryWriter};
use super::{Id, LogError, Loggable, StatsLogger};
use crate::utils::fmt::{DisplayFn, PrettyPrint};
use std::fmt;
use std::time::Duration;
use yansi::Paint;

/// Logger that displays a summary to standard output on each flush.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DisplayLogger(ChunkLogger<DisplayBackend>);

impl DisplayLogger {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsLogger for DisplayLogger {
    #[inline]
    fn group_start(&mut self) {
        self.0.group_start()
    }
    #[inline]
    fn group_log(&mut self, id: Id, value: Loggable) -> Result<(), LogError> {
        self.0.group_log(id, value)
    }
    #[inline]
    fn group_end(&mut self) {
        self.0.group_end()
    }
    #[inline]
    fn flush(&mut self) {
        self.0.flush()
    }
}

/// Logging backend that displays summaries to standard output.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DisplayBackend;

impl SummaryWriter for DisplayBackend {
    fn write_summaries<'a, I>(&mut self, summaries: I, elapsed: Duration)
    where
        I: Iterator<Item = (&'a Id, &'a ChunkSummary)>,
    {
        println!();
        println!("{}", Paint::fixed(8, format!("({:.2?})", elapsed)));
        for (id, summary) in summaries {
            println!("{:<24} {}", Paint::fixed(35, id), DisplaySummary(summary));
        }
    }
}

#[derive(Debug)]
struct DisplaySummary<'a>(&'a ChunkSummary);

impl<'a> fmt::Display for DisplaySummary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            ChunkSummary::Nothing => Ok(()),
            ChunkSummary::Counter {
                increment,
                initial_value,
            } => write!(
                f,
                "{}  (+{})",
                initial_value + increment,
                Paint::fixed(253, increment)
            ),
            ChunkSummary::Scalar { stats } => {
                if let Some(mean) = stats.mean() {
                    write!(f, "{:.3}", PrettyPrint(mean))?;
                    if stats.count() > 1 {
                        if let Some(stddev) = stats.stddev() {
                            write!(
                                f,
                                " {}",
                                Paint::fixed(
                                    8,
                                    DisplayFn(|f| write!(f, "(σ {:.3})", PrettyPrint(stddev)))
                                )
                            )?;
                        }
                    }
                }
                Ok(())
            }
            ChunkSummary::Index { counts } => {
                let n: usize = counts.iter().sum();
                write!(f, "(n {})  [", n)?;
                let mut first = true;
                for c in counts {
                    if first {
                        first = false;
                    } else {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", c * 100 / n.max(1))?;
                }
                write!(f, "]%")
            }
            ChunkSummary::Message { counts } => {
                let mut first = true;
                for (message, count) in counts {
                    if first {
                        first = false;
                    } else {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", message)?;
                    if *count > 1 {
                        write!(f, " {}", Paint::fixed(8, format!("(x{})", count)))?;
                    }
                }
                Ok(())
            }
        }
    }
}
