//! Latency measurement primitives shared by every vendor benchmark.
//!
//! A [`LatencyRecord`] holds the timings captured during one synthesis call.
//! The [`TrialRunner`] repeats a call sequentially and collects the records
//! into a [`TrialSequence`], which [`mean`] reduces to per-[`Metric`]
//! averages.

pub mod aggregate;
pub mod metric;
pub mod record;
pub mod runner;

pub use aggregate::{mean, summarize, AggregateError};
pub use metric::{Metric, ParseMetricError};
pub use record::{LatencyRecord, Mode};
pub use runner::{TrialError, TrialFailure, TrialRunner, TrialSequence};
