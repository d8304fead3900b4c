use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{self, AggregateError};
use crate::metric::Metric;
use crate::record::LatencyRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrialError {
    #[error("{0}")]
    Failed(String),
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// A trial that did not produce a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("trial {index} failed: {error}")]
pub struct TrialFailure {
    /// 1-based position of the trial in the run.
    pub index: usize,
    pub error: TrialError,
}

/// Records of one benchmark run, in call order.
#[derive(Debug, Clone, Default)]
pub struct TrialSequence {
    pub label: String,
    pub records: Vec<LatencyRecord>,
    pub failures: Vec<TrialFailure>,
}

impl TrialSequence {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Number of trials attempted, successful or not.
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn mean(&self, metric: Metric) -> Result<Duration, AggregateError> {
        aggregate::mean(&self.records, metric)
    }

    pub fn summarize(&self, metrics: &[Metric]) -> Vec<(Metric, Result<Duration, AggregateError>)> {
        aggregate::summarize(&self.records, metrics)
    }
}

/// Runs a trial a fixed number of times, strictly one after another.
#[derive(Clone, Debug)]
pub struct TrialRunner {
    trials: usize,
    deadline: Option<Duration>,
    fail_fast: bool,
}

impl Default for TrialRunner {
    fn default() -> Self {
        Self {
            trials: 10,
            deadline: None,
            fail_fast: false,
        }
    }
}

impl TrialRunner {
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    /// Abort any single trial that runs longer than `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop the run at the first failed trial instead of skipping it.
    pub fn fail_fast(mut self, value: bool) -> Self {
        self.fail_fast = value;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Invoke `trial` with indices `1..=trials`, awaiting each before the next.
    ///
    /// Failed trials are logged and kept out of `records`. With
    /// [`TrialRunner::fail_fast`] the first failure is returned instead.
    pub async fn run<F, Fut, E>(
        &self,
        label: &str,
        mut trial: F,
    ) -> Result<TrialSequence, TrialFailure>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<LatencyRecord, E>>,
        E: Display,
    {
        let mut sequence = TrialSequence::new(label);
        for index in 1..=self.trials {
            info!("{label}: trial {index}/{}", self.trials);
            let outcome = match self.deadline {
                Some(deadline) => match tokio::time::timeout(deadline, trial(index)).await {
                    Ok(res) => res.map_err(|e| TrialError::Failed(e.to_string())),
                    Err(_) => Err(TrialError::DeadlineExceeded(deadline)),
                },
                None => trial(index)
                    .await
                    .map_err(|e| TrialError::Failed(e.to_string())),
            };
            match outcome {
                Ok(record) => sequence.records.push(record),
                Err(error) => {
                    let failure = TrialFailure { index, error };
                    warn!("{label}: {failure}");
                    if self.fail_fast {
                        return Err(failure);
                    }
                    sequence.failures.push(failure);
                }
            }
        }
        Ok(sequence)
    }
}
