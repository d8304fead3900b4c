use std::time::Duration;

use thiserror::Error;

use crate::metric::Metric;
use crate::record::LatencyRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot average {0} over an empty sequence")]
    Empty(Metric),
    #[error("record {index} has no {metric}")]
    Unset { index: usize, metric: Metric },
}

/// Arithmetic mean of `metric` across `records`.
///
/// Every record must carry the metric; unset values are an error rather
/// than being skipped.
pub fn mean(records: &[LatencyRecord], metric: Metric) -> Result<Duration, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::Empty(metric));
    }
    let mut total = Duration::ZERO;
    for (index, record) in records.iter().enumerate() {
        let value = record
            .metric(metric)
            .ok_or(AggregateError::Unset { index, metric })?;
        total += value;
    }
    let nanos = total.as_nanos() / records.len() as u128;
    Ok(Duration::from_nanos(nanos as u64))
}

/// Average each of `metrics`, keeping failures alongside successes.
pub fn summarize(
    records: &[LatencyRecord],
    metrics: &[Metric],
) -> Vec<(Metric, Result<Duration, AggregateError>)> {
    metrics.iter().map(|m| (*m, mean(records, *m))).collect()
}
