use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A numeric field of a [`crate::LatencyRecord`] that can be averaged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    ConnectionTime,
    HeaderTime,
    FirstChunkTime,
    TotalTime,
    /// Most recent text send before the first audio frame, to that frame.
    TimeToFirstAudio,
    /// First text send to the first audio frame.
    TimeFromFirstText,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric: {0}")]
pub struct ParseMetricError(pub String);

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::ConnectionTime,
        Metric::HeaderTime,
        Metric::FirstChunkTime,
        Metric::TotalTime,
        Metric::TimeToFirstAudio,
        Metric::TimeFromFirstText,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::ConnectionTime => "connection_time",
            Metric::HeaderTime => "header_time",
            Metric::FirstChunkTime => "first_chunk_time",
            Metric::TotalTime => "total_time",
            Metric::TimeToFirstAudio => "time_to_first_audio",
            Metric::TimeFromFirstText => "time_from_first_text",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ParseMetricError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "stream_generation_time".parse::<Metric>(),
            Err(ParseMetricError("stream_generation_time".into()))
        );
    }
}
