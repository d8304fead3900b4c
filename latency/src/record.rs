use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::metric::Metric;

/// Delivery mode of a synthesis call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Complete text submitted up front, audio received progressively.
    FullStreaming,
    /// Text submitted fragment by fragment while audio streams back.
    InputStreaming,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::FullStreaming => f.write_str("streaming"),
            Mode::InputStreaming => f.write_str("input-streaming"),
        }
    }
}

/// Timings captured during a single synthesis call.
///
/// Duration fields and `first_audio_at` are write-once: the first value
/// stored wins and later assignments are ignored. Text send timestamps are
/// appended in send order.
#[derive(Clone, Debug, PartialEq)]
pub struct LatencyRecord {
    mode: Mode,
    connection_time: Option<Duration>,
    header_time: Option<Duration>,
    first_chunk_time: Option<Duration>,
    total_time: Option<Duration>,
    text_sent_at: Vec<Instant>,
    first_audio_at: Option<Instant>,
}

fn store_once<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl LatencyRecord {
    /// Create an empty record for `mode`.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            connection_time: None,
            header_time: None,
            first_chunk_time: None,
            total_time: None,
            text_sent_at: Vec::new(),
            first_audio_at: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Time from request start until the connection or response object was available.
    pub fn connection_time(&self) -> Option<Duration> {
        self.connection_time
    }

    /// Time spent waiting for the protocol header frame.
    pub fn header_time(&self) -> Option<Duration> {
        self.header_time
    }

    /// Time until the first audio chunk arrived.
    pub fn first_chunk_time(&self) -> Option<Duration> {
        self.first_chunk_time
    }

    /// End-to-end duration of the exchange.
    pub fn total_time(&self) -> Option<Duration> {
        self.total_time
    }

    /// Every text send timestamp, in send order.
    pub fn text_sent_at(&self) -> &[Instant] {
        &self.text_sent_at
    }

    /// Timestamp of the most recent text send.
    pub fn last_text_sent_at(&self) -> Option<Instant> {
        self.text_sent_at.last().copied()
    }

    pub fn first_audio_at(&self) -> Option<Instant> {
        self.first_audio_at
    }

    /// Returns `false` if the value was already set.
    pub fn set_connection_time(&mut self, value: Duration) -> bool {
        store_once(&mut self.connection_time, value)
    }

    /// Returns `false` if the value was already set.
    pub fn set_header_time(&mut self, value: Duration) -> bool {
        store_once(&mut self.header_time, value)
    }

    /// Returns `false` if the value was already set.
    pub fn set_first_chunk_time(&mut self, value: Duration) -> bool {
        store_once(&mut self.first_chunk_time, value)
    }

    /// Returns `false` if the value was already set.
    pub fn set_total_time(&mut self, value: Duration) -> bool {
        store_once(&mut self.total_time, value)
    }

    /// Returns `false` if the value was already set.
    pub fn set_first_audio_at(&mut self, at: Instant) -> bool {
        store_once(&mut self.first_audio_at, at)
    }

    pub fn record_text_sent(&mut self, at: Instant) {
        self.text_sent_at.push(at);
    }

    /// Latency between the most recent text send preceding the first audio
    /// frame and that audio frame.
    ///
    /// `None` until both a send and the first audio frame were recorded, or
    /// when audio arrived before any text was sent.
    pub fn time_to_first_audio(&self) -> Option<Duration> {
        let audio = self.first_audio_at?;
        let sent = self
            .text_sent_at
            .iter()
            .copied()
            .filter(|sent| *sent <= audio)
            .max()?;
        Some(audio.duration_since(sent))
    }

    /// Latency between the very first text send and the first audio frame.
    pub fn time_from_first_text(&self) -> Option<Duration> {
        let audio = self.first_audio_at?;
        let sent = self.text_sent_at.first().copied()?;
        if sent > audio {
            return None;
        }
        Some(audio.duration_since(sent))
    }

    /// Value of `metric` for this record, if it was reached.
    pub fn metric(&self, metric: Metric) -> Option<Duration> {
        match metric {
            Metric::ConnectionTime => self.connection_time,
            Metric::HeaderTime => self.header_time,
            Metric::FirstChunkTime => self.first_chunk_time,
            Metric::TotalTime => self.total_time,
            Metric::TimeToFirstAudio => self.time_to_first_audio(),
            Metric::TimeFromFirstText => self.time_from_first_text(),
        }
    }

    pub fn is_complete_for(&self, metric: Metric) -> bool {
        self.metric(metric).is_some()
    }
}
