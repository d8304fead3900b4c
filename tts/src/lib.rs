//! Latency-instrumented text-to-speech drivers.
//!
//! Each vendor module exposes a [`SynthesisDriver`] that performs exactly one
//! synthesis exchange, writes the audio to that vendor's output file, and
//! returns the [`LatencyRecord`] captured along the way.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use latency::{LatencyRecord, Mode};
use llm::TextStream;
use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;

pub mod audio;
pub mod config;
pub mod elevenlabs;
pub mod openai;
pub mod playht;
pub mod sentence;

pub use config::{ElevenLabsConfig, OpenAiTtsConfig, PlayHtConfig, VendorConfig};
pub use elevenlabs::ElevenLabsDriver;
pub use openai::OpenAiTtsDriver;
pub use playht::{PlayHtClient, PlayHtDriver};

/// A text-to-speech provider under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vendor {
    ElevenLabs,
    PlayHt,
    OpenAi,
}

impl Vendor {
    /// Fixed name of the file each call overwrites.
    pub fn audio_file_name(&self) -> &'static str {
        match self {
            Vendor::ElevenLabs => "eleven_api_benchmark.mp3",
            Vendor::PlayHt => "playht_sdk_benchmark.mp3",
            Vendor::OpenAi => "openai_benchmark_output.mp3",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::ElevenLabs => f.write_str("elevenlabs"),
            Vendor::PlayHt => f.write_str("playht"),
            Vendor::OpenAi => f.write_str("openai"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TTSError {
    #[error("{vendor} returned status {status}: {body}")]
    Synthesis {
        vendor: Vendor,
        status: u16,
        body: String,
    },
    #[error("{vendor} connection failed: {reason}")]
    Connection { vendor: Vendor, reason: String },
    #[error("{vendor} does not support {mode}")]
    UnsupportedMode { vendor: Vendor, mode: Mode },
    #[error("{mode} cannot take {input} input")]
    UnsupportedInput { mode: Mode, input: &'static str },
    #[error("invalid credential: {0}")]
    Credential(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, TTSError>;

/// Text handed to a driver for one call.
pub enum SynthesisInput {
    /// The complete text.
    Text(String),
    /// Fragments produced on the async scheduler.
    Fragments(TextStream),
    /// Fragments produced by a blocking iterator.
    Blocking(Box<dyn Iterator<Item = String> + Send>),
}

impl SynthesisInput {
    pub fn kind(&self) -> &'static str {
        match self {
            SynthesisInput::Text(_) => "text",
            SynthesisInput::Fragments(_) => "fragment stream",
            SynthesisInput::Blocking(_) => "blocking fragment",
        }
    }

    /// The complete text, required by full-streaming calls.
    pub fn into_text(self, mode: Mode) -> Result<String> {
        match self {
            SynthesisInput::Text(text) => Ok(text),
            other => Err(TTSError::UnsupportedInput {
                mode,
                input: other.kind(),
            }),
        }
    }

    /// The input as a fragment stream.
    ///
    /// Blocking iterators are drained on the blocking pool so their pacing
    /// never stalls the async runtime. Must be called within a runtime.
    pub fn into_stream(self) -> TextStream {
        match self {
            SynthesisInput::Text(text) => Box::pin(tokio_stream::once(text)),
            SynthesisInput::Fragments(stream) => stream,
            SynthesisInput::Blocking(iter) => {
                let (tx, rx) = tokio::sync::mpsc::channel(1);
                tokio::task::spawn_blocking(move || {
                    for fragment in iter {
                        if tx.blocking_send(fragment).is_err() {
                            break;
                        }
                    }
                });
                Box::pin(ReceiverStream::new(rx))
            }
        }
    }
}

impl From<String> for SynthesisInput {
    fn from(text: String) -> Self {
        SynthesisInput::Text(text)
    }
}

impl From<&str> for SynthesisInput {
    fn from(text: &str) -> Self {
        SynthesisInput::Text(text.to_string())
    }
}

/// One vendor integration, timed.
#[async_trait]
pub trait SynthesisDriver: Send + Sync {
    fn vendor(&self) -> Vendor;

    fn supports(&self, mode: Mode) -> bool;

    /// Perform one synthesis exchange and return its timings.
    ///
    /// On failure no record is returned; partially measured phases are
    /// discarded with it.
    async fn run(&self, input: SynthesisInput, mode: Mode) -> Result<LatencyRecord>;
}

/// Build the driver for `vendor`, writing audio into `out_dir`.
pub fn driver_for(
    vendor: Vendor,
    config: &VendorConfig,
    out_dir: impl AsRef<Path>,
) -> Box<dyn SynthesisDriver> {
    let out_dir = out_dir.as_ref().to_path_buf();
    match vendor {
        Vendor::ElevenLabs => Box::new(ElevenLabsDriver::new(config.eleven_labs.clone(), out_dir)),
        Vendor::PlayHt => Box::new(PlayHtDriver::new(config.play_ht.clone(), out_dir)),
        Vendor::OpenAi => Box::new(OpenAiTtsDriver::new(config.openai.clone(), out_dir)),
    }
}
