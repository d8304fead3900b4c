//! OpenAI text-to-speech. Only complete text is accepted.

use std::path::PathBuf;

use async_trait::async_trait;
use latency::{LatencyRecord, Mode};
use reqwest::Client;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::audio::{drain_audio, AudioWriter};
use crate::config::{endpoint, OpenAiTtsConfig};
use crate::{Result, SynthesisDriver, SynthesisInput, TTSError, Vendor};

pub struct OpenAiTtsDriver {
    config: OpenAiTtsConfig,
    http: Client,
    out_dir: PathBuf,
}

impl OpenAiTtsDriver {
    pub fn new(config: OpenAiTtsConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            http: Client::new(),
            out_dir: out_dir.into(),
        }
    }

    async fn create_speech(&self, text: &str) -> Result<LatencyRecord> {
        #[derive(Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            voice: &'a str,
            input: &'a str,
        }

        let mut record = LatencyRecord::new(Mode::FullStreaming);
        let body = SpeechRequest {
            model: &self.config.model,
            voice: &self.config.voice,
            input: text,
        };
        let start = Instant::now();
        let resp = self
            .http
            .post(endpoint(&self.config.api_url, "/v1/audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let stream_generation_time = start.elapsed();
        if !resp.status().is_success() {
            return Err(TTSError::Synthesis {
                vendor: Vendor::OpenAi,
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        record.set_connection_time(stream_generation_time);
        debug!("Stream generation time: {stream_generation_time:.2?}");

        let path = self.out_dir.join(Vendor::OpenAi.audio_file_name());
        let mut out = AudioWriter::create(path).await?;
        let drained = drain_audio(Box::pin(resp.bytes_stream()), &mut out).await?;
        out.finish().await?;
        if let Some(first) = drained.first_chunk {
            record.set_first_chunk_time(first);
            debug!("First chunk generation time: {first:.2?}");
        }
        record.set_total_time(start.elapsed());
        info!("Audio chunks written to file");
        Ok(record)
    }
}

#[async_trait]
impl SynthesisDriver for OpenAiTtsDriver {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAi
    }

    fn supports(&self, mode: Mode) -> bool {
        mode == Mode::FullStreaming
    }

    async fn run(&self, input: SynthesisInput, mode: Mode) -> Result<LatencyRecord> {
        if !self.supports(mode) {
            return Err(TTSError::UnsupportedMode {
                vendor: Vendor::OpenAi,
                mode,
            });
        }
        let text = input.into_text(mode)?;
        self.create_speech(&text).await
    }
}
