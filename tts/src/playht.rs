//! PlayHT streaming synthesis.
//!
//! [`PlayHtClient`] mirrors the shape of the vendor SDK: calling
//! [`PlayHtClient::synthesize`] or [`PlayHtClient::synthesize_streaming`]
//! returns a lazy [`SpeechStream`] immediately. Polling it issues the
//! request; the first item is a [`SpeechFrame::Header`] describing the
//! response and every following item is audio.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use latency::{LatencyRecord, Mode};
use llm::TextStream;
use reqwest::Client;
use serde::Serialize;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::audio::{drain_audio, AudioWriter};
use crate::config::{endpoint, PlayHtConfig};
use crate::sentence::SentenceBuffer;
use crate::{Result, SynthesisDriver, SynthesisInput, TTSError, Vendor};

/// Response metadata delivered ahead of the audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioHeader {
    pub status: u16,
    pub content_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechFrame {
    Header(AudioHeader),
    Audio(Vec<u8>),
}

pub type SpeechStream = Pin<Box<dyn Stream<Item = Result<SpeechFrame>> + Send>>;

#[derive(Clone)]
pub struct PlayHtClient {
    config: Arc<PlayHtConfig>,
    http: Client,
}

impl PlayHtClient {
    pub fn new(config: PlayHtConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: Client::new(),
        }
    }

    async fn request(&self, text: &str) -> Result<reqwest::Response> {
        #[derive(Serialize)]
        struct TtsRequest<'a> {
            text: &'a str,
            voice: &'a str,
            quality: &'a str,
            output_format: &'a str,
        }

        let body = TtsRequest {
            text,
            voice: &self.config.voice,
            quality: &self.config.quality,
            output_format: "mp3",
        };
        let resp = self
            .http
            .post(endpoint(&self.config.api_url, "/api/v2/tts/stream"))
            .header("AUTHORIZATION", &self.config.api_key)
            .header("X-USER-ID", &self.config.user_id)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(TTSError::Synthesis {
                vendor: Vendor::PlayHt,
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp)
    }

    /// Synthesize complete `text`.
    pub fn synthesize(&self, text: &str) -> SpeechStream {
        let client = self.clone();
        let text = text.to_string();
        Box::pin(async_stream::stream! {
            let resp = match client.request(&text).await {
                Ok(resp) => resp,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            yield Ok(SpeechFrame::Header(header_of(&resp)));
            let mut body = Box::pin(resp.bytes_stream());
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => yield Ok(SpeechFrame::Audio(bytes.to_vec())),
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                }
            }
        })
    }

    /// Synthesize text as it arrives, one sentence per request.
    ///
    /// A single header precedes the audio of all sentences.
    pub fn synthesize_streaming(&self, fragments: TextStream) -> SpeechStream {
        let client = self.clone();
        Box::pin(async_stream::stream! {
            let mut fragments = fragments;
            let mut sentences = SentenceBuffer::new();
            let mut header_sent = false;
            loop {
                let next = fragments.next().await;
                let done = next.is_none();
                let ready = match next {
                    Some(fragment) => sentences.push(&fragment),
                    None => sentences.finish().into_iter().collect(),
                };
                for sentence in ready {
                    debug!("Requesting speech for {sentence:?}");
                    let resp = match client.request(&sentence).await {
                        Ok(resp) => resp,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };
                    if !header_sent {
                        header_sent = true;
                        yield Ok(SpeechFrame::Header(header_of(&resp)));
                    }
                    let mut body = Box::pin(resp.bytes_stream());
                    while let Some(chunk) = body.next().await {
                        match chunk {
                            Ok(bytes) => yield Ok(SpeechFrame::Audio(bytes.to_vec())),
                            Err(e) => {
                                yield Err(e.into());
                                return;
                            }
                        }
                    }
                }
                if done {
                    break;
                }
            }
        })
    }
}

fn header_of(resp: &reqwest::Response) -> AudioHeader {
    AudioHeader {
        status: resp.status().as_u16(),
        content_type: resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

pub struct PlayHtDriver {
    client: PlayHtClient,
    out_dir: PathBuf,
}

impl PlayHtDriver {
    pub fn new(config: PlayHtConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: PlayHtClient::new(config),
            out_dir: out_dir.into(),
        }
    }

    async fn write_audio_chunks_to_file(
        &self,
        mut stream: SpeechStream,
        record: &mut LatencyRecord,
    ) -> Result<()> {
        let header_start = Instant::now();
        let header = match stream.next().await {
            Some(Ok(SpeechFrame::Header(header))) => header,
            Some(Ok(SpeechFrame::Audio(_))) => {
                return Err(TTSError::Connection {
                    vendor: Vendor::PlayHt,
                    reason: "audio arrived before the header".into(),
                })
            }
            Some(Err(e)) => return Err(e),
            None => {
                return Err(TTSError::Connection {
                    vendor: Vendor::PlayHt,
                    reason: "stream ended before the header".into(),
                })
            }
        };
        let header_generation_time = header_start.elapsed();
        record.set_header_time(header_generation_time);
        debug!(
            content_type = ?header.content_type,
            "Header generation time: {header_generation_time:.2?}"
        );

        let audio = stream.filter_map(|frame| match frame {
            Ok(SpeechFrame::Audio(bytes)) => Some(Ok(bytes)),
            Ok(SpeechFrame::Header(_)) => None,
            Err(e) => Some(Err(e)),
        });
        let path = self.out_dir.join(Vendor::PlayHt.audio_file_name());
        let mut out = AudioWriter::create(path).await?;
        let drained = drain_audio(audio, &mut out).await?;
        out.finish().await?;
        if let Some(first) = drained.first_chunk {
            record.set_first_chunk_time(first);
            debug!("First chunk generation time: {first:.2?}");
        }
        info!("Audio chunks written to file");
        Ok(())
    }
}

#[async_trait]
impl SynthesisDriver for PlayHtDriver {
    fn vendor(&self) -> Vendor {
        Vendor::PlayHt
    }

    fn supports(&self, _mode: Mode) -> bool {
        true
    }

    async fn run(&self, input: SynthesisInput, mode: Mode) -> Result<LatencyRecord> {
        let mut record = LatencyRecord::new(mode);
        let start = Instant::now();
        let stream = match mode {
            Mode::FullStreaming => self.client.synthesize(&input.into_text(mode)?),
            Mode::InputStreaming => self.client.synthesize_streaming(input.into_stream()),
        };
        let response_generation_time = start.elapsed();
        record.set_connection_time(response_generation_time);
        debug!("Response generation time: {response_generation_time:.2?}");

        self.write_audio_chunks_to_file(stream, &mut record).await?;
        record.set_total_time(start.elapsed());
        Ok(record)
    }
}
