//! ElevenLabs: HTTP streaming for complete text, WebSocket for input streaming.
//!
//! The input-streaming protocol opens with a single-space "beginning of
//! stream" message carrying the generation config, sends each fragment with
//! `try_trigger_generation`, and ends with an empty text message. The server
//! answers with JSON frames holding base64 audio and closes the socket once
//! the utterance is complete.

use std::fmt::Display;
use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use latency::{LatencyRecord, Mode};
use llm::TextStream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info};

use crate::audio::{drain_audio, AudioWriter};
use crate::config::{endpoint, ElevenLabsConfig};
use crate::{Result, SynthesisDriver, SynthesisInput, TTSError, Vendor};

#[derive(Serialize)]
struct GenerationConfig {
    chunk_length_schedule: [u32; 1],
}

#[derive(Serialize)]
struct TextChunk<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    try_trigger_generation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> TextChunk<'a> {
    fn begin() -> Self {
        Self {
            text: " ",
            try_trigger_generation: Some(true),
            generation_config: Some(GenerationConfig {
                chunk_length_schedule: [50],
            }),
        }
    }

    fn fragment(text: &'a str) -> Self {
        Self {
            text,
            try_trigger_generation: Some(true),
            generation_config: None,
        }
    }

    fn end() -> Self {
        Self {
            text: "",
            try_trigger_generation: None,
            generation_config: None,
        }
    }

    fn message(&self) -> Result<Message> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }
}

#[derive(Deserialize)]
struct AudioFrame {
    audio: Option<String>,
}

/// What one input-streaming exchange observed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Exchange {
    /// When each fragment finished sending, in order.
    pub sent: Vec<Instant>,
    /// When the first frame carrying audio arrived.
    pub first_audio_at: Option<Instant>,
    pub audio_bytes: u64,
}

fn connection_error(reason: impl Display) -> TTSError {
    TTSError::Connection {
        vendor: Vendor::ElevenLabs,
        reason: reason.to_string(),
    }
}

fn is_clean_close(frame: &Option<CloseFrame<'_>>) -> bool {
    match frame {
        None => true,
        Some(frame) => matches!(frame.code, CloseCode::Normal | CloseCode::Away),
    }
}

async fn send_text_chunks<Tx>(mut fragments: TextStream, mut tx: Tx) -> Result<Vec<Instant>>
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    debug!("Starting to send text chunks to websocket...");
    let mut sent = Vec::new();
    while let Some(text) = fragments.next().await {
        tx.send(TextChunk::fragment(&text).message()?)
            .await
            .map_err(connection_error)?;
        sent.push(Instant::now());
        debug!("Sent {text:?} to websocket");
    }
    tx.send(TextChunk::end().message()?)
        .await
        .map_err(connection_error)?;
    debug!("All text chunks sent to websocket, EOS message sent");
    Ok(sent)
}

async fn receive_audio<Rx, W>(mut rx: Rx, out: &mut AudioWriter<W>) -> Result<Option<Instant>>
where
    Rx: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut first_audio_at = None;
    loop {
        let msg = match rx.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return Err(connection_error(e)),
            None => return Err(connection_error("stream ended without a close frame")),
        };
        match msg {
            Message::Text(text) => {
                let frame: AudioFrame = serde_json::from_str(&text)?;
                let Some(audio) = frame.audio.filter(|a| !a.is_empty()) else {
                    continue;
                };
                debug!("Audio data received");
                if first_audio_at.is_none() {
                    first_audio_at = Some(Instant::now());
                }
                out.write(&general_purpose::STANDARD.decode(audio)?).await?;
            }
            Message::Close(frame) if is_clean_close(&frame) => {
                debug!("WebSocket connection closed");
                return Ok(first_audio_at);
            }
            Message::Close(frame) => {
                let reason = frame
                    .map(|f| format!("close code {}: {}", u16::from(f.code), f.reason))
                    .unwrap_or_default();
                return Err(connection_error(reason));
            }
            _ => {}
        }
    }
}

/// Drive one input-streaming exchange over an already open channel.
///
/// The beginning-of-stream message goes out first; then fragments are sent
/// while audio frames are received. Both halves run concurrently on the
/// calling task and both have finished (or the first error has cancelled
/// the other) when this returns.
pub async fn exchange<Tx, Rx, W>(
    fragments: TextStream,
    mut tx: Tx,
    rx: Rx,
    out: &mut AudioWriter<W>,
) -> Result<Exchange>
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    tx.send(TextChunk::begin().message()?)
        .await
        .map_err(connection_error)?;
    debug!("BOS message sent");
    let before = out.written();
    let (sent, first_audio_at) = tokio::try_join!(
        send_text_chunks(fragments, tx),
        receive_audio(rx, &mut *out)
    )?;
    Ok(Exchange {
        sent,
        first_audio_at,
        audio_bytes: out.written() - before,
    })
}

pub struct ElevenLabsDriver {
    config: ElevenLabsConfig,
    http: Client,
    out_dir: PathBuf,
}

impl ElevenLabsDriver {
    pub fn new(config: ElevenLabsConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            http: Client::new(),
            out_dir: out_dir.into(),
        }
    }

    fn stream_endpoint(&self) -> String {
        endpoint(
            &self.config.api_url,
            &format!("/v1/text-to-speech/{}/stream", self.config.voice_id),
        )
    }

    fn websocket_endpoint(&self) -> String {
        endpoint(
            &self.config.ws_url,
            &format!(
                "/v1/text-to-speech/{}/stream-input?model_id={}",
                self.config.voice_id, self.config.model_id
            ),
        )
    }

    fn output_path(&self) -> PathBuf {
        self.out_dir.join(Vendor::ElevenLabs.audio_file_name())
    }

    async fn create_speech(&self, text: &str) -> Result<LatencyRecord> {
        #[derive(Serialize)]
        struct StreamRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let mut record = LatencyRecord::new(Mode::FullStreaming);
        let body = StreamRequest {
            text,
            model_id: &self.config.model_id,
        };
        let start = Instant::now();
        let resp = self
            .http
            .post(self.stream_endpoint())
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let stream_generation_time = start.elapsed();
        if !resp.status().is_success() {
            return Err(TTSError::Synthesis {
                vendor: Vendor::ElevenLabs,
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        record.set_connection_time(stream_generation_time);
        debug!("Stream generation time: {stream_generation_time:.2?}");

        let mut out = AudioWriter::create(self.output_path()).await?;
        let drained = drain_audio(Box::pin(resp.bytes_stream()), &mut out).await?;
        out.finish().await?;
        if let Some(first) = drained.first_chunk {
            record.set_first_chunk_time(first);
            debug!("Time to first audio byte: {first:.2?}");
        }
        record.set_total_time(start.elapsed());
        info!("Audio chunks written to file");
        Ok(record)
    }

    async fn create_live_speech(&self, fragments: TextStream) -> Result<LatencyRecord> {
        let mut record = LatencyRecord::new(Mode::InputStreaming);
        let mut request = self.websocket_endpoint().into_client_request()?;
        let key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|e| TTSError::Credential(e.to_string()))?;
        request.headers_mut().insert("xi-api-key", key);

        let start = Instant::now();
        let (socket, _) = match tokio_tungstenite::connect_async(request).await {
            Ok(conn) => conn,
            Err(WsError::Http(resp)) => {
                return Err(TTSError::Synthesis {
                    vendor: Vendor::ElevenLabs,
                    status: resp.status().as_u16(),
                    body: resp
                        .body()
                        .as_deref()
                        .map(|b| String::from_utf8_lossy(b).into_owned())
                        .unwrap_or_default(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let stream_generation_time = start.elapsed();
        record.set_connection_time(stream_generation_time);
        debug!("WebSocket connection established in {stream_generation_time:.2?}");

        let (tx, rx) = socket.split();
        let mut out = AudioWriter::create(self.output_path()).await?;
        let exchange = exchange(fragments, tx, rx, &mut out).await?;
        out.finish().await?;

        for at in exchange.sent {
            record.record_text_sent(at);
        }
        if let Some(at) = exchange.first_audio_at {
            record.set_first_audio_at(at);
        }
        record.set_total_time(start.elapsed());
        if let Some(ttfb) = record.time_to_first_audio() {
            debug!("Time to first audio byte: {ttfb:.2?}");
        }
        info!("Audio chunks written to file");
        Ok(record)
    }
}

#[async_trait]
impl SynthesisDriver for ElevenLabsDriver {
    fn vendor(&self) -> Vendor {
        Vendor::ElevenLabs
    }

    fn supports(&self, _mode: Mode) -> bool {
        true
    }

    async fn run(&self, input: SynthesisInput, mode: Mode) -> Result<LatencyRecord> {
        match mode {
            Mode::FullStreaming => {
                let text = input.into_text(mode)?;
                self.create_speech(&text).await
            }
            Mode::InputStreaming => self.create_live_speech(input.into_stream()).await,
        }
    }
}
