//! HTTP client for the OpenAI chat completions API.
//!
//! [`OpenAIClient`] implements [`LLMClient`]. Streaming responses arrive as
//! server-sent events; each `data:` line carries one JSON chunk whose
//! `choices[0].delta.content` is the next piece of text.

use crate::traits::{DeltaStream, LLMClient, LLMError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

/// Connection settings for the chat completions endpoint.
#[derive(Clone, Debug)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL without the `/v1/...` path.
    pub base_url: String,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Read `OPENAI_API_KEY` and `OPENAI_API_URL`. A missing key is left empty
    /// and rejected by the server on first use.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into()),
        }
    }
}

pub struct OpenAIClient {
    config: OpenAIConfig,
    http: Client,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn post(
        &self,
        model: &str,
        prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, LLMError> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: [Message<'a>; 1],
            stream: bool,
        }

        let body = ChatRequest {
            model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            stream,
        };
        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LLMError::Status { status, body });
        }
        Ok(resp)
    }
}

#[derive(Debug, PartialEq)]
enum SseData {
    Delta(String),
    Done,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Interpret one SSE line. Comments, other fields, and empty deltas yield `None`.
fn parse_sse_line(line: &str) -> Result<Option<SseData>, LLMError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(Some(SseData::Done));
    }
    let chunk: ChatChunk = serde_json::from_str(data)?;
    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|t| !t.is_empty());
    Ok(text.map(SseData::Delta))
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn stream_chat(&self, model: &str, prompt: &str) -> Result<DeltaStream, LLMError> {
        let resp = self.post(model, prompt, true).await?;
        let s = async_stream::stream! {
            let mut body = Box::pin(resp.bytes_stream());
            let mut buf: Vec<u8> = Vec::new();
            'read: while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(LLMError::from(e));
                        break;
                    }
                };
                buf.extend_from_slice(&chunk);
                while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                    let raw: Vec<u8> = buf.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&raw);
                    match parse_sse_line(line.trim_end()) {
                        Ok(Some(SseData::Done)) => break 'read,
                        Ok(Some(SseData::Delta(text))) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }
            }
        };
        Ok(Box::pin(s))
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LLMError> {
        #[derive(Deserialize)]
        struct Completion {
            choices: Vec<CompletionChoice>,
        }

        #[derive(Deserialize)]
        struct CompletionChoice {
            message: CompletionMessage,
        }

        #[derive(Deserialize)]
        struct CompletionMessage {
            content: Option<String>,
        }

        let resp = self.post(model, prompt, false).await?;
        let completion: Completion = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LLMError::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delta_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(
            parse_sse_line(line).unwrap(),
            Some(SseData::Delta("Hello".into()))
        );
    }

    #[test]
    fn skips_role_only_delta() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), None);
    }

    #[test]
    fn recognizes_done_and_ignores_comments() {
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), Some(SseData::Done));
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), None);
        assert_eq!(parse_sse_line("").unwrap(), None);
    }
}
