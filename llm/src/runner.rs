use crate::client::{OpenAIClient, OpenAIConfig};
use crate::tokens::TextStream;
use crate::traits::{LLMClient, LLMError};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// Prompt used to produce a live token feed.
pub const GPT_PROMPT: &str = "Tell me about life in 30 words.";

/// Create an [`OpenAIClient`] using `OPENAI_API_KEY` and `OPENAI_API_URL`.
pub fn client_from_env() -> OpenAIClient {
    OpenAIClient::new(OpenAIConfig::from_env())
}

/// Read the chat model name from the `OPENAI_CHAT_MODEL` environment variable.
pub fn model_from_env() -> String {
    std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into())
}

/// Reports whether a token feed from [`timed_deltas`] broke off early.
///
/// The feed itself only carries text, so a consumer that reaches the end of
/// it cannot tell a finished response from a dropped connection. Check the
/// outcome once the text has been consumed.
pub struct FeedOutcome(oneshot::Receiver<LLMError>);

impl FeedOutcome {
    /// The error that ended the feed, if any.
    ///
    /// A feed that is still being read, or was dropped unread, counts as
    /// clean.
    pub fn check(mut self) -> Result<(), LLMError> {
        match self.0.try_recv() {
            Ok(e) => Err(e),
            Err(_) => Ok(()),
        }
    }
}

/// Stream `prompt` and hand back only the text, logging how long the stream
/// and its first token took to arrive.
///
/// An error partway through ends the text early and is reported through the
/// returned [`FeedOutcome`].
pub async fn timed_deltas<C: LLMClient + ?Sized>(
    client: &C,
    model: &str,
    prompt: &str,
) -> Result<(TextStream, FeedOutcome), LLMError> {
    let start = Instant::now();
    let mut deltas = client.stream_chat(model, prompt).await?;
    debug!("Received GPT response stream in {:.2?}", start.elapsed());
    let (failed, outcome) = oneshot::channel();
    let s = async_stream::stream! {
        let started = Instant::now();
        let mut first = true;
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) => {
                    if first {
                        debug!("Received first token in {:.2?}", started.elapsed());
                        first = false;
                    }
                    yield text;
                }
                Err(e) => {
                    warn!(%e, "token stream ended early");
                    let _ = failed.send(e);
                    break;
                }
            }
        }
    };
    Ok((Box::pin(s), FeedOutcome(outcome)))
}

/// Request a complete response using environment configuration.
pub async fn complete_from_env(prompt: &str) -> Result<String, LLMError> {
    let client = client_from_env();
    let model = model_from_env();
    let start = Instant::now();
    let text = client.complete(&model, prompt).await?;
    debug!("Received GPT response in {:.2?}", start.elapsed());
    Ok(text)
}
