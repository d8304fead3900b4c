//! The benchmark scenarios behind each subcommand.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use latency::{LatencyRecord, Metric, Mode, TrialRunner, TrialSequence};
use llm::{LLMClient, OpenAIClient, PacedTokens};
use tracing::{info, warn};
use tokio_stream::StreamExt;
use tts::{driver_for, SynthesisDriver, SynthesisInput, Vendor, VendorConfig};

use crate::cli::{RunArgs, Source};

/// Metrics each vendor reports for `mode` when none are requested.
pub fn default_metrics(vendor: Vendor, mode: Mode) -> &'static [Metric] {
    match (vendor, mode) {
        (Vendor::PlayHt, _) => &[
            Metric::ConnectionTime,
            Metric::HeaderTime,
            Metric::FirstChunkTime,
            Metric::TotalTime,
        ],
        (_, Mode::FullStreaming) => &[
            Metric::ConnectionTime,
            Metric::FirstChunkTime,
            Metric::TotalTime,
        ],
        (_, Mode::InputStreaming) => &[
            Metric::ConnectionTime,
            Metric::TimeToFirstAudio,
            Metric::TimeFromFirstText,
            Metric::TotalTime,
        ],
    }
}

/// Shared state for one invocation of the binary.
pub struct Bench {
    args: RunArgs,
    config: VendorConfig,
}

impl Bench {
    pub fn new(args: RunArgs, config: VendorConfig) -> Self {
        Self { args, config }
    }

    fn runner(&self) -> TrialRunner {
        let runner = TrialRunner::new(self.args.trials).fail_fast(self.args.fail_fast);
        match self.args.deadline() {
            Some(deadline) => runner.with_deadline(deadline),
            None => runner,
        }
    }

    fn metrics(&self, vendor: Vendor, mode: Mode) -> Vec<Metric> {
        if self.args.metrics.is_empty() {
            default_metrics(vendor, mode).to_vec()
        } else {
            self.args.metrics.clone()
        }
    }

    /// Reject vendor/mode pairs before any call is made.
    pub fn check_supported(&self, vendors: &[Vendor], mode: Mode) -> Result<()> {
        for vendor in vendors {
            let driver = driver_for(*vendor, &self.config, &self.args.out_dir);
            if !driver.supports(mode) {
                bail!("{vendor} does not support {mode}");
            }
        }
        Ok(())
    }

    /// Full streaming: every vendor synthesizes the same complete `text`.
    pub async fn streaming(&self, vendors: &[Vendor], text: &str) -> Result<()> {
        self.check_supported(vendors, Mode::FullStreaming)?;
        for vendor in vendors {
            let driver = driver_for(*vendor, &self.config, &self.args.out_dir);
            let label = format!("{vendor} {}", Mode::FullStreaming);
            let sequence = self
                .runner()
                .run(&label, |_| driver.run(SynthesisInput::from(text), Mode::FullStreaming))
                .await?;
            report(&sequence, &self.metrics(*vendor, Mode::FullStreaming));
        }
        Ok(())
    }

    /// Input streaming: fragments are produced while the vendor is already
    /// synthesizing.
    pub async fn input_streaming(
        &self,
        vendors: &[Vendor],
        source: Source,
        token_delay: Duration,
    ) -> Result<()> {
        self.check_supported(vendors, Mode::InputStreaming)?;
        let tokens = PacedTokens::greeting(token_delay);
        let chat = llm::client_from_env();
        let model = llm::model_from_env();
        for vendor in vendors {
            let driver = driver_for(*vendor, &self.config, &self.args.out_dir);
            let label = format!("{vendor} {} ({source:?})", Mode::InputStreaming);
            let sequence = self
                .runner()
                .run(&label, |_| {
                    input_streaming_trial(driver.as_ref(), source, &tokens, &chat, &model)
                })
                .await?;
            report(&sequence, &self.metrics(*vendor, Mode::InputStreaming));
        }
        Ok(())
    }
}

async fn input_streaming_trial<C: LLMClient + ?Sized>(
    driver: &dyn SynthesisDriver,
    source: Source,
    tokens: &PacedTokens,
    chat: &C,
    model: &str,
) -> Result<LatencyRecord> {
    let (input, feed) = match source {
        // PlayHT consumes a blocking generator; ElevenLabs an async one.
        Source::Words if driver.vendor() == Vendor::PlayHt => {
            (SynthesisInput::Blocking(Box::new(tokens.iter())), None)
        }
        Source::Words => (SynthesisInput::Fragments(tokens.stream()), None),
        Source::Gpt => {
            let (text, feed) = llm::timed_deltas(chat, model, llm::GPT_PROMPT).await?;
            (SynthesisInput::Fragments(text), Some(feed))
        }
    };
    let record = driver.run(input, Mode::InputStreaming).await?;
    // A feed that broke off produced a truncated utterance.
    if let Some(feed) = feed {
        feed.check()?;
    }
    Ok(record)
}

/// Stream a single chat completion, letting [`llm::timed_deltas`] log its
/// timings, and return the assembled text.
pub async fn gpt<C: LLMClient + ?Sized>(client: &C, model: &str, prompt: &str) -> Result<String> {
    let (mut deltas, feed) = llm::timed_deltas(client, model, prompt)
        .await
        .map_err(|e| anyhow!("chat stream failed: {e}"))?;
    let mut text = String::new();
    while let Some(delta) = deltas.next().await {
        text.push_str(&delta);
    }
    feed.check().map_err(|e| anyhow!("chat stream broke off: {e}"))?;
    Ok(text)
}

/// Log the average of each metric over the successful trials.
pub fn report(sequence: &TrialSequence, metrics: &[Metric]) {
    info!(
        "{}: {} of {} trials succeeded",
        sequence.label,
        sequence.records.len(),
        sequence.attempted()
    );
    for (metric, average) in sequence.summarize(metrics) {
        match average {
            Ok(value) => info!("{}: average {metric}: {value:.2?}", sequence.label),
            Err(e) => warn!("{}: no average {metric}: {e}", sequence.label),
        }
    }
}
