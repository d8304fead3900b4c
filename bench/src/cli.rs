use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use latency::Metric;
use tts::Vendor;

/// Default sentence synthesized by the full-streaming benchmark.
pub const DEFAULT_TEXT: &str = "Hello sir, what can I do for you?";

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure text-to-speech vendor latency")]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every benchmark.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Calls per vendor
    #[arg(long, global = true, default_value_t = 10, env = "TTSBENCH_TRIALS")]
    pub trials: usize,

    /// Abort a single call after this many seconds (0 disables the limit)
    #[arg(long, global = true, default_value_t = 60)]
    pub deadline_secs: u64,

    /// Directory receiving each vendor's audio file
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: PathBuf,

    /// Stop at the first failed call
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Report these metrics instead of each vendor's defaults
    #[arg(long, global = true, value_delimiter = ',')]
    pub metrics: Vec<Metric>,
}

impl RunArgs {
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit complete text and time the streamed audio
    Streaming {
        #[arg(
            long = "vendor",
            value_enum,
            default_values_t = [VendorArg::Eleven, VendorArg::Playht, VendorArg::Openai]
        )]
        vendors: Vec<VendorArg>,

        #[arg(long, default_value = DEFAULT_TEXT)]
        text: String,
    },
    /// Send text fragment by fragment while audio streams back
    InputStreaming {
        #[arg(
            long = "vendor",
            value_enum,
            default_values_t = [VendorArg::Eleven, VendorArg::Playht]
        )]
        vendors: Vec<VendorArg>,

        #[arg(long, value_enum, default_value_t = Source::Words)]
        source: Source,

        /// Pause between replayed words
        #[arg(long, default_value_t = 10)]
        token_delay_ms: u64,
    },
    /// Stream one chat completion and log its token timings
    Gpt {
        #[arg(long, default_value = llm::GPT_PROMPT)]
        prompt: String,

        /// Request the whole response at once instead of streaming it
        #[arg(long)]
        complete: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorArg {
    Eleven,
    Playht,
    Openai,
}

impl From<VendorArg> for Vendor {
    fn from(arg: VendorArg) -> Self {
        match arg {
            VendorArg::Eleven => Vendor::ElevenLabs,
            VendorArg::Playht => Vendor::PlayHt,
            VendorArg::Openai => Vendor::OpenAi,
        }
    }
}

/// Where input-streaming fragments come from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// A fixed greeting replayed word by word
    Words,
    /// Live chat completion deltas
    Gpt,
}
