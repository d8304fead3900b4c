use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset: phase timings from the vendor and
/// LLM crates, averages and trial progress from everything else.
pub const DEFAULT_FILTER: &str = "info,tts=debug,llm=debug";

/// Initialize logging to stdout.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).with_target(true).init();
}
