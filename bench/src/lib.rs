//! Command-line harness comparing text-to-speech vendor latency.

pub mod cli;
pub mod logging;
pub mod scenario;

pub use cli::{Cli, Command, RunArgs, Source, VendorArg};
pub use logging::init_logging;
pub use scenario::{default_metrics, report, Bench};
