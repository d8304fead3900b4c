//! Text sources feeding the input-streaming benchmarks.
//!
//! The `llm` crate defines a [`LLMClient`] trait with an [`OpenAIClient`]
//! implementation that streams chat completion deltas, and [`PacedTokens`],
//! a fixed word list replayed with a synthetic delay between fragments to
//! emulate a live generator.

pub mod client;
pub mod runner;
pub mod tokens;
pub mod traits;

pub use client::{OpenAIClient, OpenAIConfig};
pub use runner::{
    client_from_env, complete_from_env, model_from_env, timed_deltas, FeedOutcome, GPT_PROMPT,
};
pub use tokens::{PacedIter, PacedTokens, TextStream, TOKEN_OUTPUT_LATENCY};
pub use traits::{LLMClient, LLMError};
