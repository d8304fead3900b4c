//! Paced replay of a fixed list of text fragments.
//!
//! [`PacedTokens`] emulates an upstream generator that emits one fragment at
//! a time with a fixed delay in between. Both the blocking
//! [`PacedTokens::iter`] and the async [`PacedTokens::stream`] start from the
//! first fragment on every call, so one source can feed any number of trials.

use std::pin::Pin;
use std::time::Duration;

use futures_core::Stream;

/// Stream of text fragments consumed by the input-streaming drivers.
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Delay between fragments used by the benchmark scripts.
pub const TOKEN_OUTPUT_LATENCY: Duration = Duration::from_millis(10);

const GREETING: [&str; 8] = ["Hello ", "sir, ", "what ", "can ", "I ", "do ", "for ", "you?"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacedTokens {
    fragments: Vec<String>,
    delay: Duration,
}

impl PacedTokens {
    pub fn new<I, S>(fragments: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            delay,
        }
    }

    /// "Hello sir, what can I do for you?" split into words.
    pub fn greeting(delay: Duration) -> Self {
        Self::new(GREETING, delay)
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The fragments joined back into one string.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    /// Blocking iterator that sleeps for the delay before every fragment after
    /// the first, and once more before reporting the end.
    pub fn iter(&self) -> PacedIter {
        PacedIter {
            fragments: self.fragments.clone().into_iter(),
            delay: self.delay,
            started: false,
            finished: false,
        }
    }

    /// Async equivalent of [`PacedTokens::iter`] that yields to the scheduler
    /// instead of blocking the thread.
    pub fn stream(&self) -> TextStream {
        let fragments = self.fragments.clone();
        let delay = self.delay;
        Box::pin(async_stream::stream! {
            for (i, fragment) in fragments.into_iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(delay).await;
                }
                yield fragment;
            }
            tokio::time::sleep(delay).await;
        })
    }
}

pub struct PacedIter {
    fragments: std::vec::IntoIter<String>,
    delay: Duration,
    started: bool,
    finished: bool,
}

impl Iterator for PacedIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        if self.started {
            std::thread::sleep(self.delay);
        }
        self.started = true;
        let next = self.fragments.next();
        self.finished = next.is_none();
        next
    }
}
