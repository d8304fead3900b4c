//! Incremental audio output and first-chunk timing.

use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_stream::{Stream, StreamExt};

use crate::{Result, TTSError};

/// Writes audio chunks in arrival order and counts the bytes.
pub struct AudioWriter<W> {
    inner: W,
    written: u64,
}

impl AudioWriter<File> {
    /// Create (or truncate) the file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).await?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin> AudioWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.inner.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and hand back the writer.
    pub async fn finish(mut self) -> Result<W> {
        self.inner.flush().await?;
        Ok(self.inner)
    }
}

/// Captures the delay until the first chunk and ignores every later one.
#[derive(Debug)]
pub struct FirstChunkTimer {
    started: Instant,
    first: Option<Duration>,
}

impl FirstChunkTimer {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            first: None,
        }
    }

    /// Note a chunk arriving now. Returns `true` only for the first one.
    pub fn observe(&mut self) -> bool {
        if self.first.is_some() {
            return false;
        }
        self.first = Some(self.started.elapsed());
        true
    }

    pub fn first_chunk(&self) -> Option<Duration> {
        self.first
    }
}

/// Outcome of draining an audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    /// Delay from the start of iteration to the first chunk.
    pub first_chunk: Option<Duration>,
    pub chunks: usize,
    pub bytes: u64,
}

/// Write every chunk of `stream` to `out`, timing the first one from the
/// moment iteration starts.
pub async fn drain_audio<S, B, E, W>(mut stream: S, out: &mut AudioWriter<W>) -> Result<Drained>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<TTSError>,
    W: AsyncWrite + Unpin,
{
    let mut timer = FirstChunkTimer::start();
    let before = out.written();
    let mut chunks = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return Err(e.into()),
        };
        timer.observe();
        out.write(chunk.as_ref()).await?;
        chunks += 1;
    }
    Ok(Drained {
        first_chunk: timer.first_chunk(),
        chunks,
        bytes: out.written() - before,
    })
}
