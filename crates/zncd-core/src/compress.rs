//! Resumable deflate compression: startup → feed (any number of chunks) → finish.
//!
//! A [`CompressionSession`] owns at most one in-flight zlib stream. Each `feed`
//! drains the codec through a bounded window and then sync-flushes, so the bytes
//! for every chunk are observable before the stream is closed. Retention decides
//! whether drained bytes are kept or only counted.

use crate::buffer::ByteBuffer;
use crate::config::{CompressConfig, DRAIN_WINDOW, MIN_WINDOW};
use crate::error::{NcdError, Result};
use crate::SessionPhase;
use bytes::Bytes;
use flate2::{Compress, Compression, FlushCompress, Status};
use tracing::{debug, error};

const SESSION: &str = "compression";

/// Outcome of a finished compression stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedStream {
    /// Total compressed bytes the codec produced
    pub total_out: u64,
    /// The compressed bytes not already handed out by
    /// [`CompressionSession::take_output`]; `Some` only when retention was on
    pub data: Option<Bytes>,
}

impl FinishedStream {
    /// Byte count of the stream: the returned length, else the running total.
    pub fn len(&self) -> u64 {
        match &self.data {
            Some(data) => data.len() as u64,
            None => self.total_out,
        }
    }

    /// True if the codec produced nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Codec state that only exists between startup and finish.
struct ActiveStream {
    codec: Compress,
    retained: Option<ByteBuffer>,
}

impl ActiveStream {
    /// One drain pass. Returns (input consumed, output produced, codec status).
    fn drain_pass(
        &mut self,
        input: &[u8],
        window: &mut [u8],
        flush: FlushCompress,
    ) -> Result<(usize, usize, Status)> {
        let before_in = self.codec.total_in();
        let before_out = self.codec.total_out();
        let status = self
            .codec
            .compress(input, window, flush)
            .map_err(|e| NcdError::CompressionFailed(e.to_string()))?;
        let consumed = (self.codec.total_in() - before_in) as usize;
        let produced = (self.codec.total_out() - before_out) as usize;
        if let Some(buf) = self.retained.as_mut() {
            buf.append(&window[..produced]);
        }
        Ok((consumed, produced, status))
    }

    /// Push a whole chunk through the codec, then sync-flush it out.
    fn drain_chunk(&mut self, chunk: &[u8], window: &mut [u8]) -> Result<()> {
        let mut offset = 0;
        loop {
            let (consumed, produced, _) =
                self.drain_pass(&chunk[offset..], window, FlushCompress::None)?;
            offset += consumed;
            // a full window means the codec may still be holding output
            if offset == chunk.len() && produced < window.len() {
                break;
            }
            if consumed == 0 && produced == 0 {
                return Err(NcdError::CompressionFailed(
                    "deflate made no progress on pending input".to_string(),
                ));
            }
        }
        loop {
            let (_, produced, _) = self.drain_pass(&[], window, FlushCompress::Sync)?;
            if produced < window.len() {
                return Ok(());
            }
        }
    }

    /// Drain in finish mode until the codec reports stream end.
    fn drain_finish(&mut self, window: &mut [u8]) -> Result<()> {
        loop {
            let (_, produced, status) = self.drain_pass(&[], window, FlushCompress::Finish)?;
            if status == Status::StreamEnd {
                return Ok(());
            }
            if produced == 0 {
                return Err(NcdError::CompressionFailed(
                    "deflate stalled before stream end".to_string(),
                ));
            }
        }
    }
}

/// A single resumable zlib compression stream.
///
/// The session is reusable: after `finish` (or any failure) it is Idle again and
/// accepts a new `startup`. Dropping an Active session releases the codec.
pub struct CompressionSession {
    config: CompressConfig,
    stream: Option<ActiveStream>,
    window: Box<[u8]>,
}

impl Default for CompressionSession {
    fn default() -> Self {
        Self::new(CompressConfig::default())
    }
}

impl CompressionSession {
    /// Create an idle session with the default drain window.
    pub fn new(config: CompressConfig) -> Self {
        Self::with_window(config, DRAIN_WINDOW)
    }

    /// Create an idle session draining through a window of `window_size` bytes
    /// (zero selects [`DRAIN_WINDOW`], anything else is raised to at least [`MIN_WINDOW`]).
    pub fn with_window(config: CompressConfig, window_size: usize) -> Self {
        let size = if window_size == 0 {
            DRAIN_WINDOW
        } else {
            window_size.max(MIN_WINDOW)
        };
        Self {
            config,
            stream: None,
            window: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        if self.stream.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Idle
        }
    }

    /// Settings applied at the next startup.
    pub fn config(&self) -> &CompressConfig {
        &self.config
    }

    /// Choose whether the next stream keeps its bytes or only counts them.
    pub fn set_retain_output(&mut self, retain: bool) {
        self.config.retain_output = retain;
    }

    /// Default level for the next startup; out-of-range values fall back to 6.
    pub fn set_level(&mut self, level: u32) {
        self.config = CompressConfig {
            retain_output: self.config.retain_output,
            ..CompressConfig::with_level(level)
        };
    }

    /// Compressed bytes produced so far by the active stream (0 when Idle).
    pub fn total_out(&self) -> u64 {
        self.stream.as_ref().map_or(0, |s| s.codec.total_out())
    }

    /// Remove and return the bytes retained so far, so a caller can write out a
    /// growing stream without waiting for `finish`. `None` when Idle or not retaining.
    pub fn take_output(&mut self) -> Option<Bytes> {
        self.stream
            .as_mut()
            .and_then(|s| s.retained.as_mut())
            .map(ByteBuffer::take)
    }

    /// Begin a new stream. `level_hint` outside 1..=9 selects the configured level.
    ///
    /// Starting while Active is misuse: the in-flight stream is discarded and the
    /// session is left Idle.
    pub fn startup(&mut self, level_hint: Option<u32>) -> Result<u64> {
        if self.stream.take().is_some() {
            error!("startup on busy compression session, discarding active stream");
            return Err(NcdError::SessionBusy { session: SESSION });
        }
        let level = self.config.effective_level(level_hint);
        let retained = self.config.retain_output.then(ByteBuffer::new);
        self.stream = Some(ActiveStream {
            codec: Compress::new(Compression::new(level), true),
            retained,
        });
        debug!(level, retain = self.config.retain_output, "compression stream started");
        Ok(0)
    }

    /// Feed one non-empty chunk. Returns the running total of compressed bytes.
    ///
    /// A codec failure ends the stream and discards anything retained.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<u64> {
        let Some(stream) = self.stream.as_mut() else {
            error!("feed on idle compression session");
            return Err(NcdError::SessionIdle {
                session: SESSION,
                op: "feed",
            });
        };
        if chunk.is_empty() {
            return Err(NcdError::InvalidArgument("empty chunk".to_string()));
        }
        match stream.drain_chunk(chunk, &mut self.window) {
            Ok(()) => {
                let total = stream.codec.total_out();
                debug!(chunk = chunk.len(), total_out = total, "chunk compressed");
                Ok(total)
            }
            Err(e) => {
                error!(error = %e, "deflate failure, resetting compression session");
                self.stream = None;
                Err(e)
            }
        }
    }

    /// Close the stream. The session is Idle afterwards whether or not this succeeds.
    pub fn finish(&mut self) -> Result<FinishedStream> {
        let Some(mut stream) = self.stream.take() else {
            error!("finish on idle compression session");
            return Err(NcdError::SessionIdle {
                session: SESSION,
                op: "finish",
            });
        };
        if let Err(e) = stream.drain_finish(&mut self.window) {
            error!(error = %e, "deflate failure during finish");
            return Err(e);
        }
        let finished = FinishedStream {
            total_out: stream.codec.total_out(),
            data: stream.retained.map(ByteBuffer::freeze),
        };
        debug!(total_out = finished.total_out, "compression stream finished");
        Ok(finished)
    }

    /// Abandon any active stream without producing output.
    pub fn abort(&mut self) {
        if self.stream.take().is_some() {
            debug!("compression stream aborted");
        }
    }

    /// Compress `input` as one unit: startup, feed, finish.
    ///
    /// Retention follows `want_output` and stays that way for later streams.
    pub fn compress_all(&mut self, input: &[u8], want_output: bool) -> Result<FinishedStream> {
        self.set_retain_output(want_output);
        self.startup(None)?;
        if !input.is_empty() {
            self.feed(input)?;
        }
        self.finish()
    }
}

/// Compress `input` to a complete zlib stream at `level`.
pub fn compress(input: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut session = CompressionSession::new(CompressConfig::with_level(level));
    let finished = session.compress_all(input, true)?;
    Ok(finished.data.map(|d| d.to_vec()).unwrap_or_default())
}
