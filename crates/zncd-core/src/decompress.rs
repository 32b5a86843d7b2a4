//! Pull-style zlib decompression.
//!
//! `start` hands the whole compressed source to a fresh inflate stream and fills
//! the first destination; every later `pull` extracts up to one more destination's
//! worth. A pull that yields 0 bytes ends the stream, so callers loop until 0.

use crate::config::DRAIN_WINDOW;
use crate::error::{NcdError, Result};
use crate::SessionPhase;
use bytes::Bytes;
use flate2::{Decompress, FlushDecompress, Status};
use tracing::{debug, error, warn};

const SESSION: &str = "decompression";

/// How a [`DecompressionSession::pull`] call should treat the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullMode {
    /// Keep extracting; more work may be pending
    #[default]
    Continue,
    /// Extract in finish mode; no further input will arrive
    Finish,
    /// Abandon the stream now and release it, regardless of unread data
    Abort,
}

struct ActiveInflate {
    codec: Decompress,
    source: Bytes,
    consumed: usize,
    done: bool,
}

/// A single pull-driven zlib decompression stream.
#[derive(Default)]
pub struct DecompressionSession {
    stream: Option<ActiveInflate>,
    reached_end: bool,
}

impl DecompressionSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        if self.stream.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Idle
        }
    }

    /// Whether the most recent stream produced its end-of-stream marker.
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Start a stream over `source` and extract the first bytes into `dest`.
    ///
    /// A stream still in flight is logged and replaced.
    pub fn start(&mut self, source: impl Into<Bytes>, dest: &mut [u8]) -> Result<usize> {
        let source = source.into();
        if dest.is_empty() {
            self.teardown();
            return Err(NcdError::InvalidArgument("empty destination".to_string()));
        }
        if source.is_empty() {
            self.teardown();
            return Err(NcdError::InvalidArgument("empty source".to_string()));
        }
        if self.stream.take().is_some() {
            warn!("start on busy decompression session, restarting");
        }
        self.reached_end = false;
        self.stream = Some(ActiveInflate {
            codec: Decompress::new(true),
            source,
            consumed: 0,
            done: false,
        });
        debug!("decompression stream started");
        self.pull(dest, PullMode::Continue)
    }

    /// Extract up to `dest.len()` more bytes. Returns the number written.
    pub fn pull(&mut self, dest: &mut [u8], mode: PullMode) -> Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            error!("pull on idle decompression session");
            return Err(NcdError::SessionIdle {
                session: SESSION,
                op: "pull",
            });
        };
        let flush = match mode {
            PullMode::Abort => {
                self.abort();
                return Ok(0);
            }
            PullMode::Continue => FlushDecompress::Sync,
            PullMode::Finish => FlushDecompress::Finish,
        };
        if dest.is_empty() {
            self.teardown();
            return Err(NcdError::InvalidArgument("empty destination".to_string()));
        }
        if stream.done {
            self.teardown();
            return Ok(0);
        }

        let before_in = stream.codec.total_in();
        let before_out = stream.codec.total_out();
        let status = match stream
            .codec
            .decompress(&stream.source[stream.consumed..], dest, flush)
        {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "inflate failure, resetting decompression session");
                self.stream = None;
                return Err(NcdError::DecompressionFailed(e.to_string()));
            }
        };
        stream.consumed += (stream.codec.total_in() - before_in) as usize;
        let written = (stream.codec.total_out() - before_out) as usize;
        if status == Status::StreamEnd {
            stream.done = true;
            self.reached_end = true;
        }
        if written == 0 {
            self.teardown();
        }
        Ok(written)
    }

    /// Release the stream immediately; unread output is dropped.
    pub fn abort(&mut self) {
        if self.stream.take().is_some() {
            debug!("decompression stream aborted");
        }
    }

    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!(
                total_in = stream.codec.total_in(),
                total_out = stream.codec.total_out(),
                "decompression stream finished"
            );
        }
    }
}

/// Decompress a complete zlib stream into a freshly allocated buffer.
pub fn decompress_all(source: &[u8]) -> Result<Vec<u8>> {
    if source.is_empty() {
        return Err(NcdError::InvalidArgument("empty source".to_string()));
    }
    let initial = source.len().saturating_mul(4).clamp(64, DRAIN_WINDOW);
    let mut out = vec![0u8; initial];
    let mut session = DecompressionSession::new();
    let mut filled = session.start(Bytes::copy_from_slice(source), &mut out)?;
    while session.phase() == SessionPhase::Active {
        if filled == out.len() {
            out.resize(out.len() * 2, 0);
        }
        filled += session.pull(&mut out[filled..], PullMode::Continue)?;
    }
    if !session.reached_end() {
        return Err(NcdError::TruncatedStream);
    }
    out.truncate(filled);
    out.shrink_to_fit();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress;
    use proptest::prelude::*;

    fn sample() -> Vec<u8> {
        (0..20_000u32)
            .flat_map(|i| format!("line {} of {}\n", i % 97, i % 13).into_bytes())
            .collect()
    }

    #[test]
    fn test_decompress_all_roundtrip() {
        let data = sample();
        let packed = compress(&data, 6).unwrap();
        assert_eq!(decompress_all(&packed).unwrap(), data);
    }

    #[test]
    fn test_decompress_all_empty_payload() {
        let packed = compress(&[], 9).unwrap();
        assert!(decompress_all(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_tiny_destination_pulls_everything() {
        let data = sample();
        let packed = compress(&data, 9).unwrap();
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 7];
        let mut out = Vec::new();
        let mut n = session.start(packed, &mut dest).unwrap();
        while n > 0 {
            out.extend_from_slice(&dest[..n]);
            n = session.pull(&mut dest, PullMode::Continue).unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.reached_end());
        assert_eq!(out, data);
    }

    #[test]
    fn test_finish_mode_pulls_remaining() {
        let data = sample();
        let packed = compress(&data, 6).unwrap();
        let mut session = DecompressionSession::new();
        let mut dest = vec![0u8; 4096];
        let mut out = Vec::new();
        let n = session.start(packed, &mut dest).unwrap();
        out.extend_from_slice(&dest[..n]);
        loop {
            let n = session.pull(&mut dest, PullMode::Finish).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&dest[..n]);
        }
        assert_eq!(out, data);
    }

    #[test]
    fn test_abort_midstream_releases() {
        let packed = compress(&sample(), 6).unwrap();
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 16];
        assert_eq!(session.start(packed, &mut dest).unwrap(), 16);
        assert_eq!(session.pull(&mut dest, PullMode::Abort).unwrap(), 0);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(!session.reached_end());
        let err = session.pull(&mut dest, PullMode::Continue).unwrap_err();
        assert!(matches!(err, NcdError::SessionIdle { .. }));
    }

    #[test]
    fn test_pull_while_idle_rejected() {
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 8];
        let err = session.pull(&mut dest, PullMode::Finish).unwrap_err();
        assert!(matches!(err, NcdError::SessionIdle { op: "pull", .. }));
    }

    #[test]
    fn test_empty_destination_tears_down() {
        let packed = compress(&sample(), 6).unwrap();
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 8];
        session.start(packed.clone(), &mut dest).unwrap();
        let err = session.pull(&mut [], PullMode::Continue).unwrap_err();
        assert!(matches!(err, NcdError::InvalidArgument(_)));
        assert_eq!(session.phase(), SessionPhase::Idle);

        let err = session.start(packed, &mut []).unwrap_err();
        assert!(matches!(err, NcdError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_source_rejected() {
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 8];
        assert!(session.start(Bytes::new(), &mut dest).is_err());
        assert!(decompress_all(&[]).is_err());
    }

    #[test]
    fn test_restart_while_busy_replaces_stream() {
        let first = compress(&sample(), 6).unwrap();
        let second = compress(b"second stream", 6).unwrap();
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 32];
        session.start(first, &mut dest).unwrap();
        let n = session.start(second, &mut dest).unwrap();
        assert_eq!(&dest[..n], b"second stream");
        assert_eq!(session.pull(&mut dest, PullMode::Continue).unwrap(), 0);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_corrupt_input_errors_and_resets() {
        let mut session = DecompressionSession::new();
        let mut dest = [0u8; 64];
        let err = session
            .start(Bytes::from_static(b"not a zlib stream at all"), &mut dest)
            .unwrap_err();
        assert!(matches!(err, NcdError::DecompressionFailed(_)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_truncated_stream_detected() {
        let packed = compress(&sample(), 6).unwrap();
        let half = &packed[..packed.len() / 2];
        assert!(matches!(
            decompress_all(half),
            Err(NcdError::TruncatedStream)
        ));
    }

    proptest! {
        #[test]
        fn prop_pull_roundtrip(
            data in prop::collection::vec(any::<u8>(), 0..30_000),
            dest_len in 1usize..5000,
        ) {
            let packed = compress(&data, 6).unwrap();
            let mut session = DecompressionSession::new();
            let mut dest = vec![0u8; dest_len];
            let mut out = Vec::new();
            let mut n = session.start(packed, &mut dest).unwrap();
            while n > 0 {
                out.extend_from_slice(&dest[..n]);
                n = session.pull(&mut dest, PullMode::Continue).unwrap();
            }
            prop_assert_eq!(out, data);
        }
    }
}
