//! Error types for the zncd core

/// All errors that can occur in the compression sessions and the NCD engine
#[derive(Debug, thiserror::Error)]
pub enum NcdError {
    /// Startup was requested while a stream is still in flight
    #[error("{session} session is busy: startup while a stream is active")]
    SessionBusy {
        /// Which session kind rejected the call
        session: &'static str,
    },
    /// A stream operation was called without a preceding startup
    #[error("{session} session is idle: {op} called before startup")]
    SessionIdle {
        /// Which session kind rejected the call
        session: &'static str,
        /// The rejected operation
        op: &'static str,
    },
    /// The deflate codec reported an internal error
    #[error("Compression failed: {0}")]
    CompressionFailed(String),
    /// The inflate codec reported an internal or data error
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
    /// The compressed stream ended before its end-of-stream marker
    #[error("Decompression failed: stream truncated before end marker")]
    TruncatedStream,
    /// Empty chunk, empty source or empty destination buffer
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// NCD needs at least two inputs
    #[error("NCD needs at least 2 inputs, got {count}")]
    TooFewInputs {
        /// Number of inputs supplied
        count: usize,
    },
    /// An NCD input has no bytes
    #[error("NCD input {index} is empty")]
    EmptyInput {
        /// Position of the offending input
        index: usize,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NcdError>;
