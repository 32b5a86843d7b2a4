#![warn(missing_docs)]

//! ZNCD core: resumable deflate sessions and Normalized Compression Distance
//!
//! Compress path:   startup → feed (chunk, chunk, …) → finish
//! Decompress path: start (source) → pull → pull → … → 0
//! NCD:             standalone sizes → pairwise concatenation sizes → distance matrix

pub mod buffer;
pub mod compress;
pub mod config;
pub mod decompress;
pub mod error;
pub mod matrix;
pub mod ncd;
pub mod slot;

pub use buffer::ByteBuffer;
pub use compress::{compress, CompressionSession, FinishedStream};
pub use config::{
    CompressConfig, NcdConfig, DEFAULT_LEVEL, DRAIN_WINDOW, MAX_LEVEL, MIN_LEVEL, MIN_WINDOW,
};
pub use decompress::{decompress_all, DecompressionSession, PullMode};
pub use error::{NcdError, Result};
pub use matrix::DistanceMatrix;
pub use ncd::{ncd_formula, NcdEngine, NcdStats, SELF_DISTANCE};
pub use slot::SessionSlot;

/// Lifecycle phase shared by both session kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No stream in flight; only startup is accepted
    #[default]
    Idle,
    /// A stream is in flight between startup and finish
    Active,
}
