//! Compression level and retention settings for sessions and the NCD engine

use serde::{Deserialize, Serialize};

/// Lowest deflate level accepted
pub const MIN_LEVEL: u32 = 1;
/// Highest deflate level accepted; the NCD engine always runs here
pub const MAX_LEVEL: u32 = 9;
/// Fallback level for out-of-range requests
pub const DEFAULT_LEVEL: u32 = 6;
/// Size of the bounded scratch window filled by one drain pass (256 KiB)
pub const DRAIN_WINDOW: usize = 262_144;
/// Smallest drain window a session will use; a sync flush must fit in one pass
pub const MIN_WINDOW: usize = 64;

/// Returns true if `level` is a usable deflate level.
pub fn is_valid_level(level: u32) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}

/// Settings applied to a [`CompressionSession`](crate::compress::CompressionSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressConfig {
    /// Level used at startup when the caller gives no valid hint (1=fastest, 9=smallest)
    pub level: u32,
    /// Keep the compressed bytes; when false only the byte count is tracked
    pub retain_output: bool,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            retain_output: true,
        }
    }
}

impl CompressConfig {
    /// Config with the given level; out-of-range levels fall back to [`DEFAULT_LEVEL`].
    pub fn with_level(level: u32) -> Self {
        Self {
            level: if is_valid_level(level) {
                level
            } else {
                DEFAULT_LEVEL
            },
            ..Self::default()
        }
    }

    /// Level to use for a startup call carrying `hint`.
    pub fn effective_level(&self, hint: Option<u32>) -> u32 {
        match hint {
            Some(h) if is_valid_level(h) => h,
            _ if is_valid_level(self.level) => self.level,
            _ => DEFAULT_LEVEL,
        }
    }
}

/// Settings for the [`NcdEngine`](crate::ncd::NcdEngine).
///
/// The engine always compresses at [`MAX_LEVEL`] with retention off so that
/// every size it compares was produced the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcdConfig {
    /// Drain window size handed to the engine's compression session
    pub scratch_size: usize,
}

impl Default for NcdConfig {
    fn default() -> Self {
        Self {
            scratch_size: DRAIN_WINDOW,
        }
    }
}

impl NcdConfig {
    /// Session config the engine compresses with, whatever the window size.
    pub fn session_config() -> CompressConfig {
        CompressConfig {
            level: MAX_LEVEL,
            retain_output: false,
        }
    }
}
