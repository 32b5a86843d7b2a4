//! Normalized Compression Distance over a set of byte sequences.
//!
//! NCD(x, y) = (min(C(xy), C(yx)) - min(C(x), C(y))) / max(C(x), C(y))
//!
//! C is the zlib-compressed size at level 9. Both concatenation orders are
//! compressed because deflate's context is order-sensitive; the smaller one is
//! the better joint-complexity estimate. Results are capped at 1.0. Slightly
//! negative values are kept: they mean "very similar" under an imperfect compressor.

use crate::compress::CompressionSession;
use crate::config::NcdConfig;
use crate::error::{NcdError, Result};
use crate::matrix::DistanceMatrix;
use tracing::{debug, instrument};

/// Value placed on the matrix diagonal.
///
/// The ideal self-distance is 0; the output format has always carried 1.0 here.
pub const SELF_DISTANCE: f32 = 1.0;

/// Upper bound applied to every off-diagonal distance.
const MAX_DISTANCE: f64 = 1.0;

/// Cumulative counters across all computations run by one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NcdStats {
    /// Number of one-shot compressions performed
    pub compressions: u64,
    /// Uncompressed bytes fed to the compressor
    pub bytes_in: u64,
    /// Compressed bytes the compressor produced
    pub bytes_out: u64,
}

/// Distance for one pair from its four compressed sizes.
pub fn ncd_formula(c_ij: u64, c_ji: u64, c_i: u64, c_j: u64) -> f32 {
    let joint = c_ij.min(c_ji) as f64;
    let lo = c_i.min(c_j) as f64;
    let hi = c_i.max(c_j) as f64;
    if hi == 0.0 {
        return MAX_DISTANCE as f32;
    }
    ((joint - lo) / hi).min(MAX_DISTANCE) as f32
}

/// Computes NCD matrices, reusing one compression session throughout.
pub struct NcdEngine {
    session: CompressionSession,
    stats: NcdStats,
}

impl Default for NcdEngine {
    fn default() -> Self {
        Self::new(NcdConfig::default())
    }
}

impl NcdEngine {
    /// Create an engine; its session compresses at level 9 without retaining output.
    pub fn new(config: NcdConfig) -> Self {
        Self {
            session: CompressionSession::with_window(
                NcdConfig::session_config(),
                config.scratch_size,
            ),
            stats: NcdStats::default(),
        }
    }

    /// Counters accumulated since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> NcdStats {
        self.stats
    }

    /// Zero the counters.
    pub fn reset_stats(&mut self) {
        self.stats = NcdStats::default();
    }

    fn compressed_size(&mut self, data: &[u8]) -> Result<u64> {
        let size = self.session.compress_all(data, false)?.total_out;
        self.stats.compressions += 1;
        self.stats.bytes_in += data.len() as u64;
        self.stats.bytes_out += size;
        Ok(size)
    }

    /// Compressed size of each input on its own.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub fn standalone_sizes<T: AsRef<[u8]>>(&mut self, inputs: &[T]) -> Result<Vec<u64>> {
        let mut sizes = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            if input.is_empty() {
                return Err(NcdError::EmptyInput { index });
            }
            let size = self.compressed_size(input)?;
            if size == 0 {
                return Err(NcdError::CompressionFailed(format!(
                    "input {index} compressed to 0 bytes"
                )));
            }
            sizes.push(size);
        }
        Ok(sizes)
    }

    /// Full symmetric NCD matrix for `inputs` (at least two, none empty).
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub fn distance_matrix<T: AsRef<[u8]>>(&mut self, inputs: &[T]) -> Result<DistanceMatrix> {
        let n = inputs.len();
        if n < 2 {
            return Err(NcdError::TooFewInputs { count: n });
        }
        if let Some(index) = inputs.iter().position(|s| s.as_ref().is_empty()) {
            return Err(NcdError::EmptyInput { index });
        }

        let sizes = self.standalone_sizes(inputs)?;
        debug!(?sizes, "standalone sizes");

        let mut scratch = Vec::with_capacity(largest_pair_len(inputs));
        let mut matrix = DistanceMatrix::new(n, SELF_DISTANCE);
        for i in 0..n {
            let a = inputs[i].as_ref();
            for j in i + 1..n {
                let b = inputs[j].as_ref();

                scratch.clear();
                scratch.extend_from_slice(a);
                scratch.extend_from_slice(b);
                let c_ij = self.compressed_size(&scratch)?;

                scratch.clear();
                scratch.extend_from_slice(b);
                scratch.extend_from_slice(a);
                let c_ji = self.compressed_size(&scratch)?;

                let distance = ncd_formula(c_ij, c_ji, sizes[i], sizes[j]);
                debug!(i, j, c_ij, c_ji, distance, "pair distance");
                matrix.set_symmetric(i, j, distance);
            }
        }
        debug!(stats = ?self.stats, "distance matrix complete");
        Ok(matrix)
    }

    /// NCD between exactly two sequences.
    pub fn pair(&mut self, a: &[u8], b: &[u8]) -> Result<f32> {
        let matrix = self.distance_matrix(&[a, b])?;
        Ok(matrix.get(0, 1))
    }
}

/// Combined length of the two longest inputs.
fn largest_pair_len<T: AsRef<[u8]>>(inputs: &[T]) -> usize {
    let (mut first, mut second) = (0usize, 0usize);
    for len in inputs.iter().map(|s| s.as_ref().len()) {
        if len > first {
            second = first;
            first = len;
        } else if len > second {
            second = len;
        }
    }
    first + second
}
