//! Input generators shared by the suites

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random byte vectors up to `max_size` long (possibly empty).
pub fn arb_data(max_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_size)
}

/// Between 2 and `max_count` non-empty inputs, each at most `max_size` bytes.
pub fn arb_inputs(max_count: usize, max_size: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(
        prop::collection::vec(any::<u8>(), 1..max_size.max(2)),
        2..max_count.max(3),
    )
}

/// Deterministic incompressible bytes.
pub fn noise(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill(&mut out[..]);
    out
}

/// Repetitive text of roughly `len` bytes.
pub fn text_corpus(len: usize) -> Vec<u8> {
    let words = [
        "stream", "deflate", "window", "session", "matrix", "distance", "chunk", "flush",
    ];
    let mut out = Vec::with_capacity(len + 16);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 7 + i / 3) % words.len()].as_bytes());
        out.push(if i % 11 == 10 { b'\n' } else { b' ' });
        i += 1;
    }
    out.truncate(len);
    out
}

/// Split `data` at the given cut points (sorted, deduplicated, clamped), never
/// producing an empty piece.
pub fn split_chunks<'a>(data: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut points: Vec<usize> = cuts
        .iter()
        .map(|&c| c.min(data.len()))
        .filter(|&c| c > 0 && c < data.len())
        .collect();
    points.sort_unstable();
    points.dedup();

    let mut pieces = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for p in points {
        pieces.push(&data[start..p]);
        start = p;
    }
    if start < data.len() {
        pieces.push(&data[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_deterministic() {
        assert_eq!(noise(7, 64), noise(7, 64));
        assert_ne!(noise(7, 64), noise(8, 64));
    }

    #[test]
    fn test_text_corpus_len() {
        assert_eq!(text_corpus(1000).len(), 1000);
        assert!(text_corpus(0).is_empty());
    }

    #[test]
    fn test_split_chunks_covers_input() {
        let data: Vec<u8> = (0..100).collect();
        let pieces = split_chunks(&data, &[50, 10, 10, 0, 100, 250]);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| !p.is_empty()));
        assert_eq!(pieces.concat(), data);
    }

    #[test]
    fn test_split_chunks_empty() {
        assert!(split_chunks(&[], &[1, 2]).is_empty());
    }
}
