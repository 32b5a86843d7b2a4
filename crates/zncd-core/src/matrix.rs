//! Dense square matrix of pairwise distances

use serde::Serialize;

/// Row-major `size × size` matrix of `f32` distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f32>,
}

impl DistanceMatrix {
    /// Create a matrix with every entry set to `fill`.
    pub fn new(size: usize, fill: f32) -> Self {
        Self {
            size,
            values: vec![fill; size * size],
        }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at (`row`, `col`). Panics if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[self.offset(row, col)]
    }

    /// Overwrite the entry at (`row`, `col`). Panics if either index is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.offset(row, col);
        self.values[idx] = value;
    }

    /// Write `value` at both (`i`, `j`) and (`j`, `i`).
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f32) {
        self.set(i, j, value);
        self.set(j, i, value);
    }

    /// All entries, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// True if every (i, j) equals (j, i) bit for bit.
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| {
            (i + 1..self.size).all(|j| self.get(i, j).to_bits() == self.get(j, i).to_bits())
        })
    }

    /// Upper-triangle entries `(i, j, value)` with `i < j`, row by row.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        (0..self.size).flat_map(move |i| (i + 1..self.size).map(move |j| (i, j, self.get(i, j))))
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "index ({row}, {col}) out of range for {0}x{0} matrix",
            self.size
        );
        row * self.size + col
    }
}
