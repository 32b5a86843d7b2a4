//! Text and JSON rendering of a distance matrix

use serde::Serialize;
use std::io::{self, Write};
use zncd_core::DistanceMatrix;

#[derive(Serialize)]
struct MatrixReport<'a> {
    labels: &'a [String],
    matrix: &'a DistanceMatrix,
}

/// One line per unordered pair: `"<ncd> <label_i> <label_j>"`.
pub fn write_pairs<W: Write>(
    out: &mut W,
    matrix: &DistanceMatrix,
    labels: &[String],
    precision: usize,
) -> io::Result<()> {
    for (i, j, d) in matrix.pairs() {
        writeln!(out, "{:.*} {} {}", precision, d, labels[i], labels[j])?;
    }
    Ok(())
}

/// Labels and the full matrix as one pretty-printed JSON document.
pub fn write_json<W: Write>(
    out: &mut W,
    matrix: &DistanceMatrix,
    labels: &[String],
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &MatrixReport { labels, matrix })?;
    writeln!(out)?;
    Ok(())
}
