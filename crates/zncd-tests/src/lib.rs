//! zncd test & validation
//!
//! Shared input generators plus the cross-module suites: chunked compression
//! against one-shot compression, pull-style decompression, distance matrix
//! invariants and sessions shared between threads.

pub mod generators;

pub use generators::{arb_data, arb_inputs, noise, split_chunks, text_corpus};

#[cfg(test)]
mod ncd_tests;
