//! NCD matrices computed end to end

use crate::generators::{arb_inputs, noise, text_corpus};
use proptest::prelude::*;
use zncd_core::{compress, NcdConfig, NcdEngine, NcdError, SELF_DISTANCE};

#[test]
fn test_three_input_scenario() {
    let inputs: Vec<Vec<u8>> = vec![
        b"AAAAAAAAAA".to_vec(),
        b"AAAAAAAAAB".to_vec(),
        noise(3, 10),
    ];
    let mut engine = NcdEngine::default();
    let matrix = engine.distance_matrix(&inputs).unwrap();

    assert_eq!(matrix.size(), 3);
    for i in 0..3 {
        assert_eq!(matrix.get(i, i), SELF_DISTANCE);
    }
    assert!(matrix.is_symmetric());
    assert!(matrix.get(0, 1) < matrix.get(0, 2));
    assert!(matrix.get(0, 1) < matrix.get(1, 2));
    assert!(matrix.pairs().all(|(_, _, d)| d <= 1.0));
}

#[test]
fn test_lightly_edited_copy_is_closer_than_noise() {
    let base = noise(11, 20_000);
    let mut edited = base.clone();
    for i in (0..edited.len()).step_by(997) {
        edited[i] = edited[i].wrapping_add(1);
    }
    let inputs = vec![base, edited, noise(9, 20_000)];
    let matrix = NcdEngine::default().distance_matrix(&inputs).unwrap();
    assert!(matrix.get(0, 1) < 0.2);
    assert!(matrix.get(0, 2) > 0.8);
    assert!(matrix.get(1, 2) > 0.8);
}

#[test]
fn test_standalone_sizes_match_level_nine() {
    let inputs = vec![text_corpus(5000), noise(1, 5000)];
    let sizes = NcdEngine::default().standalone_sizes(&inputs).unwrap();
    for (input, size) in inputs.iter().zip(&sizes) {
        assert_eq!(compress(input, 9).unwrap().len() as u64, *size);
    }
}

#[test]
fn test_swapping_inputs_swaps_rows() {
    let a = text_corpus(3000);
    let b = noise(5, 2000);
    let c = b"a short line that is mostly unique".to_vec();
    let mut engine = NcdEngine::new(NcdConfig::default());
    let forward = engine
        .distance_matrix(&[a.as_slice(), b.as_slice(), c.as_slice()])
        .unwrap();
    let swapped = engine
        .distance_matrix(&[c.as_slice(), b.as_slice(), a.as_slice()])
        .unwrap();
    assert_eq!(forward.get(0, 1), swapped.get(2, 1));
    assert_eq!(forward.get(0, 2), swapped.get(2, 0));
    assert_eq!(forward.get(1, 2), swapped.get(1, 0));
}

#[test]
fn test_pair_matches_matrix() {
    let a = text_corpus(4000);
    let b = text_corpus(6000);
    let mut engine = NcdEngine::default();
    let pair = engine.pair(&a, &b).unwrap();
    let matrix = engine.distance_matrix(&[&a, &b]).unwrap();
    assert_eq!(pair, matrix.get(0, 1));
}

#[test]
fn test_input_errors() {
    let mut engine = NcdEngine::default();
    let none: Vec<Vec<u8>> = Vec::new();
    assert!(matches!(
        engine.distance_matrix(&none).unwrap_err(),
        NcdError::TooFewInputs { count: 0 }
    ));
    assert!(matches!(
        engine.distance_matrix(&[b"one".to_vec()]).unwrap_err(),
        NcdError::TooFewInputs { count: 1 }
    ));
    let with_empty: Vec<&[u8]> = vec![&b"x"[..], &b"y"[..], &b""[..]];
    assert!(matches!(
        engine.distance_matrix(&with_empty).unwrap_err(),
        NcdError::EmptyInput { index: 2 }
    ));
    assert_eq!(engine.stats().compressions, 0);
}

#[test]
fn test_engine_reusable_after_error() {
    let mut engine = NcdEngine::default();
    assert!(engine.distance_matrix(&[b"".to_vec(), b"x".to_vec()]).is_err());
    let matrix = engine
        .distance_matrix(&[b"first".to_vec(), b"second".to_vec()])
        .unwrap();
    assert_eq!(matrix.size(), 2);
}

#[test]
fn test_stats_accumulate_and_reset() {
    let inputs = vec![b"abc".to_vec(), b"defg".to_vec()];
    let mut engine = NcdEngine::default();
    engine.distance_matrix(&inputs).unwrap();
    let first = engine.stats();
    // 2 standalone + 2 orderings of the single pair
    assert_eq!(first.compressions, 4);
    assert_eq!(first.bytes_in, 3 + 4 + 2 * 7);

    engine.distance_matrix(&inputs).unwrap();
    assert_eq!(engine.stats().compressions, 8);
    assert_eq!(engine.stats().bytes_out, 2 * first.bytes_out);

    engine.reset_stats();
    assert_eq!(engine.stats().compressions, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_matrix_invariants(inputs in arb_inputs(6, 2000)) {
        let matrix = NcdEngine::default().distance_matrix(&inputs).unwrap();
        prop_assert_eq!(matrix.size(), inputs.len());
        prop_assert!(matrix.is_symmetric());
        for i in 0..inputs.len() {
            prop_assert_eq!(matrix.get(i, i), SELF_DISTANCE);
        }
        for (_, _, d) in matrix.pairs() {
            prop_assert!(d <= 1.0);
            prop_assert!(d.is_finite());
        }
    }
}
