//! Randomized checks of the ordered multiset and the percentile aggregates
//! against a sort-based reference.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustql_ext::util::multiset::{int_cmp, real_cmp};
use rustql_ext::{AggregateState, OrderedMultiset, Value};

fn counts(values: &[i64]) -> Vec<(i64, u64)> {
    let mut map = BTreeMap::new();
    for v in values {
        *map.entry(*v).or_insert(0u64) += 1;
    }
    map.into_iter().collect()
}

/// Distinct sorted values at integer indices in [rank-1, rank]
fn reference_pick<T: Copy + PartialEq>(sorted: &[T], fraction: f64) -> Vec<T> {
    let rank = fraction * sorted.len() as f64;
    let lo = (rank - 1.0).ceil().max(0.0) as usize;
    let hi = (rank.floor() as usize).min(sorted.len() - 1);
    let mut picked = sorted[lo..=hi].to_vec();
    picked.dedup();
    picked
}

/// Number of picked values and their exact sum
fn reference_percentile(values: &[i64], fraction: f64) -> Option<(usize, i128)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let picked = reference_pick(&sorted, fraction);
    Some((picked.len(), picked.iter().map(|&v| v as i128).sum()))
}

fn reference_real_percentile(values: &[f64], fraction: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let picked = reference_pick(&sorted, fraction);
    Some(picked.iter().sum::<f64>() / picked.len() as f64)
}

fn run_percentile(values: &[i64], fraction: f64) -> Value {
    let mut state = AggregateState::percentile(fraction);
    for &v in values {
        state.step(&[Value::Integer(v)]).unwrap();
    }
    state.finalize().unwrap()
}

fn run_real_percentile(values: &[f64], fraction: f64) -> Value {
    let mut state = AggregateState::percentile(fraction);
    for &v in values {
        state.step(&[Value::Real(v)]).unwrap();
    }
    state.finalize().unwrap()
}

#[test]
fn random_inserts_match_sorted_counts() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..50 {
        let n = rng.gen_range(0..2000);
        let values: Vec<i64> = (0..n).map(|_| rng.gen_range(-50..50)).collect();

        let mut set = OrderedMultiset::new(int_cmp);
        for &v in &values {
            set.insert(v);
        }

        let mut seen = Vec::new();
        set.iterate(|v, c| seen.push((*v, c)));
        let expected = counts(&values);
        assert_eq!(seen, expected, "round {}", round);
        assert_eq!(set.len(), expected.len());
        assert_eq!(set.total(), values.len() as u64);
        assert_eq!(set.is_empty(), values.is_empty());
    }
}

#[test]
fn iterator_agrees_with_iterate() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut set = OrderedMultiset::new(real_cmp);
    for _ in 0..5000 {
        set.insert((rng.gen_range(0..200) as f64) / 8.0);
    }
    let mut visited = Vec::new();
    set.iterate(|v, c| visited.push((*v, c)));
    let iterated: Vec<(f64, u64)> = set.iter().map(|(v, c)| (*v, c)).collect();
    assert_eq!(visited, iterated);
    assert!(visited.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn sorted_input_stays_shallow() {
    let mut set = OrderedMultiset::new(int_cmp);
    for v in 0..200_000i64 {
        set.insert(v);
    }
    assert_eq!(set.len(), 200_000);
    // AA-tree height is at most 2*log2(n+1)
    assert!(set.height() <= 36, "height {}", set.height());
    let mut last = -1;
    let mut ok = true;
    set.iterate(|v, c| {
        ok &= *v == last + 1 && c == 1;
        last = *v;
    });
    assert!(ok);
    set.destroy();
}

fn check_percentiles(values: &[i64]) {
    for fraction in [0.25, 0.5, 0.75] {
        let (picked, sum) = reference_percentile(values, fraction).unwrap();
        match run_percentile(values, fraction) {
            Value::Integer(i) => {
                assert_eq!(picked, 1, "{:?} p={}", values, fraction);
                assert_eq!(i as i128, sum, "{:?} p={}", values, fraction);
            }
            Value::Real(r) => {
                assert!(picked > 1, "{:?} p={}", values, fraction);
                let mean = sum as f64 / picked as f64;
                assert!(
                    (r - mean).abs() <= mean.abs() * 1e-12 + 1e-9,
                    "{:?} p={}: {} vs {}",
                    values,
                    fraction,
                    r,
                    mean
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn percentiles_match_reference() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let n = rng.gen_range(1..60);
        let spread = rng.gen_range(1..20);
        let values: Vec<i64> = (0..n).map(|_| rng.gen_range(0..spread)).collect();
        check_percentiles(&values);
    }
}

#[test]
fn percentiles_match_reference_across_i64_range() {
    let mut rng = StdRng::seed_from_u64(0x1f64);
    for _ in 0..200 {
        let n = rng.gen_range(1..40);
        let mut values: Vec<i64> = (0..n).map(|_| rng.gen::<i64>()).collect();
        // repeat some values so counts above one show up
        for i in 0..values.len() / 3 {
            values[i * 2] = values[i];
        }
        check_percentiles(&values);
    }
    check_percentiles(&[i64::MIN, i64::MAX]);
    check_percentiles(&[i64::MAX, i64::MAX - 1, i64::MAX]);
    check_percentiles(&[9_007_199_254_740_993]);
}

#[test]
fn real_percentiles_match_reference() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let n = rng.gen_range(1..60);
        let scale = 10f64.powi(rng.gen_range(-3..12));
        let values: Vec<f64> = (0..n)
            .map(|_| (rng.gen_range(-40..40) as f64) * scale / 4.0)
            .collect();

        for fraction in [0.25, 0.5, 0.75] {
            let expected = reference_real_percentile(&values, fraction).unwrap();
            match run_real_percentile(&values, fraction) {
                Value::Real(r) => assert!(
                    (r - expected).abs() <= expected.abs() * 1e-12 + 1e-12,
                    "{:?} p={}: {} vs {}",
                    values,
                    fraction,
                    r,
                    expected
                ),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}

#[test]
fn median_of_odd_and_even_counts() {
    assert_eq!(run_percentile(&[3, 1, 2, 2, 5], 0.5), Value::Integer(2));
    assert_eq!(run_percentile(&[4, 1, 3, 2], 0.5), Value::Real(2.5));
    assert_eq!(run_percentile(&[7, 7, 7, 7], 0.5), Value::Integer(7));
    assert_eq!(run_percentile(&[], 0.5), Value::Null);
}
