//! Statistical aggregate functions
//!
//! variance, stdev, samplestdev, mode, median, lower_quartile,
//! upper_quartile and covar_samp. The order-statistic aggregates collect
//! their inputs in an [`OrderedMultiset`] and walk it once at finalize.

use std::cmp::Ordering;

use crate::error::{Error, ErrorCode, Result};
use crate::types::{ColumnType, Value};
use crate::util::multiset::{int_cmp, real_cmp, OrderedMultiset};

type IntSet = OrderedMultiset<i64, fn(&i64, &i64) -> Ordering>;
type RealSet = OrderedMultiset<f64, fn(&f64, &f64) -> Ordering>;

/// Collected values for the order-statistic aggregates
///
/// The first non-NULL value decides the key type; later values are coerced.
pub enum ValueSet {
    Int(IntSet),
    Real(RealSet),
}

impl ValueSet {
    fn for_value(val: &Value) -> Self {
        match val.numeric_type() {
            ColumnType::Integer => ValueSet::Int(OrderedMultiset::new(int_cmp as fn(&i64, &i64) -> Ordering)),
            _ => ValueSet::Real(OrderedMultiset::new(real_cmp as fn(&f64, &f64) -> Ordering)),
        }
    }

    fn insert(&mut self, val: &Value) {
        match self {
            ValueSet::Int(set) => set.insert(val.to_i64()),
            ValueSet::Real(set) => set.insert(val.to_f64()),
        }
    }

    fn total(&self) -> u64 {
        match self {
            ValueSet::Int(set) => set.total(),
            ValueSet::Real(set) => set.total(),
        }
    }
}

/// Variance flavours sharing one accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceKind {
    Variance,
    Stdev,
    SampleStdev,
}

// ============================================================================
// Aggregate State
// ============================================================================

/// State maintained during aggregation
pub enum AggregateState {
    /// Welford running mean and sum of squared deviations
    Variance {
        kind: VarianceKind,
        n: i64,
        mean: f64,
        m2: f64,
    },

    /// MODE(x)
    Mode { set: Option<ValueSet> },

    /// MEDIAN(x), LOWER_QUARTILE(x), UPPER_QUARTILE(x)
    Percentile {
        fraction: f64,
        set: Option<ValueSet>,
    },

    /// COVAR_SAMP(x, y)
    Covar {
        n: i64,
        sum_x: f64,
        sum_y: f64,
        sum_xy: f64,
    },
}

impl AggregateState {
    /// Create initial state for an aggregate function
    pub fn new(func_name: &str) -> Option<Self> {
        match func_name.to_uppercase().as_str() {
            "VARIANCE" => Some(Self::variance(VarianceKind::Variance)),
            "STDEV" => Some(Self::variance(VarianceKind::Stdev)),
            "SAMPLESTDEV" => Some(Self::variance(VarianceKind::SampleStdev)),
            "MODE" => Some(AggregateState::Mode { set: None }),
            "MEDIAN" => Some(Self::percentile(0.5)),
            "LOWER_QUARTILE" => Some(Self::percentile(0.25)),
            "UPPER_QUARTILE" => Some(Self::percentile(0.75)),
            "COVAR_SAMP" => Some(AggregateState::Covar {
                n: 0,
                sum_x: 0.0,
                sum_y: 0.0,
                sum_xy: 0.0,
            }),
            _ => None,
        }
    }

    pub fn variance(kind: VarianceKind) -> Self {
        AggregateState::Variance {
            kind,
            n: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn percentile(fraction: f64) -> Self {
        AggregateState::Percentile {
            fraction,
            set: None,
        }
    }

    /// Step: add a row to the aggregate
    pub fn step(&mut self, args: &[Value]) -> Result<()> {
        match self {
            AggregateState::Variance { n, mean, m2, .. } => {
                let Some(val) = non_null(args) else {
                    return Ok(());
                };
                let x = val.to_f64();
                *n += 1;
                let delta = x - *mean;
                *mean += delta / *n as f64;
                *m2 += delta * (x - *mean);
            }

            AggregateState::Mode { set } | AggregateState::Percentile { set, .. } => {
                let Some(val) = non_null(args) else {
                    return Ok(());
                };
                set.get_or_insert_with(|| ValueSet::for_value(val))
                    .insert(val);
            }

            AggregateState::Covar {
                n,
                sum_x,
                sum_y,
                sum_xy,
            } => {
                let (Some(x), Some(y)) = (args.first(), args.get(1)) else {
                    return Err(Error::with_message(
                        ErrorCode::Misuse,
                        "covar_samp requires 2 arguments",
                    ));
                };
                if x.is_null() || y.is_null() {
                    return Ok(());
                }
                let x = covar_operand(x)?;
                let y = covar_operand(y)?;
                *n += 1;
                *sum_x += x;
                *sum_y += y;
                *sum_xy += x * y;
            }
        }
        Ok(())
    }

    /// Finalize: compute the result, releasing the collected values
    pub fn finalize(self) -> Result<Value> {
        let value = match self {
            AggregateState::Variance { kind, n, m2, .. } => {
                if n <= 1 {
                    Value::Real(0.0)
                } else {
                    let var = m2 / (n - 1) as f64;
                    match kind {
                        VarianceKind::Variance => Value::Real(var),
                        VarianceKind::Stdev | VarianceKind::SampleStdev => {
                            Value::Real(var.sqrt())
                        }
                    }
                }
            }

            AggregateState::Mode { set } => match set {
                Some(ValueSet::Int(set)) => mode_of(&set).map_or(Value::Null, Value::Integer),
                Some(ValueSet::Real(set)) => mode_of(&set).map_or(Value::Null, Value::Real),
                None => Value::Null,
            },

            AggregateState::Percentile { fraction, set } => match set {
                None => Value::Null,
                Some(set) => {
                    let rank = set.total() as f64 * fraction;
                    match set {
                        // i128 keeps the sum of picked i64 values exact
                        ValueSet::Int(set) => {
                            match weighted_pick(&set, rank, 0i128, |sum, v| sum + *v as i128) {
                                (0, _) => Value::Null,
                                (1, sum) => Value::Integer(sum as i64),
                                (picked, sum) => Value::Real(sum as f64 / picked as f64),
                            }
                        }
                        ValueSet::Real(set) => match weighted_pick(&set, rank, 0.0, |sum, v| sum + *v) {
                            (0, _) => Value::Null,
                            (picked, sum) => Value::Real(sum / picked as f64),
                        },
                    }
                }
            },

            AggregateState::Covar {
                n,
                sum_x,
                sum_y,
                sum_xy,
            } => {
                if n <= 1 {
                    Value::Null
                } else {
                    let n = n as f64;
                    Value::Real((sum_xy - sum_x * sum_y / n) / (n - 1.0))
                }
            }
        };
        Ok(value)
    }
}

fn non_null(args: &[Value]) -> Option<&Value> {
    args.first()
        .filter(|v| v.numeric_type() != ColumnType::Null)
}

fn covar_operand(val: &Value) -> Result<f64> {
    match val.numeric_type() {
        ColumnType::Integer | ColumnType::Float => Ok(val.to_f64()),
        _ => Err(Error::with_message(
            ErrorCode::Error,
            "covar: argument must be numeric",
        )),
    }
}

/// The value with the highest count, when no other value shares it
fn mode_of<T: Copy, C>(set: &OrderedMultiset<T, C>) -> Option<T>
where
    C: Fn(&T, &T) -> Ordering,
{
    let mut best: Option<T> = None;
    let mut best_count = 0u64;
    let mut tied = false;
    for (value, count) in set.iter() {
        match count.cmp(&best_count) {
            Ordering::Greater => {
                best = Some(*value);
                best_count = count;
                tied = false;
            }
            Ordering::Equal => tied = true,
            Ordering::Less => {}
        }
    }
    if tied {
        None
    } else {
        best
    }
}

/// Select the distinct values straddling `rank`, folding them with `add`
///
/// A value with `before` smaller inputs and `count` copies is selected when
/// it reaches the rank from below (`before + count >= rank`) and from above
/// (`total - before >= total - rank`). Returns how many were picked and the
/// folded sum.
fn weighted_pick<T, C, S, F>(set: &OrderedMultiset<T, C>, rank: f64, zero: S, add: F) -> (u64, S)
where
    C: Fn(&T, &T) -> Ordering,
    F: Fn(S, &T) -> S,
{
    let total = set.total() as f64;
    let from_above = total - rank;
    let mut before = 0u64;
    let mut picked = 0u64;
    let mut sum = zero;

    for (value, count) in set.iter() {
        let below = (before + count) as f64;
        let above = total - before as f64;
        if below >= rank {
            if above >= from_above {
                picked += 1;
                sum = add(sum, value);
            } else {
                break;
            }
        }
        before += count;
    }
    (picked, sum)
}

// ============================================================================
// Tests
// ============================================================================
