//! Sub-Latin collations, case mapping and LIKE
//!
//! NOCASE_SL and NOCASE_SLNA compare text case-insensitively (and, for the
//! latter, accent-insensitively) over ASCII plus accented Latin-1 letters.
//! Opening with `SubLatinFlags::LIKE` or `SubLatinFlags::NA_LIKE` also
//! replaces the built-in NOCASE, upper, lower and like.

pub mod fold;
pub mod like;

use std::cmp::Ordering;

use crate::error::{Error, ErrorCode, Result};
use crate::functions::{FunctionContext, FunctionRegistry, ScalarFunc};
use crate::types::{FuncFlags, SubLatinFlags, Value};

pub use fold::{
    deaccent_sl, is_lower_sl, is_upper_sl, map_str, to_lower_deaccent_sl, to_lower_sl,
    to_upper_sl,
};
pub use like::like_compare;

// ============================================================================
// Collations
// ============================================================================

fn fold_cmp(a: &str, b: &str, fold: fn(char) -> char) -> Ordering {
    a.chars().map(fold).cmp(b.chars().map(fold))
}

/// NOCASE_SL
pub fn nocase_sl(a: &str, b: &str) -> Ordering {
    fold_cmp(a, b, to_lower_sl)
}

/// NOCASE_SLNA
pub fn nocase_slna(a: &str, b: &str) -> Ordering {
    fold_cmp(a, b, to_lower_deaccent_sl)
}

// ============================================================================
// Scalar Functions
// ============================================================================

fn map_arg(ctx: &FunctionContext, args: &[Value], map: fn(char) -> char) -> Result<Value> {
    match args.first() {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(v) => {
            let out = map_str(&v.to_text(), map);
            ctx.check_length(out.len())?;
            Ok(Value::Text(out))
        }
    }
}

/// upper_sl(S)
pub fn func_upper_sl(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    map_arg(ctx, args, to_upper_sl)
}

/// lower_sl(S)
pub fn func_lower_sl(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    map_arg(ctx, args, to_lower_sl)
}

/// lower_slna(S)
pub fn func_lower_slna(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    map_arg(ctx, args, to_lower_deaccent_sl)
}

/// deaccent_sl(S)
pub fn func_deaccent_sl(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    map_arg(ctx, args, deaccent_sl)
}

fn like_with(ctx: &FunctionContext, args: &[Value], fold: fn(char) -> char) -> Result<Value> {
    let pattern = args.first().unwrap_or(&Value::Null);
    let text = args.get(1).unwrap_or(&Value::Null);

    if pattern.to_text().len() as i64 > ctx.like_pattern_limit() {
        return Err(Error::with_message(
            ErrorCode::Error,
            "LIKE or GLOB pattern too complex",
        ));
    }

    let escape = match args.get(2) {
        None => None,
        Some(Value::Null) => return Ok(Value::Null),
        Some(esc) => {
            let esc = esc.to_text();
            let mut chars = esc.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => {
                    return Err(Error::with_message(
                        ErrorCode::Error,
                        "ESCAPE expression must be a single character",
                    ))
                }
            }
        }
    };

    if pattern.is_null() || text.is_null() {
        return Ok(Value::Null);
    }
    let matched = like_compare(&pattern.to_text(), &text.to_text(), escape, fold);
    Ok(Value::Integer(matched as i64))
}

/// like_sl(PATTERN, S[, ESC])
pub fn func_like_sl(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    like_with(ctx, args, to_lower_sl)
}

/// like_slna(PATTERN, S[, ESC])
pub fn func_like_slna(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    like_with(ctx, args, to_lower_deaccent_sl)
}

// ============================================================================
// Registration
// ============================================================================

/// Install the sub-Latin collations and functions
///
/// With `LIKE` or `NA_LIKE` the built-in NOCASE, upper, lower and like are
/// overridden as well. `NA_LIKE` wins when both are given.
pub fn register_sublatin(registry: &mut FunctionRegistry, flags: SubLatinFlags) -> Result<()> {
    let det = FuncFlags::UTF8 | FuncFlags::DETERMINISTIC;
    let like = det | FuncFlags::LIKE;

    registry.create_collation("NOCASE_SLNA", nocase_slna)?;
    registry.create_collation("NOCASE_SL", nocase_sl)?;

    registry.create_function("upper_sl", 1, det, func_upper_sl)?;
    registry.create_function("lower_sl", 1, det, func_lower_sl)?;
    registry.create_function("lower_slna", 1, det, func_lower_slna)?;
    registry.create_function("deaccent_sl", 1, det, func_deaccent_sl)?;
    for n_arg in [2, 3] {
        registry.create_function("like_sl", n_arg, like, func_like_sl)?;
        registry.create_function("like_slna", n_arg, like, func_like_slna)?;
    }

    if flags.intersects(SubLatinFlags::LIKE | SubLatinFlags::NA_LIKE) {
        registry.create_collation("NOCASE", nocase_sl)?;
        registry.create_function("upper", 1, det, func_upper_sl)?;
        registry.create_function("lower", 1, det, func_lower_sl)?;

        let like_func: ScalarFunc = if flags.contains(SubLatinFlags::NA_LIKE) {
            func_like_slna
        } else {
            func_like_sl
        };
        for n_arg in [2, 3] {
            registry.create_function("like", n_arg, like, like_func)?;
        }
    }

    tracing::debug!(flags = flags.bits(), "sublatin module registered");
    Ok(())
}
