//! Math scalar functions
//!
//! Trigonometric, hyperbolic, logarithmic and rounding helpers. Every
//! function returns NULL for a NULL argument. Results that leave the real
//! line are reported as errors instead of being handed back as NaN or
//! infinity.

use std::f64::consts::PI;

use crate::error::{Error, ErrorCode, Result};
use crate::types::{ColumnType, Value};

use super::context::FunctionContext;

/// Classify a floating point result produced from `inputs`
///
/// NaN from ordinary inputs is a domain error, infinity from finite inputs a
/// range error.
fn checked(inputs: &[f64], val: f64) -> Result<Value> {
    if val.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        return Err(Error::with_message(ErrorCode::Error, "domain error"));
    }
    if val.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
        return Err(Error::with_message(ErrorCode::Error, "range error"));
    }
    Ok(Value::Real(val))
}

/// NaN cannot be stored; the host turns it into NULL
fn real_or_null(val: f64) -> Value {
    if val.is_nan() {
        Value::Null
    } else {
        Value::Real(val)
    }
}

fn arg(args: &[Value], i: usize, name: &str) -> Result<Value> {
    args.get(i).cloned().ok_or_else(|| {
        Error::with_message(
            ErrorCode::Error,
            format!("wrong number of arguments to function {}()", name),
        )
    })
}

macro_rules! unary_math {
    ($($(#[$doc:meta])* $fname:ident => $name:literal, $op:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $fname(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
                let x = arg(args, 0, $name)?;
                if x.is_null() {
                    return Ok(Value::Null);
                }
                let x = x.to_f64();
                let op: fn(f64) -> f64 = $op;
                checked(&[x], op(x))
            }
        )*
    };
}

unary_math! {
    func_acos => "acos", f64::acos;
    func_asin => "asin", f64::asin;
    func_atan => "atan", f64::atan;
    func_acosh => "acosh", f64::acosh;
    func_asinh => "asinh", f64::asinh;
    func_atanh => "atanh", f64::atanh;
    func_cos => "cos", f64::cos;
    func_sin => "sin", f64::sin;
    func_tan => "tan", f64::tan;
    /// cot(X) = 1/tan(X)
    func_cot => "cot", |x| 1.0 / x.tan();
    func_cosh => "cosh", f64::cosh;
    func_sinh => "sinh", f64::sinh;
    func_tanh => "tanh", f64::tanh;
    /// coth(X) = 1/tanh(X)
    func_coth => "coth", |x| 1.0 / x.tanh();
    func_exp => "exp", f64::exp;
    /// Natural logarithm, also registered as ln
    func_log => "log", f64::ln;
    func_log10 => "log10", f64::log10;
    func_sqrt => "sqrt", f64::sqrt;
    /// Radians to degrees
    func_degrees => "degrees", |x| 180.0 * x / PI;
    /// Degrees to radians
    func_radians => "radians", |x| x * PI / 180.0;
}

/// power(X, Y)
pub fn func_power(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (x, y) = (arg(args, 0, "power")?, arg(args, 1, "power")?);
    if x.is_null() || y.is_null() {
        return Ok(Value::Null);
    }
    let (x, y) = (x.to_f64(), y.to_f64());
    checked(&[x, y], x.powf(y))
}

/// atn2(Y, X), the angle of the point (X, Y)
pub fn func_atn2(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (y, x) = (arg(args, 0, "atn2")?, arg(args, 1, "atn2")?);
    if y.is_null() || x.is_null() {
        return Ok(Value::Null);
    }
    Ok(real_or_null(y.to_f64().atan2(x.to_f64())))
}

/// fmod(X, Y)
pub fn func_fmod(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (x, y) = (arg(args, 0, "fmod")?, arg(args, 1, "fmod")?);
    if x.is_null() || y.is_null() {
        return Ok(Value::Null);
    }
    // Rust's % on f64 has C fmod semantics
    Ok(real_or_null(x.to_f64() % y.to_f64()))
}

/// square(X), integer-valued for integer input unless it overflows
pub fn func_square(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    match arg(args, 0, "square")? {
        Value::Null => Ok(Value::Null),
        Value::Integer(n) => Ok(n
            .checked_mul(n)
            .map(Value::Integer)
            .unwrap_or_else(|| Value::Real(n as f64 * n as f64))),
        other => {
            let x = other.to_f64();
            Ok(Value::Real(x * x))
        }
    }
}

/// sign(X): -1, 0 or 1 with the storage class of X
pub fn func_sign(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    match arg(args, 0, "sign")? {
        Value::Null => Ok(Value::Null),
        Value::Integer(n) => Ok(Value::Integer(n.signum())),
        other => {
            let x = other.to_f64();
            let s = if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            };
            Ok(Value::Real(s))
        }
    }
}

fn round_to_int(name: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value> {
    let x = arg(args, 0, name)?;
    match x.column_type() {
        ColumnType::Null => Ok(Value::Null),
        ColumnType::Integer => Ok(Value::Integer(x.to_i64())),
        _ => Ok(Value::Integer(op(x.to_f64()) as i64)),
    }
}

/// ceil(X) / ceiling(X)
pub fn func_ceil(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    round_to_int("ceil", args, f64::ceil)
}

/// floor(X)
pub fn func_floor(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    round_to_int("floor", args, f64::floor)
}

/// pi()
pub fn func_pi(_ctx: &mut FunctionContext, _args: &[Value]) -> Result<Value> {
    Ok(Value::Real(PI))
}
