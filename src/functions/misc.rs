//! Statement-scoped helpers: running totals, change counts and strright

use crate::error::Result;
use crate::types::{ColumnType, Value};

use super::context::FunctionContext;
use super::string::right_chars;

/// Running total kept in auxdata slot 0
#[derive(Debug, Clone, Copy, PartialEq)]
enum Running {
    Int(i64),
    Real(f64),
}

impl Running {
    fn seed(start: &Value) -> Self {
        match start.column_type() {
            ColumnType::Integer => Running::Int(start.to_i64()),
            ColumnType::Null => Running::Real(0.0),
            _ => Running::Real(start.to_f64()),
        }
    }

    fn add(self, x: &Value) -> Self {
        match (self, x.column_type()) {
            (_, ColumnType::Null) => self,
            (Running::Int(acc), ColumnType::Integer) => match acc.checked_add(x.to_i64()) {
                Some(sum) => Running::Int(sum),
                None => Running::Real(acc as f64 + x.to_f64()),
            },
            (Running::Int(acc), _) => Running::Real(acc as f64 + x.to_f64()),
            (Running::Real(acc), _) => Running::Real(acc + x.to_f64()),
        }
    }

    fn value(self) -> Value {
        match self {
            Running::Int(n) => Value::Integer(n),
            Running::Real(f) => Value::Real(f),
        }
    }
}

/// accumulate(START, X) - running sum of X over the rows of a statement
pub fn func_accumulate(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let start = args.first().unwrap_or(&Value::Null);
    let x = args.get(1).unwrap_or(&Value::Null);
    let total = ctx
        .get_auxdata::<Running>(0)
        .copied()
        .unwrap_or_else(|| Running::seed(start))
        .add(x);
    ctx.set_auxdata(0, total);
    Ok(total.value())
}

/// last_rows_affected() - rows changed by the previous statement
pub fn func_last_rows_affected(ctx: &mut FunctionContext, _args: &[Value]) -> Result<Value> {
    Ok(Value::Integer(ctx.changes()))
}

/// strright(S, N) - last N characters of S
pub fn func_strright(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let s = args.first().map(Value::to_text).unwrap_or_default();
    let n = args.get(1).map_or(0, Value::to_i64);
    Ok(Value::Text(right_chars(&s, n).to_string()))
}
