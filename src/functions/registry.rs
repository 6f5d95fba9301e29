//! Function, aggregate and collation registry
//!
//! The host consults this table during name resolution the way SQLite
//! consults `db->aFunc` and `db->pDfltColl`. Names are case-insensitive and
//! a second registration of the same name/arity replaces the first.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Error, ErrorCode, Result};
use crate::types::{FuncFlags, Value};

use super::aggregate::AggregateState;
use super::context::FunctionContext;

// ============================================================================
// Callback Types
// ============================================================================

/// Scalar function implementation
pub type ScalarFunc = fn(&mut FunctionContext, &[Value]) -> Result<Value>;

/// Builds a fresh aggregate accumulator for one group
pub type AggregateFactory = fn() -> AggregateState;

/// Collating sequence
pub type CollationFunc = fn(&str, &str) -> Ordering;

/// A registered scalar function
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,
    /// Number of arguments, or -1 for any
    pub n_arg: i32,
    pub flags: FuncFlags,
    pub func: ScalarFunc,
}

impl FuncDef {
    pub fn call(&self, ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
        (self.func)(ctx, args)
    }
}

/// A registered aggregate function
#[derive(Debug, Clone)]
pub struct AggregateDef {
    pub name: String,
    pub n_arg: i32,
    pub factory: AggregateFactory,
}

impl AggregateDef {
    /// Fresh accumulator (xStep/xFinal pair)
    pub fn start(&self) -> AggregateState {
        (self.factory)()
    }
}

/// Kind of entry, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Scalar,
    Aggregate,
    Collation,
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<(String, i32), FuncDef>,
    aggregates: HashMap<(String, i32), AggregateDef>,
    collations: HashMap<String, CollationFunc>,
}

fn fold_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn check_arity(name: &str, n_arg: i32) -> Result<()> {
    if name.is_empty() || !(-1..=127).contains(&n_arg) {
        return Err(Error::with_message(
            ErrorCode::Misuse,
            format!("bad registration for {:?}/{}", name, n_arg),
        ));
    }
    Ok(())
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// sqlite3_create_function_v2 with only xFunc set
    pub fn create_function(
        &mut self,
        name: &str,
        n_arg: i32,
        flags: FuncFlags,
        func: ScalarFunc,
    ) -> Result<()> {
        check_arity(name, n_arg)?;
        tracing::debug!(name, n_arg, flags = flags.bits(), "register scalar function");
        self.functions.insert(
            (fold_name(name), n_arg),
            FuncDef {
                name: name.to_string(),
                n_arg,
                flags,
                func,
            },
        );
        Ok(())
    }

    /// sqlite3_create_function_v2 with xStep and xFinal set
    pub fn create_aggregate(
        &mut self,
        name: &str,
        n_arg: i32,
        factory: AggregateFactory,
    ) -> Result<()> {
        check_arity(name, n_arg)?;
        tracing::debug!(name, n_arg, "register aggregate function");
        self.aggregates.insert(
            (fold_name(name), n_arg),
            AggregateDef {
                name: name.to_string(),
                n_arg,
                factory,
            },
        );
        Ok(())
    }

    /// sqlite3_create_collation_v2
    pub fn create_collation(&mut self, name: &str, compare: CollationFunc) -> Result<()> {
        check_arity(name, 0)?;
        tracing::debug!(name, "register collation");
        self.collations.insert(fold_name(name), compare);
        Ok(())
    }

    /// Exact arity first, then a variadic registration
    pub fn find_function(&self, name: &str, n_arg: i32) -> Option<&FuncDef> {
        let key = fold_name(name);
        self.functions
            .get(&(key.clone(), n_arg))
            .or_else(|| self.functions.get(&(key, -1)))
    }

    pub fn find_aggregate(&self, name: &str, n_arg: i32) -> Option<&AggregateDef> {
        let key = fold_name(name);
        self.aggregates
            .get(&(key.clone(), n_arg))
            .or_else(|| self.aggregates.get(&(key, -1)))
    }

    pub fn find_collation(&self, name: &str) -> Option<CollationFunc> {
        self.collations.get(&fold_name(name)).copied()
    }

    /// Invoke a scalar function by name
    pub fn call(&self, ctx: &mut FunctionContext, name: &str, args: &[Value]) -> Result<Value> {
        let def = self.find_function(name, args.len() as i32).ok_or_else(|| {
            Error::with_message(
                ErrorCode::Error,
                format!("no such function: {}", name),
            )
        })?;
        def.call(ctx, args)
    }

    /// Run an aggregate over `rows`, one step per row
    pub fn aggregate<'a, I>(&self, name: &str, n_arg: i32, rows: I) -> Result<Value>
    where
        I: IntoIterator<Item = &'a [Value]>,
    {
        let def = self.find_aggregate(name, n_arg).ok_or_else(|| {
            Error::with_message(
                ErrorCode::Error,
                format!("no such function: {}", name),
            )
        })?;
        let mut state = def.start();
        for row in rows {
            state.step(row)?;
        }
        state.finalize()
    }

    /// Every registered entry as (name, n_arg, kind), sorted by name
    pub fn entries(&self) -> Vec<(String, i32, EntryKind)> {
        let mut out: Vec<(String, i32, EntryKind)> = self
            .functions
            .values()
            .map(|d| (d.name.clone(), d.n_arg, EntryKind::Scalar))
            .chain(
                self.aggregates
                    .values()
                    .map(|d| (d.name.clone(), d.n_arg, EntryKind::Aggregate)),
            )
            .chain(
                self.collations
                    .keys()
                    .map(|k| (k.clone(), 2, EntryKind::Collation)),
            )
            .collect();
        out.sort_by(|a, b| {
            a.0.to_ascii_lowercase()
                .cmp(&b.0.to_ascii_lowercase())
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(_ctx: &mut FunctionContext, _args: &[Value]) -> Result<Value> {
        Ok(Value::Integer(1))
    }

    fn any(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
        Ok(Value::Integer(args.len() as i64))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut reg = FunctionRegistry::new();
        reg.create_function("Answer", 0, FuncFlags::UTF8, one).unwrap();
        assert!(reg.find_function("ANSWER", 0).is_some());
        assert!(reg.find_function("answer", 0).is_some());
        assert!(reg.find_function("answer", 1).is_none());
    }

    #[test]
    fn test_exact_arity_before_variadic() {
        let mut reg = FunctionRegistry::new();
        reg.create_function("f", -1, FuncFlags::UTF8, any).unwrap();
        reg.create_function("f", 1, FuncFlags::UTF8, one).unwrap();
        let mut ctx = FunctionContext::with_limits(1000, 100);
        assert_eq!(
            reg.call(&mut ctx, "f", &[Value::Integer(9)]).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            reg.call(&mut ctx, "f", &[Value::Null, Value::Null, Value::Null])
                .unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut reg = FunctionRegistry::new();
        reg.create_function("f", 1, FuncFlags::UTF8, one).unwrap();
        reg.create_function("F", 1, FuncFlags::DETERMINISTIC, any)
            .unwrap();
        let def = reg.find_function("f", 1).unwrap();
        assert_eq!(def.flags, FuncFlags::DETERMINISTIC);
        assert_eq!(reg.entries().len(), 1);
    }

    #[test]
    fn test_unknown_function() {
        let reg = FunctionRegistry::new();
        let mut ctx = FunctionContext::with_limits(1000, 100);
        let err = reg.call(&mut ctx, "nope", &[]).unwrap_err();
        assert_eq!(err.to_string(), "no such function: nope");
    }

    #[test]
    fn test_bad_arity_rejected() {
        let mut reg = FunctionRegistry::new();
        let err = reg
            .create_function("f", 200, FuncFlags::UTF8, one)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Misuse);
    }

    #[test]
    fn test_collation_lookup() {
        let mut reg = FunctionRegistry::new();
        reg.create_collation("rev", |a, b| b.cmp(a)).unwrap();
        let cmp = reg.find_collation("REV").unwrap();
        assert_eq!(cmp("a", "b"), Ordering::Greater);
    }
}
