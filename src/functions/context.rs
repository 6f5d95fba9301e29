//! Per-statement function context (sqlite3_context)
//!
//! One context lives for the duration of a statement at a single call site.
//! It carries the limit snapshot, the change count reported by the host and
//! auxiliary data slots that survive from one row to the next.

use std::any::Any;
use std::collections::HashMap;

use crate::api::config::ext_config_get;
use crate::error::{Error, Result};

pub struct FunctionContext {
    /// SQLITE_LIMIT_LENGTH at statement start
    max_length: i64,
    /// SQLITE_LIMIT_LIKE_PATTERN_LENGTH at statement start
    like_pattern_limit: i64,
    /// sqlite3_changes() of the owning connection
    changes: i64,
    auxdata: HashMap<i32, Box<dyn Any + Send + Sync>>,
}

impl FunctionContext {
    /// Create a context from the current global limits
    pub fn new() -> Self {
        let config = ext_config_get();
        Self::with_limits(config.max_length(), config.like_pattern_limit())
    }

    /// Create a context with explicit limits
    pub fn with_limits(max_length: i64, like_pattern_limit: i64) -> Self {
        Self {
            max_length,
            like_pattern_limit,
            changes: 0,
            auxdata: HashMap::new(),
        }
    }

    pub fn max_length(&self) -> i64 {
        self.max_length
    }

    pub fn like_pattern_limit(&self) -> i64 {
        self.like_pattern_limit
    }

    /// Fail with `TooBig` when a result of `len` bytes would exceed the limit
    pub fn check_length(&self, len: usize) -> Result<()> {
        if len as u64 > self.max_length.max(0) as u64 {
            return Err(Error::too_big());
        }
        Ok(())
    }

    /// Number of rows changed by the most recent statement
    pub fn changes(&self) -> i64 {
        self.changes
    }

    /// Called by the host after each statement completes
    pub fn set_changes(&mut self, changes: i64) {
        self.changes = changes;
    }

    /// sqlite3_get_auxdata
    pub fn get_auxdata<T: Any>(&self, n: i32) -> Option<&T> {
        self.auxdata.get(&n).and_then(|data| data.downcast_ref::<T>())
    }

    pub fn get_auxdata_mut<T: Any>(&mut self, n: i32) -> Option<&mut T> {
        self.auxdata
            .get_mut(&n)
            .and_then(|data| data.downcast_mut::<T>())
    }

    /// sqlite3_set_auxdata
    ///
    /// Any previous value in the slot is dropped.
    pub fn set_auxdata<T: Any + Send + Sync>(&mut self, n: i32, data: T) {
        self.auxdata.insert(n, Box::new(data));
    }

    /// Drop all auxiliary data, as at statement reset
    pub fn reset(&mut self) {
        self.auxdata.clear();
    }
}

impl Default for FunctionContext {
    fn default() -> Self {
        Self::new()
    }
}
