//! Shared helpers: logging and the ordered multiset

pub mod log;
pub mod multiset;

pub use log::{clear_log_callback, config_log, ext_log, LogLevel};
pub use multiset::{int_cmp, real_cmp, OrderedMultiset};
