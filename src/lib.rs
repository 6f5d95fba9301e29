//! rustql-ext - SQLite extension modules for RustQL
//!
//! Scalar and aggregate SQL functions, the sub-Latin collations and LIKE,
//! an FTS3 tokenizer for Spanish text and an encrypting page codec. A host
//! engine installs them through [`FunctionRegistry`] with [`register_all`].

pub mod api;
pub mod error;
pub mod functions;
pub mod sublatin;
pub mod types;
pub mod util;

#[cfg(feature = "codec")]
pub mod codec;
#[cfg(feature = "fts3")]
pub mod fts3;

// Re-export main public types
pub use error::{Error, ErrorCode, Result};
pub use types::{ColumnType, FuncFlags, SubLatinFlags, Value};

pub use api::{
    ext_config, ext_config_get, libversion, register_all, register_extension_functions,
    ConfigOption,
};
pub use functions::{AggregateState, FunctionContext, FunctionRegistry};
pub use sublatin::register_sublatin;
pub use util::multiset::OrderedMultiset;
