//! SQL functions: math, string, geospatial, statistical aggregates

pub mod aggregate;
pub mod context;
pub mod geo;
pub mod math;
pub mod misc;
pub mod registry;
pub mod string;

pub use aggregate::{AggregateState, VarianceKind};
pub use context::FunctionContext;
pub use registry::{
    AggregateDef, AggregateFactory, CollationFunc, EntryKind, FuncDef, FunctionRegistry,
    ScalarFunc,
};
