//! Extension entry points (sqlite3_extension_init)
//!
//! `register_all` is what a host calls once per connection. The pieces are
//! public so a host can install only part of the set.

use crate::error::Result;
use crate::functions::aggregate::{AggregateState, VarianceKind};
use crate::functions::{geo, math, misc, string, FunctionRegistry, ScalarFunc};
use crate::sublatin::register_sublatin;
use crate::types::FuncFlags;

use super::config::ext_config_get;

/// Deterministic scalars: (name, n_arg, implementation)
const DETERMINISTIC_SCALARS: &[(&str, i32, ScalarFunc)] = &[
    // math
    ("acos", 1, math::func_acos),
    ("asin", 1, math::func_asin),
    ("atan", 1, math::func_atan),
    ("atn2", 2, math::func_atn2),
    ("atan2", 2, math::func_atn2),
    ("acosh", 1, math::func_acosh),
    ("asinh", 1, math::func_asinh),
    ("atanh", 1, math::func_atanh),
    ("cos", 1, math::func_cos),
    ("sin", 1, math::func_sin),
    ("tan", 1, math::func_tan),
    ("cot", 1, math::func_cot),
    ("cosh", 1, math::func_cosh),
    ("sinh", 1, math::func_sinh),
    ("tanh", 1, math::func_tanh),
    ("coth", 1, math::func_coth),
    ("exp", 1, math::func_exp),
    ("log", 1, math::func_log),
    ("ln", 1, math::func_log),
    ("log10", 1, math::func_log10),
    ("power", 2, math::func_power),
    ("sign", 1, math::func_sign),
    ("sqrt", 1, math::func_sqrt),
    ("square", 1, math::func_square),
    ("ceil", 1, math::func_ceil),
    ("ceiling", 1, math::func_ceil),
    ("floor", 1, math::func_floor),
    ("pi", 0, math::func_pi),
    ("degrees", 1, math::func_degrees),
    ("radians", 1, math::func_radians),
    ("fmod", 2, math::func_fmod),
    // string
    ("replicate", 2, string::func_replicate),
    ("charindex", 2, string::func_charindex),
    ("charindex", 3, string::func_charindex),
    ("leftstr", 2, string::func_leftstr),
    ("rightstr", 2, string::func_rightstr),
    ("strright", 2, misc::func_strright),
    ("ltrim", 1, string::func_ltrim),
    ("rtrim", 1, string::func_rtrim),
    ("trim", 1, string::func_trim),
    ("replace", 3, string::func_replace),
    ("reverse", 1, string::func_reverse),
    ("proper", 1, string::func_proper),
    ("padl", 2, string::func_padl),
    ("padr", 2, string::func_padr),
    ("padc", 2, string::func_padc),
    ("strfilter", 2, string::func_strfilter),
    ("soundex", 1, string::func_soundex),
    ("difference", 2, string::func_difference),
    // geo
    ("distance", 4, geo::func_distance),
    ("bearing", 4, geo::func_bearing),
    ("is_inside_circle", 5, geo::func_is_inside_circle),
    ("geodistance", 4, geo::func_geodistance),
    ("geodistance", 5, geo::func_geodistance),
    ("geohash", 3, geo::func_geohash),
    ("geohashneighbor", 3, geo::func_geohashneighbor),
];

/// Install the math, string, geo and misc scalars and the aggregates
pub fn register_extension_functions(registry: &mut FunctionRegistry) -> Result<()> {
    let det = FuncFlags::UTF8 | FuncFlags::DETERMINISTIC;
    for &(name, n_arg, func) in DETERMINISTIC_SCALARS {
        registry.create_function(name, n_arg, det, func)?;
    }

    // these depend on per-statement state
    registry.create_function("accumulate", 2, FuncFlags::UTF8, misc::func_accumulate)?;
    registry.create_function(
        "last_rows_affected",
        0,
        FuncFlags::UTF8,
        misc::func_last_rows_affected,
    )?;

    registry.create_aggregate("variance", 1, || AggregateState::variance(VarianceKind::Variance))?;
    registry.create_aggregate("stdev", 1, || AggregateState::variance(VarianceKind::Stdev))?;
    registry.create_aggregate("samplestdev", 1, || {
        AggregateState::variance(VarianceKind::SampleStdev)
    })?;
    registry.create_aggregate("mode", 1, || AggregateState::Mode { set: None })?;
    registry.create_aggregate("median", 1, || AggregateState::percentile(0.5))?;
    registry.create_aggregate("lower_quartile", 1, || AggregateState::percentile(0.25))?;
    registry.create_aggregate("upper_quartile", 1, || AggregateState::percentile(0.75))?;
    registry.create_aggregate("covar_samp", 2, || AggregateState::Covar {
        n: 0,
        sum_x: 0.0,
        sum_y: 0.0,
        sum_xy: 0.0,
    })?;

    tracing::debug!(
        scalars = DETERMINISTIC_SCALARS.len() + 2,
        "extension functions registered"
    );
    Ok(())
}

/// Install everything, using the configured sub-Latin flags
pub fn register_all(registry: &mut FunctionRegistry) -> Result<()> {
    register_extension_functions(registry)?;
    let flags = ext_config_get().sublatin_flags();
    register_sublatin(registry, flags)?;
    tracing::debug!(sublatin_flags = flags.bits(), "all extension modules registered");
    Ok(())
}
