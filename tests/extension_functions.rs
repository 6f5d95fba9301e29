//! Drives the registry the way a host engine would: register everything,
//! then resolve and call functions by name.

use std::cmp::Ordering;

use rustql_ext::api::reset_config;
use rustql_ext::{
    ext_config, register_all, ConfigOption, ErrorCode, FunctionContext, FunctionRegistry,
    SubLatinFlags, Value,
};

fn registry() -> FunctionRegistry {
    let mut reg = FunctionRegistry::new();
    register_all(&mut reg).unwrap();
    reg
}

fn call(reg: &FunctionRegistry, name: &str, args: &[Value]) -> Result<Value, String> {
    let mut ctx = FunctionContext::with_limits(1_000_000, 50_000);
    reg.call(&mut ctx, name, args).map_err(|e| e.to_string())
}

fn text(s: &str) -> Value {
    Value::from(s)
}

fn real(v: Value) -> f64 {
    match v {
        Value::Real(r) => r,
        other => panic!("expected real, got {:?}", other),
    }
}

fn column(values: &[Value]) -> Vec<&[Value]> {
    values.iter().map(std::slice::from_ref).collect()
}

#[test]
fn math_functions_by_name() {
    let reg = registry();
    assert_eq!(call(&reg, "SQRT", &[Value::Integer(81)]).unwrap(), Value::Real(9.0));
    assert_eq!(call(&reg, "ceiling", &[Value::Real(1.2)]).unwrap(), Value::Integer(2));
    assert_eq!(call(&reg, "sign", &[Value::Integer(-4)]).unwrap(), Value::Integer(-1));
    assert_eq!(call(&reg, "ln", &[Value::Null]).unwrap(), Value::Null);
    assert_eq!(call(&reg, "sqrt", &[Value::Integer(-1)]).unwrap_err(), "domain error");
    assert_eq!(call(&reg, "log", &[Value::Integer(0)]).unwrap_err(), "range error");
    assert!((real(call(&reg, "atan2", &[Value::Integer(1), Value::Integer(1)]).unwrap())
        - std::f64::consts::FRAC_PI_4)
        .abs()
        < 1e-12);
}

#[test]
fn string_functions_by_name() {
    let reg = registry();
    assert_eq!(call(&reg, "replicate", &[text("ab"), Value::Integer(3)]).unwrap(), text("ababab"));
    assert_eq!(
        call(&reg, "charindex", &[text("b"), text("abcb"), Value::Integer(3)]).unwrap(),
        Value::Integer(4)
    );
    assert_eq!(call(&reg, "leftstr", &[text("señor"), Value::Integer(3)]).unwrap(), text("señ"));
    assert_eq!(call(&reg, "padc", &[text("ab"), Value::Integer(6)]).unwrap(), text("  ab  "));
    assert_eq!(call(&reg, "proper", &[text("hELLO wORLD")]).unwrap(), text("Hello World"));
    assert_eq!(call(&reg, "soundex", &[text("Robert")]).unwrap(), text("R163"));
    assert_eq!(call(&reg, "reverse", &[text("añb")]).unwrap(), text("bña"));
}

#[test]
fn replicate_respects_length_limit() {
    let reg = registry();
    let mut ctx = FunctionContext::with_limits(10, 100);
    let err = reg
        .call(&mut ctx, "replicate", &[text("abc"), Value::Integer(4)])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TooBig);
}

#[test]
fn geo_functions_by_name() {
    let reg = registry();
    assert_eq!(
        call(&reg, "distance", &[0.into(), 0.into(), 3.into(), 4.into()]).unwrap(),
        Value::Real(5.0)
    );
    assert_eq!(
        call(&reg, "geohash", &[Value::Real(42.6), Value::Real(-5.6), Value::Integer(5)]).unwrap(),
        text("ezs42")
    );
    assert_eq!(
        call(&reg, "geohashneighbor", &[text("ezs42"), Value::Integer(5), Value::Integer(0)])
            .unwrap(),
        text("ezs43")
    );
    assert_eq!(
        call(&reg, "bearing", &[Value::Null, 0.into(), 1.into(), 1.into()]).unwrap_err(),
        "bearing requires 4 non-null numeric parameters"
    );
    let km = real(
        call(
            &reg,
            "geodistance",
            &[0.into(), 0.into(), 0.into(), 1.into(), text("K")],
        )
        .unwrap(),
    );
    assert!((km - 111.19).abs() < 0.5, "{}", km);
}

#[test]
fn aggregates_by_name() {
    let reg = registry();
    let values: Vec<Value> = [2, 4, 4, 4, 5, 5, 7, 9].iter().map(|&v| Value::Integer(v)).collect();

    assert_eq!(reg.aggregate("mode", 1, column(&values)).unwrap(), Value::Integer(4));
    assert_eq!(reg.aggregate("median", 1, column(&values)).unwrap(), Value::Real(4.5));
    let variance = real(reg.aggregate("variance", 1, column(&values)).unwrap());
    assert!((variance - 32.0 / 7.0).abs() < 1e-12);

    let with_nulls = vec![Value::Null, Value::Integer(3), Value::Null];
    assert_eq!(reg.aggregate("median", 1, column(&with_nulls)).unwrap(), Value::Integer(3));
    assert_eq!(reg.aggregate("mode", 1, column(&[])).unwrap(), Value::Null);

    let pairs = [
        vec![Value::Integer(1), Value::Integer(2)],
        vec![Value::Integer(2), Value::Integer(4)],
        vec![Value::Null, Value::Integer(9)],
        vec![Value::Integer(3), Value::Integer(6)],
    ];
    let covar = reg
        .aggregate("covar_samp", 2, pairs.iter().map(Vec::as_slice))
        .unwrap();
    assert_eq!(covar, Value::Real(2.0));
}

#[test]
fn accumulate_runs_across_rows() {
    let reg = registry();
    let mut ctx = FunctionContext::with_limits(1000, 1000);
    let mut last = Value::Null;
    for x in 1..=4 {
        last = reg
            .call(&mut ctx, "accumulate", &[Value::Integer(10), Value::Integer(x)])
            .unwrap();
    }
    assert_eq!(last, Value::Integer(20));

    ctx.set_changes(3);
    assert_eq!(reg.call(&mut ctx, "last_rows_affected", &[]).unwrap(), Value::Integer(3));
}

#[test]
fn unknown_function_is_an_error() {
    let reg = registry();
    assert_eq!(call(&reg, "no_such_thing", &[]).unwrap_err(), "no such function: no_such_thing");
    // wrong arity does not fall through to another registration
    assert!(call(&reg, "sqrt", &[1.into(), 2.into()]).is_err());
}

#[test]
fn sublatin_overrides_follow_config() {
    let plain = registry();
    assert!(plain.find_collation("NOCASE").is_none());
    assert!(plain.find_collation("nocase_slna").is_some());

    ext_config(ConfigOption::SubLatinFlags, SubLatinFlags::NA_LIKE.bits() as i64).unwrap();
    let overridden = registry();
    reset_config();

    let nocase = overridden.find_collation("NOCASE").unwrap();
    assert_eq!(nocase("ÉCOLE", "école"), Ordering::Equal);
    assert_eq!(
        call(&overridden, "like", &[text("ecole%"), text("École Normale")]).unwrap(),
        Value::Integer(1)
    );
    assert_eq!(call(&overridden, "upper", &[text("ñandú")]).unwrap(), text("ÑANDÚ"));

    assert_eq!(
        ext_config(ConfigOption::SubLatinFlags, 1 << 20).unwrap_err().code,
        ErrorCode::Misuse
    );
}
