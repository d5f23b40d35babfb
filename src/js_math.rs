use crate::core::{NativeFunction, ScopeRef, Value, to_number};
use crate::error::JSError;
use indexmap::IndexMap;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn native(name: &'static str, func: fn(&[Value]) -> Result<Value, JSError>) -> Value {
    Value::Native(Rc::new(NativeFunction { name, func }))
}

fn arg_number(args: &[Value], index: usize) -> f64 {
    to_number(args.get(index).unwrap_or(&Value::Undefined))
}

/// Create the Math object with its constants and functions.
pub fn initialize_math(scope: &ScopeRef) {
    let mut math = IndexMap::new();
    math.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
    math.insert("E".to_string(), Value::Number(std::f64::consts::E));
    math.insert("floor".to_string(), native("floor", math_floor));
    math.insert("ceil".to_string(), native("ceil", math_ceil));
    math.insert("round".to_string(), native("round", math_round));
    math.insert("abs".to_string(), native("abs", math_abs));
    math.insert("sqrt".to_string(), native("sqrt", math_sqrt));
    math.insert("pow".to_string(), native("pow", math_pow));
    math.insert("min".to_string(), native("min", math_min));
    math.insert("max".to_string(), native("max", math_max));
    math.insert("trunc".to_string(), native("trunc", math_trunc));
    math.insert("sign".to_string(), native("sign", math_sign));
    math.insert("random".to_string(), native("random", math_random));
    scope.declare("Math", Value::new_object(math), false);
}

fn math_floor(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).floor()))
}

fn math_ceil(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).ceil()))
}

fn math_round(args: &[Value]) -> Result<Value, JSError> {
    // JS rounds halves toward positive infinity, unlike f64::round.
    let n = arg_number(args, 0);
    Ok(Value::Number((n + 0.5).floor()))
}

fn math_abs(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).abs()))
}

fn math_sqrt(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).sqrt()))
}

fn math_pow(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).powf(arg_number(args, 1))))
}

fn math_min(args: &[Value]) -> Result<Value, JSError> {
    let mut best = f64::INFINITY;
    for arg in args {
        let n = to_number(arg);
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.min(n);
    }
    Ok(Value::Number(best))
}

fn math_max(args: &[Value]) -> Result<Value, JSError> {
    let mut best = f64::NEG_INFINITY;
    for arg in args {
        let n = to_number(arg);
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.max(n);
    }
    Ok(Value::Number(best))
}

fn math_trunc(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Number(arg_number(args, 0).trunc()))
}

fn math_sign(args: &[Value]) -> Result<Value, JSError> {
    let n = arg_number(args, 0);
    Ok(Value::Number(if n.is_nan() {
        f64::NAN
    } else if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        n
    }))
}

thread_local! {
    static RANDOM_STATE: Cell<u32> = const { Cell::new(0) };
}

/// Linear congruential generator (Numerical Recipes constants), seeded
/// lazily from the system clock. Plenty for scripting; not for anything
/// security sensitive.
fn math_random(_args: &[Value]) -> Result<Value, JSError> {
    let next = RANDOM_STATE.with(|state| {
        let mut s = state.get();
        if s == 0 {
            s = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(1)
                .max(1);
        }
        s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        state.set(s);
        s
    });
    Ok(Value::Number(next as f64 / 4_294_967_296.0))
}
