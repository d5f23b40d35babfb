use crate::core::{NativeFunction, ScopeRef, Value, value_to_string};
use crate::error::JSError;
use crate::raise_type_error;
use indexmap::IndexMap;
use std::rc::Rc;

fn native(name: &'static str, func: fn(&[Value]) -> Result<Value, JSError>) -> Value {
    Value::Native(Rc::new(NativeFunction { name, func }))
}

/// Create the JSON object with `stringify` and `parse`, bridged through
/// serde_json.
pub fn initialize_json(scope: &ScopeRef) {
    let mut json = IndexMap::new();
    json.insert("stringify".to_string(), native("stringify", json_stringify));
    json.insert("parse".to_string(), native("parse", json_parse));
    scope.declare("JSON", Value::new_object(json), false);
}

/// Values JSON cannot represent follow the usual rules: `undefined` and
/// functions are dropped from objects and become `null` in arrays, and a
/// top-level one makes the whole call return `undefined`. Non-finite
/// numbers serialize as `null`.
fn json_stringify(args: &[Value]) -> Result<Value, JSError> {
    let subject = args.first().unwrap_or(&Value::Undefined);
    match to_json(subject) {
        Some(json) => Ok(Value::String(json.to_string())),
        None => Ok(Value::Undefined),
    }
}

fn to_json(value: &Value) -> Option<serde_json::Value> {
    match value {
        Value::Number(n) => Some(
            serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        ),
        Value::String(s) => Some(serde_json::Value::String(s.clone())),
        Value::Boolean(b) => Some(serde_json::Value::Bool(*b)),
        Value::Null => Some(serde_json::Value::Null),
        Value::Undefined | Value::Closure(_) | Value::Native(_) => None,
        Value::Array(elements) => {
            let items = elements
                .borrow()
                .iter()
                .map(|v| to_json(v).unwrap_or(serde_json::Value::Null))
                .collect();
            Some(serde_json::Value::Array(items))
        }
        Value::Object(props) => {
            let mut map = serde_json::Map::new();
            for (key, value) in props.borrow().iter() {
                if let Some(json) = to_json(value) {
                    map.insert(key.clone(), json);
                }
            }
            Some(serde_json::Value::Object(map))
        }
    }
}

/// Parse errors surface as catchable type errors so scripts can guard
/// untrusted input with `try`.
fn json_parse(args: &[Value]) -> Result<Value, JSError> {
    let text = value_to_string(args.first().unwrap_or(&Value::Undefined));
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| raise_type_error!("Unexpected token in JSON: {}", e))?;
    Ok(from_json(&json))
}

fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::new_array(items.iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => {
            let mut props = IndexMap::new();
            for (key, value) in map {
                props.insert(key.clone(), from_json(value));
            }
            Value::new_object(props)
        }
    }
}
