use crate::core::{NativeFunction, ScopeRef, Value};
use crate::error::JSError;
use indexmap::IndexMap;
use std::rc::Rc;

fn native(name: &'static str, func: fn(&[Value]) -> Result<Value, JSError>) -> Value {
    Value::Native(Rc::new(NativeFunction { name, func }))
}

/// Create the Object namespace: `keys`, `values` and `entries`, all in
/// insertion order. Arrays are accepted too and enumerate their indexes.
pub fn initialize_object(scope: &ScopeRef) {
    let mut object = IndexMap::new();
    object.insert("keys".to_string(), native("keys", object_keys));
    object.insert("values".to_string(), native("values", object_values));
    object.insert("entries".to_string(), native("entries", object_entries));
    scope.declare("Object", Value::new_object(object), false);
}

fn object_keys(args: &[Value]) -> Result<Value, JSError> {
    let keys = match args.first() {
        Some(Value::Object(props)) => {
            props.borrow().keys().map(|k| Value::String(k.clone())).collect()
        }
        Some(Value::Array(elements)) => {
            (0..elements.borrow().len()).map(|i| Value::String(i.to_string())).collect()
        }
        _ => Vec::new(),
    };
    Ok(Value::new_array(keys))
}

fn object_values(args: &[Value]) -> Result<Value, JSError> {
    let values = match args.first() {
        Some(Value::Object(props)) => props.borrow().values().cloned().collect(),
        Some(Value::Array(elements)) => elements.borrow().clone(),
        _ => Vec::new(),
    };
    Ok(Value::new_array(values))
}

fn object_entries(args: &[Value]) -> Result<Value, JSError> {
    let entries = match args.first() {
        Some(Value::Object(props)) => props
            .borrow()
            .iter()
            .map(|(k, v)| Value::new_array(vec![Value::String(k.clone()), v.clone()]))
            .collect(),
        Some(Value::Array(elements)) => elements
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, v)| Value::new_array(vec![Value::String(i.to_string()), v.clone()]))
            .collect(),
        _ => Vec::new(),
    };
    Ok(Value::new_array(entries))
}
