use crate::core::{NativeFunction, ScopeRef, Value};
use crate::error::JSError;
use indexmap::IndexMap;
use std::rc::Rc;

/// Create the Array namespace. Only `isArray` for now; arrays themselves
/// answer `length` and element access in the evaluator.
pub fn initialize_array(scope: &ScopeRef) {
    let mut array = IndexMap::new();
    array.insert(
        "isArray".to_string(),
        Value::Native(Rc::new(NativeFunction { name: "isArray", func: array_is_array })),
    );
    scope.declare("Array", Value::new_object(array), false);
}

fn array_is_array(args: &[Value]) -> Result<Value, JSError> {
    Ok(Value::Boolean(matches!(args.first(), Some(Value::Array(_)))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_arrays_answer_true() {
        assert!(matches!(
            array_is_array(&[Value::new_array(vec![])]).unwrap(),
            Value::Boolean(true)
        ));
        assert!(matches!(
            array_is_array(&[Value::new_object(IndexMap::new())]).unwrap(),
            Value::Boolean(false)
        ));
        assert!(matches!(array_is_array(&[]).unwrap(), Value::Boolean(false)));
    }
}
