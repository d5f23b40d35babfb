use crate::JSError;
use crate::core::{ScopeRef, Statement};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// A user function value: parameters, body, and the environment captured at
/// its declaration site. The captured scope stays alive for as long as the
/// closure is reachable.
pub struct ClosureData {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub env: ScopeRef,
}

/// A host capability function. The evaluator invokes it without knowing its
/// internals; the name is only used for diagnostics and display.
pub struct NativeFunction {
    pub name: &'static str,
    pub func: fn(&[Value]) -> Result<Value, JSError>,
}

#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Array(ArrayRef),
    Object(ObjectRef),
    Closure(Rc<ClosureData>),
    Native(Rc<NativeFunction>),
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Null => write!(f, "Null"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Array(elements) => write!(f, "Array(len={})", elements.borrow().len()),
            Value::Object(props) => write!(f, "Object(len={})", props.borrow().len()),
            Value::Closure(c) => write!(f, "Closure({})", c.name.as_deref().unwrap_or("<anonymous>")),
            Value::Native(n) => write!(f, "Native({})", n.name),
        }
    }
}

impl Value {
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn new_object(properties: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Closure(_) | Value::Native(_) => "function",
        }
    }
}

/// Truthiness for conditional contexts: false, 0, NaN, "", null and
/// undefined are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Null | Value::Undefined => false,
        Value::Array(_) | Value::Object(_) | Value::Closure(_) | Value::Native(_) => true,
    }
}

/// Numeric coercion used by arithmetic, relational operators and loose
/// equality: booleans become 0/1, null becomes 0, undefined becomes NaN,
/// strings parse as a float (empty string is 0, garbage is NaN). Reference
/// types coerce to NaN; the ToPrimitive detour is intentionally not
/// modelled.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Boolean(true) => 1.0,
        Value::Boolean(false) => 0.0,
        Value::Null => 0.0,
        Value::Undefined => f64::NAN,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Closure(_) | Value::Native(_) => f64::NAN,
    }
}

/// `===` / `!==`: matching types and values; arrays, objects and functions
/// compare by identity.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Array(l), Value::Array(r)) => Rc::ptr_eq(l, r),
        (Value::Object(l), Value::Object(r)) => Rc::ptr_eq(l, r),
        (Value::Closure(l), Value::Closure(r)) => Rc::ptr_eq(l, r),
        (Value::Native(l), Value::Native(r)) => Rc::ptr_eq(l, r),
        _ => false,
    }
}

/// `==` / `!=` coercion table: null and undefined equal each other, a
/// string meeting a number is compared numerically, a boolean is first
/// coerced to a number, and reference types are only equal by identity.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Undefined) | (Value::Undefined, Value::Null) => true,
        (Value::Boolean(b), other) => loose_equals(&Value::Number(if *b { 1.0 } else { 0.0 }), other),
        (other, Value::Boolean(b)) => loose_equals(other, &Value::Number(if *b { 1.0 } else { 0.0 })),
        (Value::Number(n), Value::String(_)) => *n == to_number(right),
        (Value::String(_), Value::Number(n)) => to_number(left) == *n,
        _ => strict_equals(left, right),
    }
}

/// JS-flavored number display: integral values print without a fraction,
/// NaN and the infinities by name.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else {
        format!("{}", n)
    }
}

/// ToString semantics used by string concatenation and by the display form
/// of `run`'s result: arrays join their elements with commas (null and
/// undefined elements print empty), plain objects print `[object Object]`.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Array(elements) => {
            let parts: Vec<String> = elements
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Null | Value::Undefined => String::new(),
                    other => value_to_string(other),
                })
                .collect();
            parts.join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
        Value::Closure(c) => format!("function {}() {{ ... }}", c.name.as_deref().unwrap_or("")),
        Value::Native(n) => format!("function {}() {{ [native code] }}", n.name),
    }
}
