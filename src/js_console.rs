use crate::core::{NativeFunction, ScopeRef, Value, format_number};
use crate::error::JSError;
use indexmap::IndexMap;
use std::rc::Rc;

fn native(name: &'static str, func: fn(&[Value]) -> Result<Value, JSError>) -> Value {
    Value::Native(Rc::new(NativeFunction { name, func }))
}

/// Create the console object: `log` writes to stdout, `warn` and `error`
/// to stderr. All three return `undefined`.
pub fn initialize_console(scope: &ScopeRef) {
    let mut console = IndexMap::new();
    console.insert("log".to_string(), native("log", console_log));
    console.insert("warn".to_string(), native("warn", console_warn));
    console.insert("error".to_string(), native("error", console_error));
    scope.declare("console", Value::new_object(console), false);
}

fn console_log(args: &[Value]) -> Result<Value, JSError> {
    println!("{}", render_arguments(args));
    Ok(Value::Undefined)
}

fn console_warn(args: &[Value]) -> Result<Value, JSError> {
    eprintln!("{}", render_arguments(args));
    Ok(Value::Undefined)
}

fn console_error(args: &[Value]) -> Result<Value, JSError> {
    eprintln!("{}", render_arguments(args));
    Ok(Value::Undefined)
}

fn render_arguments(args: &[Value]) -> String {
    args.iter().map(format_console_value).collect::<Vec<_>>().join(" ")
}

/// Inspector-style rendering: bare strings at the top level, quoted inside
/// containers, arrays as `[1, 2, 3]` and objects as `{ a: 1 }`. Nesting
/// stops after one level.
pub fn format_console_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format_nested(other, 0),
    }
}

fn format_nested(value: &Value, depth: usize) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::String(s) => format!("'{}'", s),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Array(elements) => {
            if depth >= 1 {
                return "[Array]".to_string();
            }
            let parts: Vec<String> =
                elements.borrow().iter().map(|v| format_nested(v, depth + 1)).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(props) => {
            if depth >= 1 {
                return "[object Object]".to_string();
            }
            let parts: Vec<String> = props
                .borrow()
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_nested(v, depth + 1)))
                .collect();
            if parts.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", parts.join(", "))
            }
        }
        Value::Closure(c) => {
            format!("[Function: {}]", c.name.as_deref().unwrap_or("anonymous"))
        }
        Value::Native(n) => format!("[Function: {}]", n.name),
    }
}
