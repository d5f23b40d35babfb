pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod js_array;
pub(crate) mod js_console;
pub(crate) mod js_json;
pub(crate) mod js_math;
pub(crate) mod js_object;

pub use core::{
    Completion, Expr, Program, Scope, ScopeRef, Statement, Token, Value, create_global_environment,
    evaluate_script, execute_program, parse, run, tokenize, value_to_string,
};
pub use error::JSError;
