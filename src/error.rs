use crate::core::Value;

#[derive(thiserror::Error, Debug)]
pub enum JSError {
    #[error("Lex error: {message}")]
    LexError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("Uncaught {}", crate::core::value_to_string(.value))]
    Throw { value: Value },

    #[error("Maximum call stack size exceeded (depth {depth})")]
    StackOverflow { depth: usize },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl JSError {
    /// Whether user-level `try`/`catch` may intercept this error.
    /// Lex/parse/internal errors and stack exhaustion always escape.
    pub fn is_catchable(&self) -> bool {
        matches!(self, JSError::Throw { .. } | JSError::TypeError { .. })
    }

    /// The value a `catch (e)` clause binds for this error.
    pub fn thrown_value(&self) -> Value {
        match self {
            JSError::Throw { value } => value.clone(),
            JSError::TypeError { message } => Value::String(message.clone()),
            other => Value::String(other.to_string()),
        }
    }
}

#[macro_export]
macro_rules! raise_lex_error {
    ($($arg:tt)*) => {
        $crate::JSError::LexError { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! raise_parse_error {
    ($($arg:tt)*) => {
        $crate::JSError::ParseError { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! raise_type_error {
    ($($arg:tt)*) => {
        $crate::JSError::TypeError { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! raise_internal_error {
    ($($arg:tt)*) => {
        $crate::JSError::InternalError { message: format!($($arg)*) }
    };
}
