pub mod eval;
pub mod parser;
pub mod statement;
pub mod token;
pub mod value;

pub use eval::{Completion, call_function, evaluate_expr, execute_program, read_member, write_member};
pub use parser::{AssignOp, BinaryOp, Expr, TokenStream, UpdateOp, parse_expression};
pub use statement::{DeclKind, ForBinding, Program, Statement, parse};
pub use token::{Token, strip_comments, tokenize};
pub use value::{
    ArrayRef, ClosureData, NativeFunction, ObjectRef, Value, format_number, is_truthy,
    loose_equals, strict_equals, to_number, value_to_string,
};

use crate::JSError;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub type ScopeRef = Rc<Scope>;

/// A lexical environment: a mutable set of bindings plus a pointer to the
/// enclosing scope. Closures keep their declaration scope alive through
/// this pointer, so the chain outlives the call that created it.
pub struct Scope {
    bindings: RefCell<IndexMap<String, Value>>,
    consts: RefCell<HashSet<String>>,
    parent: Option<ScopeRef>,
}

impl Scope {
    pub fn global() -> ScopeRef {
        Rc::new(Scope {
            bindings: RefCell::new(IndexMap::new()),
            consts: RefCell::new(HashSet::new()),
            parent: None,
        })
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(Scope {
            bindings: RefCell::new(IndexMap::new()),
            consts: RefCell::new(HashSet::new()),
            parent: Some(parent.clone()),
        })
    }

    /// Create or overwrite a binding in this scope. Redeclaring an
    /// existing name replaces it and updates its const status.
    pub fn declare(&self, name: &str, value: Value, is_const: bool) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
        if is_const {
            self.consts.borrow_mut().insert(name.to_string());
        } else {
            self.consts.borrow_mut().remove(name);
        }
    }

    /// Resolve a name by walking the scope chain outward.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// Assign to an existing binding wherever it lives on the chain. An
    /// unresolved name creates a new binding in this scope instead of
    /// failing; assigning to a const is a type error.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), JSError> {
        let mut current: Option<&Scope> = Some(self);
        while let Some(scope) = current {
            if scope.bindings.borrow().contains_key(name) {
                if scope.consts.borrow().contains(name) {
                    return Err(crate::raise_type_error!(
                        "Assignment to constant variable '{}'",
                        name
                    ));
                }
                scope.bindings.borrow_mut().insert(name.to_string(), value);
                return Ok(());
            }
            current = scope.parent.as_deref();
        }
        self.bindings.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }
}

/// A global scope populated with the host capabilities: `console`, `Math`,
/// `JSON`, `Object` and `Array`.
pub fn create_global_environment() -> ScopeRef {
    let scope = Scope::global();
    crate::js_console::initialize_console(&scope);
    crate::js_math::initialize_math(&scope);
    crate::js_json::initialize_json(&scope);
    crate::js_object::initialize_object(&scope);
    crate::js_array::initialize_array(&scope);
    scope
}

/// Run a script and return its result value: lex, parse, then evaluate in
/// a fresh global environment.
pub fn run(source: &str) -> Result<Value, JSError> {
    let tokens = tokenize(source)?;
    let program = parse(tokens)?;
    let scope = create_global_environment();
    execute_program(&program, &scope)
}

/// Run a script and render its result as a string. This is the primary
/// entry point used by the integration tests.
pub fn evaluate_script<T: AsRef<str>>(source: T) -> Result<String, JSError> {
    let value = run(source.as_ref())?;
    Ok(value_to_string(&value))
}
