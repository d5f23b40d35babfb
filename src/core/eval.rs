use crate::{
    JSError,
    core::{
        AssignOp, BinaryOp, ClosureData, DeclKind, Expr, ForBinding, Program, Scope, ScopeRef,
        Statement, UpdateOp, Value, is_truthy, loose_equals, strict_equals, to_number,
        value_to_string,
    },
    raise_type_error,
};
use std::cell::Cell;
use std::rc::Rc;

const MAX_CALL_DEPTH: usize = 200;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII counter for closure-call nesting. Thrown values unwind through the
/// `?` chain, so the decrement has to live in a destructor.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<DepthGuard, JSError> {
        CALL_DEPTH.with(|d| d.set(d.get() + 1));
        let guard = DepthGuard;
        let depth = CALL_DEPTH.with(|d| d.get());
        if depth > MAX_CALL_DEPTH {
            Err(JSError::StackOverflow { depth })
        } else {
            Ok(guard)
        }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// How a statement finished. Thrown values are not a variant here; they
/// travel on the `Err` channel as [`JSError::Throw`] so that `?` unwinds
/// them to the nearest `try`.
#[derive(Debug)]
pub enum Completion {
    Normal(Value),
    Break,
    Continue,
    Return(Value),
}

/// Run a whole program in the given scope. The result is the value of the
/// last expression statement or `return` statement executed at the top
/// level; a top-level `return` records its value but does not stop the
/// program. Stray `break`/`continue` at the top level are ignored.
pub fn execute_program(program: &Program, scope: &ScopeRef) -> Result<Value, JSError> {
    let mut last: Option<Value> = None;
    for statement in &program.body {
        match execute_statement(statement, scope)? {
            Completion::Normal(value) => {
                if matches!(statement, Statement::Expr(_)) {
                    last = Some(value);
                }
            }
            Completion::Return(value) => last = Some(value),
            Completion::Break | Completion::Continue => {}
        }
    }
    Ok(last.unwrap_or(Value::Undefined))
}

/// Run statements in order, stopping at the first non-normal completion.
fn execute_statements(statements: &[Statement], scope: &ScopeRef) -> Result<Completion, JSError> {
    for statement in statements {
        let completion = execute_statement(statement, scope)?;
        if !matches!(completion, Completion::Normal(_)) {
            return Ok(completion);
        }
    }
    Ok(Completion::Normal(Value::Undefined))
}

fn execute_statement(statement: &Statement, scope: &ScopeRef) -> Result<Completion, JSError> {
    match statement {
        Statement::Empty => Ok(Completion::Normal(Value::Undefined)),
        // Blocks run in the enclosing scope; only function calls and
        // catch clauses introduce a new one.
        Statement::Block(body) => execute_statements(body, scope),
        Statement::VariableDeclaration { kind, declarations } => {
            for (name, init) in declarations {
                let value = evaluate_expr(init, scope)?;
                log::trace!("declare {} {} = {:?}", if *kind == DeclKind::Const { "const" } else { "let" }, name, value);
                scope.declare(name, value, *kind == DeclKind::Const);
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::FunctionDeclaration(name, params, body) => {
            let closure = Value::Closure(Rc::new(ClosureData {
                name: Some(name.clone()),
                params: params.clone(),
                body: body.clone(),
                env: scope.clone(),
            }));
            scope.declare(name, closure, false);
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::If(test, consequent, alternate) => {
            if is_truthy(&evaluate_expr(test, scope)?) {
                execute_statement(consequent, scope)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, scope)
            } else {
                Ok(Completion::Normal(Value::Undefined))
            }
        }
        Statement::While(test, body) => {
            while is_truthy(&evaluate_expr(test, scope)?) {
                match execute_statement(body, scope)? {
                    Completion::Break => break,
                    Completion::Continue | Completion::Normal(_) => {}
                    done @ Completion::Return(_) => return Ok(done),
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::DoWhile(body, test) => {
            loop {
                match execute_statement(body, scope)? {
                    Completion::Break => break,
                    Completion::Continue | Completion::Normal(_) => {}
                    done @ Completion::Return(_) => return Ok(done),
                }
                if !is_truthy(&evaluate_expr(test, scope)?) {
                    break;
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::For { init, test, update, body } => {
            if let Some(init) = init {
                execute_statement(init, scope)?;
            }
            loop {
                if let Some(test) = test {
                    if !is_truthy(&evaluate_expr(test, scope)?) {
                        break;
                    }
                }
                match execute_statement(body, scope)? {
                    Completion::Break => break,
                    Completion::Continue | Completion::Normal(_) => {}
                    done @ Completion::Return(_) => return Ok(done),
                }
                if let Some(update) = update {
                    evaluate_expr(update, scope)?;
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::ForIn(binding, right, body) => {
            let source = evaluate_expr(right, scope)?;
            let keys: Vec<Value> = match &source {
                Value::Object(props) => {
                    props.borrow().keys().map(|k| Value::String(k.clone())).collect()
                }
                Value::Array(elements) => {
                    (0..elements.borrow().len()).map(|i| Value::String(i.to_string())).collect()
                }
                _ => Vec::new(),
            };
            run_iteration_loop(binding, keys, body, scope)
        }
        Statement::ForOf(binding, right, body) => {
            let source = evaluate_expr(right, scope)?;
            let items: Vec<Value> = match &source {
                Value::Array(elements) => elements.borrow().clone(),
                Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
                _ => Vec::new(),
            };
            run_iteration_loop(binding, items, body, scope)
        }
        Statement::Switch(discriminant, cases, default_body) => {
            let subject = evaluate_expr(discriminant, scope)?;
            let mut matched = false;
            for (test, body) in cases {
                let candidate = evaluate_expr(test, scope)?;
                if matched || strict_equals(&subject, &candidate) {
                    matched = true;
                    match execute_statements(body, scope)? {
                        Completion::Break => return Ok(Completion::Normal(Value::Undefined)),
                        Completion::Normal(_) => {}
                        done => return Ok(done),
                    }
                }
            }
            if !matched {
                if let Some(body) = default_body {
                    match execute_statements(body, scope)? {
                        Completion::Break => return Ok(Completion::Normal(Value::Undefined)),
                        Completion::Normal(_) => {}
                        done => return Ok(done),
                    }
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        Statement::Try { block, handler, finalizer } => {
            execute_try(block, handler.as_ref(), finalizer.as_deref(), scope)
        }
        Statement::Throw(argument) => {
            let value = evaluate_expr(argument, scope)?;
            Err(JSError::Throw { value })
        }
        Statement::Break => Ok(Completion::Break),
        Statement::Continue => Ok(Completion::Continue),
        Statement::Return(argument) => {
            let value = evaluate_expr(argument, scope)?;
            Ok(Completion::Return(value))
        }
        Statement::Expr(expr) => Ok(Completion::Normal(evaluate_expr(expr, scope)?)),
    }
}

/// Shared body of `for...in` / `for...of`: bind each item in turn and run
/// the body in the enclosing scope. Iteration walks a snapshot taken before
/// the first pass, so the body mutating the source does not disturb it.
fn run_iteration_loop(
    binding: &ForBinding,
    items: Vec<Value>,
    body: &Statement,
    scope: &ScopeRef,
) -> Result<Completion, JSError> {
    for item in items {
        match binding {
            ForBinding::Declaration(kind, name) => {
                scope.declare(name, item, *kind == DeclKind::Const)
            }
            ForBinding::Identifier(name) => scope.assign(name, item)?,
        }
        match execute_statement(body, scope)? {
            Completion::Break => break,
            Completion::Continue | Completion::Normal(_) => {}
            done @ Completion::Return(_) => return Ok(done),
        }
    }
    Ok(Completion::Normal(Value::Undefined))
}

/// `try`/`catch`/`finally`. Only thrown values and type errors are
/// catchable; the catch clause binds the thrown value in a fresh child
/// scope. A finalizer always runs, and its own abrupt completion (or
/// error) replaces whatever the protected block produced.
fn execute_try(
    block: &[Statement],
    handler: Option<&(String, Vec<Statement>)>,
    finalizer: Option<&[Statement]>,
    scope: &ScopeRef,
) -> Result<Completion, JSError> {
    let mut outcome = execute_statements(block, scope);

    if let Err(err) = &outcome {
        if err.is_catchable() {
            if let Some((param, body)) = handler {
                let catch_scope = Scope::child(scope);
                catch_scope.declare(param, err.thrown_value(), false);
                outcome = execute_statements(body, &catch_scope);
            }
        }
    }

    if let Some(finalizer) = finalizer {
        match execute_statements(finalizer, scope)? {
            Completion::Normal(_) => {}
            done => return Ok(done),
        }
    }

    outcome
}

pub fn evaluate_expr(expr: &Expr, scope: &ScopeRef) -> Result<Value, JSError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::StringLit(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Identifier(name) => Ok(scope.lookup(name).unwrap_or(Value::Undefined)),
        Expr::Binary(left, BinaryOp::LogicalAnd, right) => {
            // Short-circuit forms yield the deciding operand, not a boolean.
            let left = evaluate_expr(left, scope)?;
            if is_truthy(&left) { evaluate_expr(right, scope) } else { Ok(left) }
        }
        Expr::Binary(left, BinaryOp::LogicalOr, right) => {
            let left = evaluate_expr(left, scope)?;
            if is_truthy(&left) { Ok(left) } else { evaluate_expr(right, scope) }
        }
        Expr::Binary(left, op, right) => {
            let left = evaluate_expr(left, scope)?;
            let right = evaluate_expr(right, scope)?;
            Ok(apply_binary(*op, &left, &right))
        }
        Expr::Assignment(op, target, value) => {
            let target = resolve_target(target, scope)?;
            let mut value = evaluate_expr(value, scope)?;
            if let Some(binary) = compound_op(*op) {
                let current = target_read(&target, scope)?;
                value = apply_binary(binary, &current, &value);
            }
            target_write(&target, value.clone(), scope)?;
            Ok(value)
        }
        Expr::Update(op, target, prefix) => {
            let target = resolve_target(target, scope)?;
            let old = to_number(&target_read(&target, scope)?);
            let new = match op {
                UpdateOp::Increment => old + 1.0,
                UpdateOp::Decrement => old - 1.0,
            };
            target_write(&target, Value::Number(new), scope)?;
            Ok(Value::Number(if *prefix { new } else { old }))
        }
        Expr::Call(callee, arg_exprs) => {
            let callee_name = call_site_name(callee);
            let function = evaluate_expr(callee, scope)?;
            let mut args = Vec::with_capacity(arg_exprs.len());
            for arg in arg_exprs {
                args.push(evaluate_expr(arg, scope)?);
            }
            call_function(&function, &args, &callee_name)
        }
        Expr::Property(object, name) => {
            let object = evaluate_expr(object, scope)?;
            read_member(&object, &Value::String(name.clone()))
        }
        Expr::Index(object, key) => {
            let object = evaluate_expr(object, scope)?;
            let key = evaluate_expr(key, scope)?;
            read_member(&object, &key)
        }
        Expr::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(evaluate_expr(element, scope)?);
            }
            Ok(Value::new_array(values))
        }
        Expr::Object(properties) => {
            let mut map = indexmap::IndexMap::new();
            for (key, value) in properties {
                map.insert(key.clone(), evaluate_expr(value, scope)?);
            }
            Ok(Value::new_object(map))
        }
    }
}

fn compound_op(op: AssignOp) -> Option<BinaryOp> {
    match op {
        AssignOp::Assign => None,
        AssignOp::AddAssign => Some(BinaryOp::Add),
        AssignOp::SubAssign => Some(BinaryOp::Sub),
        AssignOp::MulAssign => Some(BinaryOp::Mul),
        AssignOp::DivAssign => Some(BinaryOp::Div),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        // `+` concatenates when either side is a string, otherwise adds.
        BinaryOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", value_to_string(left), value_to_string(right)))
            }
            _ => Value::Number(to_number(left) + to_number(right)),
        },
        BinaryOp::Sub => Value::Number(to_number(left) - to_number(right)),
        BinaryOp::Mul => Value::Number(to_number(left) * to_number(right)),
        BinaryOp::Div => Value::Number(to_number(left) / to_number(right)),
        BinaryOp::Mod => Value::Number(to_number(left) % to_number(right)),
        BinaryOp::Equal => Value::Boolean(loose_equals(left, right)),
        BinaryOp::NotEqual => Value::Boolean(!loose_equals(left, right)),
        BinaryOp::StrictEqual => Value::Boolean(strict_equals(left, right)),
        BinaryOp::StrictNotEqual => Value::Boolean(!strict_equals(left, right)),
        BinaryOp::LessThan => compare(left, right, |o| o == std::cmp::Ordering::Less),
        BinaryOp::GreaterThan => compare(left, right, |o| o == std::cmp::Ordering::Greater),
        BinaryOp::LessEqual => compare(left, right, |o| o != std::cmp::Ordering::Greater),
        BinaryOp::GreaterEqual => compare(left, right, |o| o != std::cmp::Ordering::Less),
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            // Handled by the short-circuit arms in evaluate_expr.
            Value::Undefined
        }
    }
}

/// Relational comparison: two strings compare lexicographically, any other
/// pairing compares numerically. NaN on either side makes every relation
/// false.
fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (left, right) {
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    };
    Value::Boolean(ordering.is_some_and(test))
}

/// An assignment target resolved to a concrete location: a named binding,
/// or a container/key pair. Member targets evaluate their object and key
/// expressions exactly once here, so a compound assignment or update reads
/// and writes the same slot and key side effects run once.
enum ResolvedTarget {
    Binding(String),
    Member { container: Value, key: Value },
}

fn resolve_target(target: &Expr, scope: &ScopeRef) -> Result<ResolvedTarget, JSError> {
    match target {
        Expr::Identifier(name) => Ok(ResolvedTarget::Binding(name.clone())),
        Expr::Property(object, name) => Ok(ResolvedTarget::Member {
            container: evaluate_expr(object, scope)?,
            key: Value::String(name.clone()),
        }),
        Expr::Index(object, key) => Ok(ResolvedTarget::Member {
            container: evaluate_expr(object, scope)?,
            key: evaluate_expr(key, scope)?,
        }),
        other => Err(raise_type_error!("Invalid assignment target {:?}", other)),
    }
}

fn target_read(target: &ResolvedTarget, scope: &ScopeRef) -> Result<Value, JSError> {
    match target {
        ResolvedTarget::Binding(name) => Ok(scope.lookup(name).unwrap_or(Value::Undefined)),
        ResolvedTarget::Member { container, key } => read_member(container, key),
    }
}

fn target_write(target: &ResolvedTarget, value: Value, scope: &ScopeRef) -> Result<(), JSError> {
    match target {
        ResolvedTarget::Binding(name) => scope.assign(name, value),
        ResolvedTarget::Member { container, key } => write_member(container, key, value),
    }
}

/// Member read over the built-in containers. Arrays answer numeric indexes
/// and `length`, strings answer numeric indexes (one-character strings) and
/// `length`, objects answer any key via its string form. Missing members
/// are `undefined`; reading through null or undefined is a type error.
pub fn read_member(container: &Value, key: &Value) -> Result<Value, JSError> {
    let key_str = value_to_string(key);
    match container {
        Value::Null | Value::Undefined => Err(raise_type_error!(
            "Cannot read properties of {} (reading '{}')",
            container.type_name(),
            key_str
        )),
        Value::Array(elements) => {
            if key_str == "length" {
                return Ok(Value::Number(elements.borrow().len() as f64));
            }
            match key_str.parse::<usize>() {
                Ok(index) => Ok(elements.borrow().get(index).cloned().unwrap_or(Value::Undefined)),
                Err(_) => Ok(Value::Undefined),
            }
        }
        Value::String(s) => {
            if key_str == "length" {
                return Ok(Value::Number(s.chars().count() as f64));
            }
            match key_str.parse::<usize>() {
                Ok(index) => Ok(s
                    .chars()
                    .nth(index)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Undefined)),
                Err(_) => Ok(Value::Undefined),
            }
        }
        Value::Object(props) => {
            Ok(props.borrow().get(&key_str).cloned().unwrap_or(Value::Undefined))
        }
        other => Err(raise_type_error!(
            "Cannot read property '{}' of a {}",
            key_str,
            other.type_name()
        )),
    }
}

// The JS array-length ceiling (2^32 - 1). Length and index writes beyond
// it are rejected before any allocation is attempted.
const MAX_ARRAY_LENGTH: f64 = 4_294_967_295.0;

/// Member write. Writing past the end of an array fills the gap with
/// `undefined`; assigning `length` truncates or extends in kind. A length
/// or index outside the array-length limit is a catchable type error.
pub fn write_member(container: &Value, key: &Value, value: Value) -> Result<(), JSError> {
    let key_str = value_to_string(key);
    match container {
        Value::Array(elements) => {
            if key_str == "length" {
                let new_len = to_number(&value);
                if new_len.is_nan()
                    || new_len < 0.0
                    || new_len.fract() != 0.0
                    || new_len > MAX_ARRAY_LENGTH
                {
                    return Err(raise_type_error!("Invalid array length"));
                }
                elements.borrow_mut().resize(new_len as usize, Value::Undefined);
                return Ok(());
            }
            match key_str.parse::<usize>() {
                Ok(index) if (index as f64) < MAX_ARRAY_LENGTH => {
                    let mut elements = elements.borrow_mut();
                    if index >= elements.len() {
                        elements.resize(index + 1, Value::Undefined);
                    }
                    elements[index] = value;
                    Ok(())
                }
                _ => Err(raise_type_error!("Invalid array index '{}'", key_str)),
            }
        }
        Value::Object(props) => {
            props.borrow_mut().insert(key_str, value);
            Ok(())
        }
        other => Err(raise_type_error!(
            "Cannot set property '{}' of a {}",
            key_str,
            other.type_name()
        )),
    }
}

/// A readable name for call diagnostics, derived from the callee shape.
fn call_site_name(callee: &Expr) -> String {
    match callee {
        Expr::Identifier(name) => name.clone(),
        Expr::Property(_, name) => name.clone(),
        _ => "(expression)".to_string(),
    }
}

/// Invoke a callable value. Closures run their body in a fresh child scope
/// of the environment captured at declaration, with parameters bound
/// positionally (missing arguments become `undefined`, extras are dropped).
/// The first `return` decides the result; falling off the end yields
/// `undefined`.
pub fn call_function(function: &Value, args: &[Value], name: &str) -> Result<Value, JSError> {
    match function {
        Value::Closure(closure) => {
            let _guard = DepthGuard::enter()?;
            log::trace!("call {} with {} args", name, args.len());
            let call_scope = Scope::child(&closure.env);
            for (i, param) in closure.params.iter().enumerate() {
                let arg = args.get(i).cloned().unwrap_or(Value::Undefined);
                call_scope.declare(param, arg, false);
            }
            match execute_statements(&closure.body, &call_scope)? {
                Completion::Return(value) => Ok(value),
                _ => Ok(Value::Undefined),
            }
        }
        Value::Native(native) => (native.func)(args),
        other => Err(raise_type_error!("{} is not a function (it is a {})", name, other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_concatenates_with_a_string_operand() {
        let sum = apply_binary(BinaryOp::Add, &Value::Number(1.0), &Value::Number(2.0));
        assert!(matches!(sum, Value::Number(n) if n == 3.0));
        let cat = apply_binary(BinaryOp::Add, &Value::String("n=".into()), &Value::Number(2.0));
        assert!(matches!(cat, Value::String(s) if s == "n=2"));
    }

    #[test]
    fn relational_operators_on_strings_and_nan() {
        let lt = apply_binary(BinaryOp::LessThan, &Value::String("apple".into()), &Value::String("pear".into()));
        assert!(matches!(lt, Value::Boolean(true)));
        let nan = apply_binary(BinaryOp::LessEqual, &Value::Number(f64::NAN), &Value::Number(1.0));
        assert!(matches!(nan, Value::Boolean(false)));
    }

    #[test]
    fn member_read_of_null_is_a_type_error() {
        let err = read_member(&Value::Null, &Value::String("x".into())).unwrap_err();
        assert!(err.is_catchable());
        assert!(err.to_string().contains("Cannot read properties of null"));
    }

    #[test]
    fn array_writes_extend_with_undefined() {
        let array = Value::new_array(vec![Value::Number(1.0)]);
        write_member(&array, &Value::Number(3.0), Value::Number(9.0)).unwrap();
        assert!(matches!(read_member(&array, &Value::Number(2.0)).unwrap(), Value::Undefined));
        assert!(matches!(read_member(&array, &Value::String("length".into())).unwrap(), Value::Number(n) if n == 4.0));
    }

    #[test]
    fn oversized_array_writes_are_rejected() {
        let array = Value::new_array(vec![Value::Number(1.0)]);
        let err = write_member(&array, &Value::String("length".into()), Value::Number(1e20))
            .unwrap_err();
        assert!(err.is_catchable());
        let err = write_member(&array, &Value::Number(9.0e18), Value::Number(1.0)).unwrap_err();
        assert!(err.is_catchable());
        assert!(matches!(
            read_member(&array, &Value::String("length".into())).unwrap(),
            Value::Number(n) if n == 1.0
        ));
    }

    #[test]
    fn string_indexing_and_length() {
        let s = Value::String("hey".into());
        assert!(matches!(read_member(&s, &Value::Number(1.0)).unwrap(), Value::String(c) if c == "e"));
        assert!(matches!(read_member(&s, &Value::String("length".into())).unwrap(), Value::Number(n) if n == 3.0));
        assert!(matches!(read_member(&s, &Value::Number(9.0)).unwrap(), Value::Undefined));
    }

    #[test]
    fn calling_a_non_function_names_the_callee() {
        let err = call_function(&Value::Number(4.0), &[], "four").unwrap_err();
        assert!(err.to_string().contains("four is not a function"), "got: {}", err);
    }
}
