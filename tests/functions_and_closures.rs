use minijs::evaluate_script;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_declaration_and_call() {
    let script = r#"
        function add(a, b) { return a + b; }
        add(2, 3)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "5");
}

#[test]
fn test_missing_arguments_become_undefined() {
    let script = r#"
        function probe(a, b) { return "" + a + "," + b; }
        probe(1)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "1,undefined");
}

#[test]
fn test_extra_arguments_are_dropped() {
    let script = r#"
        function first(a) { return a; }
        first(7, 8, 9)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "7");
}

#[test]
fn test_falling_off_the_end_returns_undefined() {
    let script = r#"
        function noop() { let x = 1; }
        noop()
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "undefined");
}

#[test]
fn test_closure_captures_its_declaration_environment() {
    let script = r#"
        function makeCounter() {
            let count = 0;
            function next() {
                count++;
                return count;
            }
            return next;
        }
        let counter = makeCounter();
        counter();
        counter();
        counter()
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "3");
}

#[test]
fn test_two_closures_do_not_share_state() {
    let script = r#"
        function makeCounter() {
            let count = 0;
            function next() {
                count++;
                return count;
            }
            return next;
        }
        let a = makeCounter();
        let b = makeCounter();
        a();
        a();
        "" + a() + "," + b()
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "3,1");
}

#[test]
fn test_recursion() {
    let script = r#"
        function fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        fib(10)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "55");
}

#[test]
fn test_functions_passed_as_values() {
    let script = r#"
        function twice(f, x) { return f(f(x)); }
        function inc(n) { return n + 1; }
        twice(inc, 5)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "7");
}

#[test]
fn test_calling_a_non_function_is_an_error() {
    let result = evaluate_script("let x = 4; x();");
    match result {
        Err(err) => {
            let message = err.to_string();
            assert!(message.contains("x is not a function"), "unexpected message: {}", message);
        }
        Ok(v) => panic!("Expected a type error, got {:?}", v),
    }
}

#[test]
fn test_runaway_recursion_is_stopped() {
    let script = r#"
        function loop() { return loop(); }
        loop()
    "#;
    let result = evaluate_script(script);
    match result {
        Err(err) => {
            let message = err.to_string();
            assert!(message.contains("Maximum call stack size exceeded"), "unexpected message: {}", message);
        }
        Ok(v) => panic!("Expected stack exhaustion, got {:?}", v),
    }
}

#[test]
fn test_stack_exhaustion_is_not_catchable() {
    let script = r#"
        function loop() { return loop(); }
        let caught = false;
        try { loop(); } catch (e) { caught = true; }
        caught
    "#;
    assert!(evaluate_script(script).is_err());
}

#[test]
fn test_top_level_return_records_the_result() {
    let script = r#"
        let x = 1;
        return x + 1;
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "2");
}
