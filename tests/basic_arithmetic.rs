use minijs::evaluate_script;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_precedence_and_grouping() {
    assert_eq!(evaluate_script("1 + 2 * 3").unwrap(), "7");
    assert_eq!(evaluate_script("(1 + 2) * 3").unwrap(), "9");
    assert_eq!(evaluate_script("10 - 4 - 3").unwrap(), "3");
    assert_eq!(evaluate_script("7 % 4").unwrap(), "3");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(evaluate_script(r#""hello" + " " + "world""#).unwrap(), "hello world");
    assert_eq!(evaluate_script(r#""n=" + 3"#).unwrap(), "n=3");
    assert_eq!(evaluate_script(r#"1 + 2 + "3""#).unwrap(), "33");
}

#[test]
fn test_numeric_coercion() {
    assert_eq!(evaluate_script(r#""5" - 2"#).unwrap(), "3");
    assert_eq!(evaluate_script(r#""3" * "4""#).unwrap(), "12");
    assert_eq!(evaluate_script(r#""abc" - 1"#).unwrap(), "NaN");
    assert_eq!(evaluate_script("1 / 0").unwrap(), "Infinity");
    assert_eq!(evaluate_script("-1 / 0").unwrap(), "-Infinity");
    assert_eq!(evaluate_script("0 / 0").unwrap(), "NaN");
}

#[test]
fn test_equality_operators() {
    assert_eq!(evaluate_script(r#"1 == "1""#).unwrap(), "true");
    assert_eq!(evaluate_script(r#"1 === "1""#).unwrap(), "false");
    assert_eq!(evaluate_script("null == undefined").unwrap(), "true");
    assert_eq!(evaluate_script("null === undefined").unwrap(), "false");
    assert_eq!(evaluate_script("true == 1").unwrap(), "true");
    assert_eq!(evaluate_script("2 !== 2").unwrap(), "false");
}

#[test]
fn test_relational_operators() {
    assert_eq!(evaluate_script("2 < 10").unwrap(), "true");
    assert_eq!(evaluate_script(r#""apple" < "pear""#).unwrap(), "true");
    assert_eq!(evaluate_script(r#""2" < 10"#).unwrap(), "true");
    assert_eq!(evaluate_script(r#""abc" < 1"#).unwrap(), "false");
}

#[test]
fn test_logical_operators_yield_operands() {
    assert_eq!(evaluate_script("0 || 5").unwrap(), "5");
    assert_eq!(evaluate_script(r#""" || "fallback""#).unwrap(), "fallback");
    assert_eq!(evaluate_script("1 && 2").unwrap(), "2");
    assert_eq!(evaluate_script("null && 2").unwrap(), "null");
}

#[test]
fn test_short_circuit_skips_right_side() {
    let script = r#"
        let touched = false;
        function touch() { touched = true; return 1; }
        false && touch();
        touched
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "false");
}

#[test]
fn test_negative_literals() {
    assert_eq!(evaluate_script("-5 + 2").unwrap(), "-3");
    assert_eq!(evaluate_script("2 * -3").unwrap(), "-6");
}
