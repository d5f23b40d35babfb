use minijs::evaluate_script;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_math_constants() {
    let script = "Math.floor(Math.PI * 100)";
    assert_eq!(evaluate_script(script).unwrap(), "314");
}

#[test]
fn test_math_rounding_family() {
    assert_eq!(evaluate_script("Math.floor(2.7)").unwrap(), "2");
    assert_eq!(evaluate_script("Math.ceil(2.1)").unwrap(), "3");
    assert_eq!(evaluate_script("Math.round(2.5)").unwrap(), "3");
    assert_eq!(evaluate_script("Math.trunc(-2.7)").unwrap(), "-2");
}

#[test]
fn test_math_arithmetic_helpers() {
    assert_eq!(evaluate_script("Math.abs(0 - 5)").unwrap(), "5");
    assert_eq!(evaluate_script("Math.sqrt(16)").unwrap(), "4");
    assert_eq!(evaluate_script("Math.pow(2, 10)").unwrap(), "1024");
    assert_eq!(evaluate_script("Math.min(3, 1, 2)").unwrap(), "1");
    assert_eq!(evaluate_script("Math.max(3, 1, 2)").unwrap(), "3");
    assert_eq!(evaluate_script("Math.sign(0 - 9)").unwrap(), "-1");
}

#[test]
fn test_math_random_range() {
    let script = r#"
        let ok = true;
        for (let i = 0; i < 20; i++) {
            let r = Math.random();
            if (r < 0 || r >= 1) { ok = false; }
        }
        ok
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "true");
}

#[test]
fn test_json_round_trip() {
    let script = r#"
        let parsed = JSON.parse("{\"name\":\"Ada\",\"tags\":[\"a\",\"b\"]}");
        parsed.name + ":" + parsed.tags[1]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "Ada:b");
}

#[test]
fn test_json_stringify_strings_and_arrays() {
    assert_eq!(evaluate_script(r#"JSON.stringify("hi")"#).unwrap(), r#""hi""#);
    assert_eq!(
        evaluate_script(r#"JSON.stringify([true, null, "x"])"#).unwrap(),
        r#"[true,null,"x"]"#
    );
}

#[test]
fn test_json_parse_failure_is_catchable() {
    let script = r#"
        let failed = false;
        try { JSON.parse("{nope"); } catch (e) { failed = true; }
        failed
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "true");
}

#[test]
fn test_object_keys_and_values() {
    let script = r#"
        let obj = { b: 2, a: 1 };
        "" + Object.keys(obj) + "|" + Object.values(obj)
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "b,a|2,1");
}

#[test]
fn test_object_entries_with_for_of() {
    let script = r#"
        let obj = { x: 1, y: 2 };
        let out = "";
        for (let pair of Object.entries(obj)) {
            out += pair[0] + "=" + pair[1] + ";";
        }
        out
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "x=1;y=2;");
}

#[test]
fn test_array_is_array() {
    assert_eq!(evaluate_script("Array.isArray([1, 2])").unwrap(), "true");
    assert_eq!(evaluate_script("Array.isArray({ a: 1 })").unwrap(), "false");
    assert_eq!(evaluate_script(r#"Array.isArray("list")"#).unwrap(), "false");
}

#[test]
fn test_console_log_returns_undefined() {
    let script = r#"
        let r = console.log("integration test output");
        r
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "undefined");
}
