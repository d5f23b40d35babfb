use minijs::evaluate_script;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_array_literal_and_length() {
    let script = r#"
        let arr = [1, 2, 3];
        arr.length
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "3");
}

#[test]
fn test_array_element_read_and_write() {
    let script = r#"
        let arr = [1, 2, 3];
        arr[1] = 20;
        arr[0] + arr[1] + arr[2]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "24");
}

#[test]
fn test_out_of_range_read_is_undefined() {
    let script = r#"
        let arr = [1];
        arr[5]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "undefined");
}

#[test]
fn test_writing_past_the_end_extends_the_array() {
    let script = r#"
        let arr = [1];
        arr[3] = 4;
        arr.length
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "4");
}

#[test]
fn test_assigning_length_truncates() {
    let script = r#"
        let arr = [1, 2, 3, 4];
        arr.length = 2;
        "" + arr
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "1,2");
}

#[test]
fn test_object_property_access_both_ways() {
    let script = r#"
        let person = { name: "Ada", age: 36 };
        person.name + ":" + person["age"]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "Ada:36");
}

#[test]
fn test_object_property_write_and_creation() {
    let script = r#"
        let obj = { a: 1 };
        obj.a = 10;
        obj.b = 20;
        obj.a + obj.b
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "30");
}

#[test]
fn test_missing_property_is_undefined() {
    let script = r#"
        let obj = { a: 1 };
        obj.missing
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "undefined");
}

#[test]
fn test_string_keys_in_object_literals() {
    let script = r#"
        let obj = { "two words": 5 };
        obj["two words"]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "5");
}

#[test]
fn test_nested_structures() {
    let script = r#"
        let data = { items: [ { id: 7 }, { id: 8 } ] };
        data.items[1].id
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "8");
}

#[test]
fn test_arrays_are_shared_by_reference() {
    let script = r#"
        let a = [1];
        let b = a;
        b[0] = 99;
        a[0]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "99");
}

#[test]
fn test_string_length_and_indexing() {
    let script = r#"
        let s = "hello";
        s.length + ":" + s[1]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "5:e");
}

#[test]
fn test_compound_assignment_evaluates_the_index_once() {
    let script = r#"
        let a = [1, 2, 3];
        let i = 0;
        a[i++] += 10;
        "" + a + "|" + i
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "11,2,3|1");
}

#[test]
fn test_update_through_a_computed_member_runs_the_key_once() {
    let script = r#"
        let calls = 0;
        function k() { calls++; return 0; }
        let a = [5];
        a[k()]++;
        "" + a[0] + "," + calls
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "6,1");
}

#[test]
fn test_compound_assignment_evaluates_the_object_once() {
    let script = r#"
        let fetches = 0;
        let obj = { n: 1 };
        function get() { fetches++; return obj; }
        get().n += 5;
        "" + obj.n + "," + fetches
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "6,1");
}

#[test]
fn test_oversized_length_assignment_is_a_catchable_error() {
    let script = r#"
        let a = [1];
        let caught = false;
        try { a.length = 100000000000000000000; } catch (e) { caught = true; }
        "" + caught + "," + a.length
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "true,1");
}

#[test]
fn test_oversized_index_write_is_a_catchable_error() {
    let script = r#"
        let a = [1];
        let caught = false;
        try { a[9000000000000000000] = 1; } catch (e) { caught = true; }
        "" + caught + "," + a.length
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "true,1");
}

#[test]
fn test_member_write_through_null_is_an_error() {
    let result = evaluate_script("let x = null; x.field = 1;");
    assert!(result.is_err());
}
