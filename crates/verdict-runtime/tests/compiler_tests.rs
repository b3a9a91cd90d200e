//! Compile-pipeline properties: literal arrays, the mark equivalence, and
//! the format/recompile round trip

mod common;

use common::{eval, eval_top};
use pretty_assertions::assert_eq;
use rstest::rstest;
use verdict_runtime::{compile, Value};

fn top_level(src: &str) -> Vec<Value> {
    match compile(src).expect("compile should succeed") {
        Value::Array(a) => a.to_vec(),
        v => panic!("expected executable array, got {:?}", v),
    }
}

#[test]
fn test_bracket_and_mark_forms_build_equal_arrays() {
    let bracket = eval_top("[ 1 'two' /three ]");
    let marked = eval_top("mark 1 'two' /three arraytomark");
    assert_eq!(bracket, marked);
}

#[test]
fn test_empty_arrays_equal() {
    assert_eq!(eval_top("[ ]"), eval_top("mark arraytomark"));
}

#[rstest]
#[case("1 2 +")]
#[case("10 20 add 25 gt")]
#[case("3.5 -7 0.25")]
#[case("'hello' 'with \\'quote\\'' 'line\\nbreak'")]
#[case("/lit execname /a.b c.d")]
#[case("[ 1 'x' /n ]")]
#[case("[ 1 [ 2 ] ]")]
#[case("{ 1 2 + }")]
#[case("{ { 1 } true if }")]
#[case("true false null isNull")]
#[case("'2024-01-01' newDate 7 days plusDate")]
fn test_format_recompile_round_trip(#[case] src: &str) {
    let original = top_level(src);
    let rendered = original
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let recompiled = top_level(&rendered);
    assert_eq!(
        original.len(),
        recompiled.len(),
        "token count changed: {:?} -> {:?}",
        src,
        rendered
    );
    for (a, b) in original.iter().zip(recompiled.iter()) {
        assert!(
            a.value_eq(b),
            "round trip changed {:?}: {:?} != {:?}",
            src,
            a,
            b
        );
    }
}

#[test]
fn test_executable_array_elements_preserved() {
    let v = top_level("{ /r 'small' xdef }");
    match &v[0] {
        Value::Array(a) => {
            assert!(a.executable);
            assert_eq!(a.len(), 3);
            assert!(matches!(a.get(0).expect("get"), Value::Name(_)));
            assert!(matches!(a.get(1).expect("get"), Value::String(_)));
            assert!(matches!(a.get(2).expect("get"), Value::Function(_)));
        }
        v => panic!("expected array, got {:?}", v),
    }
}

#[test]
fn test_division_vs_literal_name() {
    // `/` before a non-letter is division; before a letter it marks a name
    assert_eq!(eval_top("6 3 /"), Value::int(2));
    let v = top_level("/abc");
    assert!(matches!(&v[0], Value::Name(n) if !n.executable));
}

#[test]
fn test_negative_point_led_real() {
    assert_eq!(eval_top("-.5 cvr"), Value::float(-0.5));
}

#[test]
fn test_raw_strings_are_literal() {
    assert_eq!(eval_top(r"`no \n escapes`"), Value::string(r"no \n escapes"));
}

#[test]
fn test_unicode_logic_operators_execute() {
    assert_eq!(eval_top("true ¬"), Value::Bool(false));
    assert_eq!(eval("true false ∨").pop().expect("top"), Value::Bool(true));
    assert_eq!(eval("true false ∧").pop().expect("top"), Value::Bool(false));
}

#[test]
fn test_alternate_comparison_spellings() {
    assert_eq!(eval_top("1 2 =<"), Value::Bool(true));
    assert_eq!(eval_top("2 1 =>"), Value::Bool(true));
}
