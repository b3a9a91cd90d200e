//! Operator catalog tests
//!
//! One fragment per behavior, driven through the full compile-and-execute
//! pipeline.

mod common;

use common::{eval, eval_err, eval_top};
use rstest::rstest;
use verdict_runtime::value::nanos;
use verdict_runtime::{RuntimeError, Value};

#[rstest]
// Integer arithmetic and comparison
#[case("1 2 +", Value::int(3))]
#[case("10 3 sub", Value::int(7))]
#[case("4 5 *", Value::int(20))]
#[case("7 2 div", Value::int(3))]
#[case("7 neg", Value::int(-7))]
#[case("-7 abs", Value::int(7))]
#[case("30 25 >", Value::Bool(true))]
#[case("25 25 >=", Value::Bool(true))]
#[case("1 2 <", Value::Bool(true))]
#[case("2 2 le", Value::Bool(true))]
#[case("2 2 ==", Value::Bool(true))]
#[case("2 3 !=", Value::Bool(true))]
// Strings convert for integer comparison
#[case("'5' 5 eq", Value::Bool(true))]
// Float arithmetic and comparison
#[case("2.5 0.5 f+", Value::float(3.0))]
#[case("2.5 0.5 f-", Value::float(2.0))]
#[case("1.5 2.0 f*", Value::float(3.0))]
#[case("1.0 4.0 f/", Value::float(0.25))]
#[case("-1.5 fabs", Value::float(1.5))]
#[case("1.5 fneg", Value::float(-1.5))]
#[case("2.5 2.5 f==", Value::Bool(true))]
#[case("2.5 2.0 f>", Value::Bool(true))]
// Logic
#[case("true not", Value::Bool(false))]
#[case("false !", Value::Bool(true))]
#[case("true false or", Value::Bool(true))]
#[case("true false and", Value::Bool(false))]
#[case("true true beq", Value::Bool(true))]
#[case("true false bne", Value::Bool(true))]
// Value equality
#[case("1 '1' req", Value::Bool(true))]
#[case("1 2 req", Value::Bool(false))]
#[case("null null req", Value::Bool(true))]
#[case("1 null req", Value::Bool(false))]
// Strings
#[case("'ab' strlength", Value::int(2))]
#[case("'a' 'b' s+", Value::string("ab"))]
#[case("'abcabc' 'b' strremove", Value::string("acabc"))]
#[case("'a' 'a' streq", Value::Bool(true))]
#[case("'a' 'b' strne", Value::Bool(true))]
#[case("'b' 'a' s>", Value::Bool(true))]
#[case("'a' 'b' strlt", Value::Bool(true))]
#[case("'Hello' 'hELLO' streqignorecase", Value::Bool(true))]
#[case("'Hello' 'world' sic==", Value::Bool(false))]
// Stack
#[case("null isNull", Value::Bool(true))]
#[case("1 isNull", Value::Bool(false))]
#[case("1 2 pop", Value::int(1))]
#[case("7 dup +", Value::int(14))]
// Conversions, with Null fallback on failure
#[case("'42' cvi", Value::int(42))]
#[case("'2.5' cvr", Value::float(2.5))]
#[case("'true' cvb", Value::Bool(true))]
#[case("42 cvs", Value::string("42"))]
#[case("null cvi", Value::Null)]
#[case("'nope' cvi", Value::Null)]
#[case("null cvb", Value::Null)]
#[case("5 cve", Value::Null)]
// Arrays
#[case("[ 1 2 3 ] length", Value::int(3))]
#[case("null length", Value::int(0))]
#[case("mark 1 2 arraytomark length", Value::int(2))]
#[case("[ 1 2 ] 1 getat", Value::int(2))]
#[case("newArray length", Value::int(0))]
#[case("[ 1 2 ] 2 memberOf", Value::Bool(true))]
#[case("[ 1 2 ] '2' memberOf", Value::Bool(true))]
#[case("[ 1 2 ] 9 memberOf", Value::Bool(false))]
#[case("[ 1 ] dup 5 addTo length", Value::int(2))]
#[case("[ 1 ] dup 0 9 addAt 0 getat", Value::int(9))]
#[case("[ 1 2 1 ] 1 remove length", Value::int(1))]
#[case("[ 1 2 3 ] 1 removeAt length", Value::int(2))]
#[case("[ 1 ] dup 1 add_no_dups length", Value::int(1))]
#[case("[ 1 ] dup 2 add_no_dups length", Value::int(2))]
#[case("[ 1 2 ] dup clear length", Value::int(0))]
#[case("[ 1 ] [ 2 3 ] merge length", Value::int(3))]
#[case("[ 1 2 ] copyElements length", Value::int(2))]
// roundTo (binary-exact fractions)
#[case("2.375 2 0.5 roundTo", Value::float(2.38))]
#[case("2.375 2 1 roundTo", Value::float(2.37))]
#[case("2.0625 1 0 roundTo", Value::float(2.1))]
#[case("-2.375 2 0.5 roundTo", Value::float(-2.38))]
// Control flow
#[case("{ 1 } true if", Value::int(1))]
#[case("{ 1 } { 2 } true ifElse", Value::int(1))]
#[case("{ 1 } { 2 } false ifElse", Value::int(2))]
#[case("0 { dup 3 < } { 1 + } while", Value::int(3))]
// Dates and durations
#[case("'2024-01-01' newDate '2024-01-01' newDate dateeq", Value::Bool(true))]
#[case("'2024-01-02' newDate '2024-01-01' newDate dategt", Value::Bool(true))]
#[case("'2024-01-01' newDate '2024-01-02' newDate datelt", Value::Bool(true))]
#[case("'2024-01-01' newDate '2024-01-01' newDate datege", Value::Bool(true))]
#[case(
    "'2024-01-01' newDate 7 days plusDate '2024-01-08' newDate dateeq",
    Value::Bool(true)
)]
#[case(
    "'2024-01-01' newDate '36h' plusDate '2024-01-02' newDate dategt",
    Value::Bool(true)
)]
#[case(
    "'2024-01-08' newDate '2024-01-01' newDate minusDate",
    Value::duration(7 * nanos::DAY)
)]
#[case("2 weeks", Value::duration(14 * nanos::DAY))]
#[case("90 minutes", Value::duration(90 * nanos::MINUTE))]
fn test_operator(#[case] src: &str, #[case] expected: Value) {
    assert_eq!(eval_top(src), expected, "fragment: {}", src);
}

#[test]
fn test_swap_reorders() {
    assert_eq!(eval("1 2 swap"), vec![Value::int(2), Value::int(1)]);
    assert_eq!(eval("1 2 exch"), vec![Value::int(2), Value::int(1)]);
}

#[test]
fn test_if_skips_body_on_false_and_null() {
    assert!(eval("{ 1 } false if").is_empty());
    assert!(eval("{ 1 } null if").is_empty());
}

#[test]
fn test_arithmetic_on_null_errors() {
    assert!(matches!(
        eval_err("1 null +"),
        RuntimeError::NotKind { kind: "numeric" }
    ));
    assert!(matches!(eval_err("null 1 sub"), RuntimeError::NotKind { .. }));
}

#[test]
fn test_logic_on_null_errors() {
    assert!(matches!(
        eval_err("true null and"),
        RuntimeError::NotKind { kind: "boolean" }
    ));
}

#[test]
fn test_integer_division_by_zero() {
    assert!(matches!(eval_err("1 0 /"), RuntimeError::Domain(_)));
}

#[test]
fn test_float_division_by_zero_is_ieee() {
    let v = eval_top("1.0 0.0 f/");
    assert_eq!(v.as_float().expect("float"), f64::INFINITY);
}

#[test]
fn test_stack_underflow() {
    assert!(matches!(eval_err("+"), RuntimeError::StackUnderflow));
    assert!(matches!(eval_err("1 +"), RuntimeError::StackUnderflow));
    assert!(matches!(eval_err("pop"), RuntimeError::StackUnderflow));
}

#[test]
fn test_get_at_out_of_range() {
    assert!(matches!(eval_err("[ 1 2 ] 5 getat"), RuntimeError::Domain(_)));
    assert!(matches!(
        eval_err("[ 1 ] dup 9 removeAt"),
        RuntimeError::Domain(_)
    ));
}

#[test]
fn test_cvn_forms() {
    match eval_top("'/x' cvn") {
        Value::Name(n) => {
            assert!(n.executable);
            assert_eq!(n.member.as_ref(), "x");
        }
        v => panic!("expected name, got {:?}", v),
    }
    match eval_top("'x' cvn") {
        Value::Name(n) => assert!(!n.executable),
        v => panic!("expected name, got {:?}", v),
    }
}

#[test]
fn test_literal_executable_flips() {
    match eval_top("/n cvx") {
        Value::Name(n) => assert!(n.executable),
        v => panic!("expected name, got {:?}", v),
    }
    match eval_top("{ 1 2 } cvlit") {
        Value::Array(a) => {
            assert!(!a.executable);
            assert_eq!(a.len(), 2);
        }
        v => panic!("expected array, got {:?}", v),
    }
    // Converting a literal array and executing it runs the elements
    assert_eq!(eval_top("[ 1 2 add ] cvx execute"), Value::int(3));
}

#[test]
fn test_bad_date_errors() {
    assert!(matches!(eval_err("'01/02/2024' newDate"), RuntimeError::Domain(_)));
}

#[test]
fn test_loop_counters() {
    assert_eq!(eval("{ pop I } [ 'a' 'b' ] for"), vec![Value::int(0), Value::int(1)]);
    assert_eq!(
        eval("{ pop I } [ 'a' 'b' ] forR"),
        vec![Value::int(1), Value::int(0)]
    );
    // J reads the enclosing loop's counter
    assert_eq!(
        eval("{ pop { pop J } [ 1 ] for } [ 5 6 ] for"),
        vec![Value::int(0), Value::int(1)]
    );
    // No loop in scope pushes Null
    assert!(eval_top("I").is_null());
    assert!(eval_top("K").is_null());
}

#[test]
fn test_while_requires_a_test_result() {
    let err = eval_err("{ } { 1 } while");
    assert!(matches!(err, RuntimeError::ResultArity { want: 1, got: 0 }));
}

#[test]
fn test_while_takes_top_of_multiple_results() {
    // The test fragment leaves two values; the top one drives the loop
    assert!(eval("{ 1 false } { 'unreachable' } while").is_empty());
}

#[test]
fn test_executing_stray_close_brace_fails() {
    assert!(matches!(
        eval_err("'}' execute"),
        RuntimeError::InvalidControl | RuntimeError::Compile(_)
    ));
}
