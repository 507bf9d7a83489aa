//! Unit tests for the executor.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::executor::execute;
use crate::{
    ast::{
        literals::{ListLiteral, Literal},
        types::Type,
    },
    config::Options,
    declarations::namespace::Namespace,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    parse, type_check, Span,
};

fn run_with(source: &str, namespace: &mut Namespace, options: &Options) -> Result<Vec<Literal>, Error> {
    let typed = type_check(parse(source)?, namespace)?;
    execute(&typed, namespace, options)
}

fn run_in(source: &str, namespace: &mut Namespace) -> Result<Vec<Literal>, Error> {
    run_with(source, namespace, &Options::default())
}

fn run(source: &str) -> Result<Vec<Literal>, Error> {
    run_in(source, &mut Namespace::with_prelude())
}

fn last(source: &str) -> Literal {
    run(source).unwrap().pop().unwrap()
}

fn numbers(values: &[f64]) -> Literal {
    Literal::List(ListLiteral::new(
        values.iter().map(|v| Literal::Number(*v)).collect(),
        Type::Num,
    ))
}

fn string(value: &str) -> Literal {
    Literal::String(value.to_string())
}

#[test]
fn test_execute_add() {
    assert_eq!(run("1 + 2").unwrap(), vec![Literal::Number(3.0)]);
}

#[test]
fn test_one_result_per_expression() {
    assert_eq!(
        run("1; \"a\"; true").unwrap(),
        vec![Literal::Number(1.0), string("a"), Literal::Boolean(true)]
    );
}

#[test]
fn test_precedence_and_associativity() {
    assert_eq!(last("1 + 2 * 3"), Literal::Number(7.0));
    assert_eq!(last("(1 + 2) * 3"), Literal::Number(9.0));
    assert_eq!(last("2 ^ 3 ^ 2"), Literal::Number(512.0));
    assert_eq!(last("10 - 4 - 3"), Literal::Number(3.0));
    assert_eq!(last("-2 ^ 2"), Literal::Number(-4.0));
}

#[test]
fn test_reverse_does_not_alias() {
    assert_eq!(
        run("{1, 2, 3} -> xs; !xs; xs").unwrap(),
        vec![
            numbers(&[1.0, 2.0, 3.0]),
            numbers(&[3.0, 2.0, 1.0]),
            numbers(&[1.0, 2.0, 3.0]),
        ]
    );
}

#[test]
fn test_lists_and_ranges() {
    assert_eq!(last("{1, 2} + {3}"), numbers(&[1.0, 2.0, 3.0]));
    assert_eq!(last("{4, 5, 6}[1]"), Literal::Number(5.0));
    assert_eq!(last("1..4"), numbers(&[1.0, 2.0, 3.0, 4.0]));
    assert_eq!(last("0..10$5"), numbers(&[0.0, 5.0, 10.0]));
    assert_eq!(last("3..1$-1"), numbers(&[3.0, 2.0, 1.0]));
    assert_eq!(last("\"abc\"[1]"), string("b"));
}

#[test]
fn test_builtins() {
    assert_eq!(last("sqrt(16)"), Literal::Number(4.0));
    assert_eq!(last("len(\"abc\")"), Literal::Number(3.0));
    assert_eq!(last("len({1, 2})"), Literal::Number(2.0));
    assert_eq!(last("max({3, 9, 2})"), Literal::Number(9.0));
    assert_eq!(last("min(3, 9)"), Literal::Number(3.0));
    assert_eq!(last("sum(1..4)"), Literal::Number(10.0));
    assert_eq!(last("str(1.5)"), string("1.5"));
    assert_eq!(last("rev(\"abc\")"), string("cba"));
}

#[test]
fn test_lambda_calls() {
    assert_eq!(last("\\(num x: x * 2)(21)"), Literal::Number(42.0));
    assert_eq!(
        last("\\(num x, num y: x + y) -> add; add(1, 2)"),
        Literal::Number(3.0)
    );
    assert_eq!(
        last("\\(num x: \\(num y: x - y)) -> sub; sub(10)(4)"),
        Literal::Number(6.0)
    );
    assert_eq!(
        last("\\(list<any> xs: len(xs)) -> size; size({1, 2, 3})"),
        Literal::Number(3.0)
    );
}

#[test]
fn test_overloads_dispatch_on_arguments() {
    assert_eq!(
        run("\\(num x: \"num\") -> f; \\(string x: \"string\") -> f; f(1); f(\"a\")").unwrap()[2..],
        [string("num"), string("string")]
    );
}

#[test]
fn test_conditional_is_lazy() {
    assert_eq!(last("if true : 1 : 1 / 0"), Literal::Number(1.0));
    assert_eq!(last("if 1 > 2 : \"a\" : \"b\""), string("b"));
}

#[test]
fn test_dates() {
    let expected = NaiveDate::from_ymd_opt(2012, 1, 2)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();

    assert_eq!(last("01.01.2012@12:30 + 1d"), Literal::Date(expected));
    assert_eq!(last("02.01.2012 - 01.01.2012"), Literal::Timespan(86_400));
}

#[test]
fn test_runtime_errors_carry_spans() {
    let error = run("1 / 0").unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::DivisionByZero);
    assert_eq!(error.get_position(), &Span::new(0, 5));
    assert_eq!(error.kind(), ErrorKind::Execution);

    let error = run("{1}[3]").unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::IndexOutOfBounds { index: 3, length: 1 });

    let error = run("5..1").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidRange");

    let error = run("1..20000").unwrap_err();
    assert_eq!(error.get_error_name(), "ListTooLarge");

    let error = run("{1}[0.5]").unwrap_err();
    assert_eq!(error.get_error_name(), "NotAnInteger");
}

#[test]
fn test_runtime_error_context() {
    let error = run("2 * (1 / 0)").unwrap_err();

    assert_eq!(error.get_position(), &Span::new(5, 10));
    assert_eq!(error.get_context(), Some(&Span::new(0, 10)));
}

#[test]
fn test_call_scope_is_popped_after_error() {
    let mut namespace = Namespace::with_prelude();
    run_in("\\(num x: x / 0) -> f", &mut namespace).unwrap();

    let error = run_in("f(1)", &mut namespace).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::DivisionByZero);
    assert_eq!(namespace.depth(), 1);
    assert!(namespace.resolve("x", None, Span::null()).is_err());
}

#[test]
fn test_call_depth_is_bounded() {
    let mut namespace = Namespace::with_prelude();
    let options = Options {
        max_call_depth: 8,
        ..Options::default()
    };

    let error = run_with(
        "\\(num x: x) -> f; \\(num x: f(x)) -> f; f(1)",
        &mut namespace,
        &options,
    )
    .unwrap_err();

    assert_eq!(error.get_impl(), &ErrorImpl::CallDepthExceeded { max: 8 });
    assert_eq!(namespace.depth(), 1);
}

#[test]
fn test_evaluation_depth_is_bounded_across_calls() {
    let mut namespace = Namespace::with_prelude();
    let options = Options {
        max_call_depth: 1_000,
        max_nesting_depth: 16,
        ..Options::default()
    };

    let error = run_with(
        "\\(num x: x) -> f; \\(num x: f(x) + 1) -> f; f(1)",
        &mut namespace,
        &options,
    )
    .unwrap_err();

    assert_eq!(error.get_impl(), &ErrorImpl::EvaluationTooDeep { max: 32 });
    assert_eq!(error.kind(), ErrorKind::Execution);
    assert_eq!(namespace.depth(), 1);
}

#[test]
fn test_any_list_elements_are_checked_at_runtime() {
    let error = run("\\(list<any> xs: sum(xs))({\"a\"})").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Execution);
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidOperand {
            expected: "list<num>".to_string(),
            received: "list<string>".to_string(),
        }
    );

    let error = run("\\(list<any> xs: sum({1} + xs))({\"a\"})").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Execution);
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidOperand {
            expected: "num".to_string(),
            received: "string".to_string(),
        }
    );

    let error = run(
        "\\(list<num> ys: ys[1] + 1) -> second; \\(list<any> xs: second({1} + xs))({\"a\"})",
    )
    .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Execution);
    assert_eq!(error.get_error_name(), "InvalidOperand");

    assert_eq!(last("\\(list<any> xs: sum({1} + xs))({2, 3})"), Literal::Number(6.0));
}

#[test]
fn test_concat_with_any_list_stays_untyped() {
    let error = run("\\(list<any> xs: (xs + {1})[0] + 1)({\"a\"})").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert_eq!(error.get_error_name(), "IncompatibleOperator");
}

#[test]
fn test_assignment_and_delete() {
    let mut namespace = Namespace::with_prelude();

    assert_eq!(
        run_in("3 -> x; x * x", &mut namespace).unwrap(),
        vec![Literal::Number(3.0), Literal::Number(9.0)]
    );
    assert_eq!(run_in("x + 1", &mut namespace).unwrap(), vec![Literal::Number(4.0)]);
    assert_eq!(run_in("del x", &mut namespace).unwrap(), vec![Literal::Number(1.0)]);
    assert_eq!(run_in("del x", &mut namespace).unwrap(), vec![Literal::Number(0.0)]);
}

#[test]
fn test_public_assignment_is_shared() {
    let mut first = Namespace::with_prelude();
    let mut second = first.session();

    run_in("42 -> public answer; 1 -> private", &mut first).unwrap();

    assert_eq!(run_in("answer", &mut second).unwrap(), vec![Literal::Number(42.0)]);
    assert!(run_in("private", &mut second).is_err());
}

#[test]
fn test_execution_is_deterministic() {
    let source = "{3, 1, 2} -> xs; !xs + xs; if len(xs) > 2 : sum(xs) : 0";
    let namespace = Namespace::with_prelude();

    let first = run_in(source, &mut namespace.fork()).unwrap();
    let second = run_in(source, &mut namespace.fork()).unwrap();
    assert_eq!(first, second);

    let first = run_in("1 / 0", &mut namespace.fork()).unwrap_err();
    let second = run_in("1 / 0", &mut namespace.fork()).unwrap_err();
    assert_eq!(first.get_impl(), second.get_impl());
    assert_eq!(first.get_position(), second.get_position());
}
