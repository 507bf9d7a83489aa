//! Unit tests for operator resolution and execution.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::operators::{create_sequence, get, resolve, Operator, OperatorKind};
use crate::{
    ast::{
        ast::OpType,
        literals::{ListLiteral, Literal},
        types::{Type, ANY_LIST},
    },
    config::Options,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    Span,
};

fn numbers(values: &[f64]) -> Literal {
    Literal::List(ListLiteral::new(
        values.iter().map(|v| Literal::Number(*v)).collect(),
        Type::Num,
    ))
}

fn run(op: OpType, operands: Vec<Literal>) -> Result<Literal, Error> {
    let types: Vec<Type> = operands.iter().map(Literal::get_type).collect();
    let (id, _) = resolve(op, &types, Span::null())?;
    let mut stack = operands;
    get(id)
        .unwrap()
        .exec(&mut stack, Span::new(0, 5), &Options::default())?;
    assert_eq!(stack.len(), 1);
    Ok(stack.pop().unwrap())
}

#[test]
fn test_resolve_arithmetic() {
    let (id, ty) = resolve(OpType::Add, &[Type::Num, Type::Num], Span::null()).unwrap();

    assert_eq!(ty, Type::Num);
    assert_eq!(get(id).unwrap().kind, OperatorKind::NumArithmetic);
}

#[test]
fn test_resolve_picks_kind_by_operand_types() {
    let kind = |op, operands: &[Type]| get(resolve(op, operands, Span::null()).unwrap().0).unwrap().kind;

    assert_eq!(kind(OpType::Add, &[Type::String, Type::String]), OperatorKind::StringConcat);
    assert_eq!(
        kind(OpType::Add, &[Type::list_of(Type::Num), Type::list_of(Type::Num)]),
        OperatorKind::ListConcat
    );
    assert_eq!(kind(OpType::Add, &[Type::Date, Type::Timespan]), OperatorKind::DateTimespan);
    assert_eq!(kind(OpType::Sub, &[Type::Date, Type::Date]), OperatorKind::DateDifference);
    assert_eq!(kind(OpType::Not, &[Type::Bool]), OperatorKind::Not);
    assert_eq!(kind(OpType::Not, &[Type::list_of(Type::String)]), OperatorKind::ListReverse);
    assert_eq!(kind(OpType::Neg, &[Type::Timespan]), OperatorKind::Negate);
}

#[test]
fn test_generic_operators_propagate_element_type() {
    let strings = Type::list_of(Type::String);

    let (_, reversed) = resolve(OpType::Not, &[strings.clone()], Span::null()).unwrap();
    assert_eq!(reversed, strings);

    let (_, element) = resolve(OpType::Index, &[strings.clone(), Type::Num], Span::null()).unwrap();
    assert_eq!(element, Type::String);

    let (_, concat) = resolve(OpType::Add, &[strings.clone(), strings.clone()], Span::null()).unwrap();
    assert_eq!(concat, strings);

    let (_, selected) = resolve(OpType::If, &[Type::Bool, Type::Num, Type::Num], Span::null()).unwrap();
    assert_eq!(selected, Type::Num);
}

#[test]
fn test_wildcards_survive_unification() {
    let nums = Type::list_of(Type::Num);

    for operands in [[ANY_LIST.clone(), nums.clone()], [nums.clone(), ANY_LIST.clone()]] {
        let (_, concat) = resolve(OpType::Add, &operands, Span::null()).unwrap();
        assert_eq!(concat, ANY_LIST.clone());
    }

    let nested = Type::list_of(ANY_LIST.clone());
    let (_, concat) = resolve(
        OpType::Add,
        &[Type::list_of(nums.clone()), nested.clone()],
        Span::null(),
    )
    .unwrap();
    assert_eq!(concat, nested);

    let (_, selected) = resolve(OpType::If, &[Type::Bool, Type::Num, Type::Any], Span::null()).unwrap();
    assert_eq!(selected, Type::Any);
}

#[test]
fn test_resolve_incompatible_operands() {
    let error = resolve(OpType::Add, &[Type::Num, Type::String], Span::new(0, 7)).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::IncompatibleOperator {
            operator: "+".to_string(),
            operands: "num, string".to_string(),
        }
    );

    assert!(resolve(OpType::Eq, &[Type::Num, Type::String], Span::null()).is_err());
    assert!(resolve(
        OpType::Add,
        &[Type::list_of(Type::Num), Type::list_of(Type::String)],
        Span::null()
    )
    .is_err());
}

#[test]
fn test_exec_arithmetic() {
    let n = Literal::Number;
    assert_eq!(run(OpType::Add, vec![n(1.0), n(2.0)]).unwrap(), n(3.0));
    assert_eq!(run(OpType::Sub, vec![n(1.0), n(2.0)]).unwrap(), n(-1.0));
    assert_eq!(run(OpType::Mul, vec![n(3.0), n(4.0)]).unwrap(), n(12.0));
    assert_eq!(run(OpType::Div, vec![n(1.0), n(4.0)]).unwrap(), n(0.25));
    assert_eq!(run(OpType::Mod, vec![n(7.0), n(4.0)]).unwrap(), n(3.0));
    assert_eq!(run(OpType::Pow, vec![n(2.0), n(10.0)]).unwrap(), n(1024.0));
}

#[test]
fn test_exec_division_by_zero() {
    for op in [OpType::Div, OpType::Mod] {
        let error = run(op, vec![Literal::Number(1.0), Literal::Number(0.0)]).unwrap_err();
        assert_eq!(error.get_impl(), &ErrorImpl::DivisionByZero);
        assert_eq!(error.kind(), ErrorKind::Execution);
        assert_eq!(error.get_position(), &Span::new(0, 5));
    }
}

#[test]
fn test_exec_comparisons_and_equality() {
    let n = Literal::Number;
    let s = |v: &str| Literal::String(v.to_string());

    assert_eq!(run(OpType::Less, vec![n(1.0), n(2.0)]).unwrap(), Literal::Boolean(true));
    assert_eq!(run(OpType::GreaterEq, vec![n(1.0), n(2.0)]).unwrap(), Literal::Boolean(false));
    assert_eq!(run(OpType::Less, vec![s("a"), s("b")]).unwrap(), Literal::Boolean(true));
    assert_eq!(run(OpType::Eq, vec![s("a"), s("a")]).unwrap(), Literal::Boolean(true));
    assert_eq!(
        run(OpType::NotEq, vec![numbers(&[1.0]), numbers(&[1.0, 2.0])]).unwrap(),
        Literal::Boolean(true)
    );
    assert_eq!(
        run(OpType::And, vec![Literal::Boolean(true), Literal::Boolean(false)]).unwrap(),
        Literal::Boolean(false)
    );
}

#[test]
fn test_exec_string_operators() {
    let s = |v: &str| Literal::String(v.to_string());

    assert_eq!(run(OpType::Add, vec![s("foo"), s("bar")]).unwrap(), s("foobar"));
    assert_eq!(run(OpType::Index, vec![s("héllo"), Literal::Number(1.0)]).unwrap(), s("é"));
}

#[test]
fn test_exec_reverse_copies_list() {
    let original = numbers(&[1.0, 2.0, 3.0]);
    let mut stack = vec![original.clone()];
    let (id, _) = resolve(OpType::Not, &[original.get_type()], Span::null()).unwrap();

    get(id)
        .unwrap()
        .exec(&mut stack, Span::null(), &Options::default())
        .unwrap();

    assert_eq!(stack, vec![numbers(&[3.0, 2.0, 1.0])]);
    assert_eq!(original, numbers(&[1.0, 2.0, 3.0]));
    match (&stack[0], &original) {
        (Literal::List(reversed), Literal::List(original)) => {
            assert!(!reversed.shares_storage(original))
        }
        other => panic!("expected lists, got {:?}", other),
    }
}

#[test]
fn test_exec_list_concat_and_index() {
    assert_eq!(
        run(OpType::Add, vec![numbers(&[1.0]), numbers(&[2.0, 3.0])]).unwrap(),
        numbers(&[1.0, 2.0, 3.0])
    );
    assert_eq!(
        run(OpType::Index, vec![numbers(&[4.0, 5.0]), Literal::Number(1.0)]).unwrap(),
        Literal::Number(5.0)
    );
}

#[test]
fn test_exec_index_errors() {
    let error = run(OpType::Index, vec![numbers(&[4.0, 5.0]), Literal::Number(2.0)]).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::IndexOutOfBounds { index: 2, length: 2 });

    let error = run(OpType::Index, vec![numbers(&[4.0]), Literal::Number(-1.0)]).unwrap_err();
    assert_eq!(error.get_error_name(), "IndexOutOfBounds");

    let error = run(OpType::Index, vec![numbers(&[4.0]), Literal::Number(0.5)]).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::NotAnInteger { value: 0.5 });
}

#[test]
fn test_exec_dates_and_timespans() {
    let date = NaiveDate::from_ymd_opt(2012, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let next_day = NaiveDate::from_ymd_opt(2012, 3, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    assert_eq!(
        run(OpType::Add, vec![Literal::Date(date), Literal::Timespan(86_400)]).unwrap(),
        Literal::Date(next_day)
    );
    assert_eq!(
        run(OpType::Sub, vec![Literal::Date(next_day), Literal::Date(date)]).unwrap(),
        Literal::Timespan(86_400)
    );
    assert_eq!(
        run(OpType::Sub, vec![Literal::Timespan(60), Literal::Timespan(90)]).unwrap(),
        Literal::Timespan(-30)
    );
    assert_eq!(
        run(OpType::Less, vec![Literal::Date(date), Literal::Date(next_day)]).unwrap(),
        Literal::Boolean(true)
    );
    assert_eq!(run(OpType::Neg, vec![Literal::Timespan(5)]).unwrap(), Literal::Timespan(-5));
}

#[test]
fn test_exec_timespan_overflow() {
    let error = run(OpType::Add, vec![Literal::Timespan(i64::MAX), Literal::Timespan(1)]).unwrap_err();
    assert_eq!(error.get_error_name(), "ArithmeticOverflow");
}

#[test]
fn test_exec_conditional() {
    let n = Literal::Number;
    assert_eq!(run(OpType::If, vec![Literal::Boolean(true), n(1.0), n(2.0)]).unwrap(), n(1.0));
    assert_eq!(run(OpType::If, vec![Literal::Boolean(false), n(1.0), n(2.0)]).unwrap(), n(2.0));
}

#[test]
fn test_create_sequence() {
    let span = Span::null();

    let ascending = create_sequence(1.0, 5.0, 1.0, span, 10_000).unwrap();
    assert_eq!(Literal::List(ascending), numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]));

    let stepped = create_sequence(0.0, 10.0, 5.0, span, 10_000).unwrap();
    assert_eq!(Literal::List(stepped), numbers(&[0.0, 5.0, 10.0]));

    let descending = create_sequence(5.0, 1.0, -2.0, span, 10_000).unwrap();
    assert_eq!(Literal::List(descending), numbers(&[5.0, 3.0, 1.0]));
}

#[test]
fn test_create_sequence_errors() {
    let span = Span::new(1, 2);

    let error = create_sequence(5.0, 1.0, 1.0, span, 10_000).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::InvalidRange { start: 5.0, end: 1.0 });

    let error = create_sequence(0.0, 20_000.0, 1.0, span, 10_000).unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ListTooLarge {
            size: 20_000.0,
            max: 10_000
        }
    );

    let error = create_sequence(0.0, 1.0, 0.0, span, 10_000).unwrap_err();
    assert_eq!(error.get_error_name(), "ListTooLarge");
    assert_eq!(error.get_position(), &span);
}

#[test]
fn test_invalid_operator_type_is_internal() {
    let operator = Operator::new(
        OpType::Mul,
        OperatorKind::StringConcat,
        vec![Type::String, Type::String],
        Type::String,
    );
    let mut stack = vec![Literal::String("a".to_string()), Literal::String("b".to_string())];

    let error = operator
        .exec(&mut stack, Span::null(), &Options::default())
        .unwrap_err();

    assert_eq!(error.get_error_name(), "InvalidOperatorType");
    assert_eq!(error.kind(), ErrorKind::Internal);
}

#[test]
fn test_operand_outside_signature_is_invalid_operand() {
    let (id, _) = resolve(OpType::Add, &[Type::Num, Type::Num], Span::null()).unwrap();
    let mut stack = vec![Literal::String("a".to_string()), Literal::Number(1.0)];

    let error = get(id)
        .unwrap()
        .exec(&mut stack, Span::new(2, 7), &Options::default())
        .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidOperand {
            expected: "num".to_string(),
            received: "string".to_string(),
        }
    );
    assert_eq!(error.kind(), ErrorKind::Execution);
    assert_eq!(error.get_position(), &Span::new(2, 7));
}

#[test]
fn test_operand_tag_mismatch_is_internal() {
    let operator = Operator::new(
        OpType::Add,
        OperatorKind::NumArithmetic,
        vec![Type::String, Type::String],
        Type::Num,
    );
    let mut stack = vec![Literal::String("a".to_string()), Literal::String("b".to_string())];

    let error = operator
        .exec(&mut stack, Span::null(), &Options::default())
        .unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::OperandTypeMismatch {
            expected: "number".to_string(),
            received: "string".to_string(),
        }
    );
    assert_eq!(error.kind(), ErrorKind::Internal);
}

#[test]
fn test_stack_underflow() {
    let (id, _) = resolve(OpType::Add, &[Type::Num, Type::Num], Span::null()).unwrap();
    let mut stack = vec![Literal::Number(1.0)];

    let error = get(id)
        .unwrap()
        .exec(&mut stack, Span::null(), &Options::default())
        .unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::StackUnderflow);
}
