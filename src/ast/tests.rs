//! Unit tests for the AST module.
//!
//! Covers structural type checks, literal rendering, unparsing and the
//! parent map.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::{
    ast::{ExprKind, ParentMap},
    literals::{format_timespan, ListLiteral, Literal},
    types::{FunctionType, Type, ANY_LIST},
};
use crate::{
    errors::errors::{Error, ErrorImpl},
    parse, Span,
};

fn date(day: u32, month: u32, year: i32, hour: u32, minute: u32, second: u32) -> Literal {
    Literal::Date(
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap(),
    )
}

#[test]
fn test_check_is_reflexive() {
    let types = [
        Type::Num,
        Type::String,
        Type::Bool,
        Type::Date,
        Type::Timespan,
        Type::Any,
        Type::list_of(Type::Num),
        Type::list_of(Type::list_of(Type::String)),
        Type::function(Type::Num, vec![Type::Num, ANY_LIST.clone()]),
    ];

    for ty in &types {
        assert!(ty.check(ty), "{} does not accept itself", ty);
    }
}

#[test]
fn test_check_is_directional() {
    assert!(Type::Any.check(&Type::Num));
    assert!(!Type::Num.check(&Type::Any));
    assert!(!Type::Num.check(&Type::String));

    assert!(Type::list_of(Type::Any).check(&Type::list_of(Type::Num)));
    assert!(ANY_LIST.check(&Type::list_of(Type::list_of(Type::Num))));
    assert!(Type::list_of(Type::Num).check(&ANY_LIST));
    assert!(!Type::list_of(Type::Num).check(&Type::list_of(Type::String)));
    assert!(!Type::list_of(Type::Num).check(&Type::Num));
}

#[test]
fn test_function_check() {
    let takes_any = Type::function(Type::Num, vec![Type::Any]);
    let takes_num = Type::function(Type::Num, vec![Type::Num]);
    let takes_two = Type::function(Type::Num, vec![Type::Num, Type::Num]);
    let returns_string = Type::function(Type::String, vec![Type::Num]);

    assert!(takes_any.check(&takes_num));
    assert!(!takes_num.check(&takes_any));
    assert!(!takes_num.check(&takes_two));
    assert!(!takes_num.check(&returns_string));
    assert!(!takes_num.check(&Type::Num));

    let signature = FunctionType::new(Type::Num, vec![Type::Num]);
    assert!(signature.check(&returns_string, false));
    assert!(!signature.check(&returns_string, true));
}

#[test]
fn test_check_params() {
    let signature = FunctionType::new(Type::Num, vec![ANY_LIST.clone(), Type::Num]);

    assert!(signature.check_params(&[Type::list_of(Type::String), Type::Num]));
    assert!(!signature.check_params(&[Type::list_of(Type::String)]));
    assert!(!signature.check_params(&[Type::Num, Type::Num]));
}

#[test]
fn test_type_names() {
    assert_eq!(Type::from_name("num"), Some(Type::Num));
    assert_eq!(Type::from_name("timespan"), Some(Type::Timespan));
    assert_eq!(Type::from_name("number"), None);

    assert_eq!(Type::list_of(Type::Num).to_string(), "list<num>");
    assert_eq!(
        Type::function(Type::String, vec![Type::Num, Type::Bool]).to_string(),
        "(num bool -> string)"
    );
    assert_eq!(Type::function(Type::Num, vec![]).to_string(), "(-> num)");
}

#[test]
fn test_literal_rendering() {
    assert_eq!(Literal::Number(3.0).to_string(), "3");
    assert_eq!(Literal::Number(1.5).to_string(), "1.5");
    assert_eq!(Literal::String("a\"b\n".to_string()).to_string(), "\"a\\\"b\\n\"");
    assert_eq!(Literal::Boolean(false).to_string(), "false");
    assert_eq!(date(1, 2, 2012, 0, 0, 0).to_string(), "01.02.2012");
    assert_eq!(date(1, 2, 2012, 13, 5, 0).to_string(), "01.02.2012@13:05");
    assert_eq!(date(1, 2, 2012, 13, 5, 9).to_string(), "01.02.2012@13:05:09");
    assert_eq!(
        Literal::List(ListLiteral::new(
            vec![Literal::Number(1.0), Literal::Number(2.0)],
            Type::Num
        ))
        .to_string(),
        "{1, 2}"
    );
}

#[test]
fn test_timespan_rendering() {
    assert_eq!(format_timespan(0), "0s");
    assert_eq!(format_timespan(90_061), "1d1h1m1s");
    assert_eq!(format_timespan(-3_600), "-1h");
    assert_eq!(format_timespan(31_536_000 + 604_800), "1y1w");
}

#[test]
fn test_literals_parse_back() {
    let literals = vec![
        Literal::Number(42.0),
        Literal::Number(0.25),
        Literal::String("say \"hi\"\t\\".to_string()),
        Literal::Boolean(true),
        date(29, 2, 2012, 0, 0, 0),
        date(31, 12, 1999, 23, 59, 58),
        Literal::Timespan(93_784),
    ];

    for literal in literals {
        let rendered = literal.to_string();
        let root = parse(&rendered).unwrap();
        assert_eq!(root.exprs[0].as_literal(), Some(&literal), "{}", rendered);
    }
}

#[test]
fn test_list_copies() {
    let inner = ListLiteral::new(vec![Literal::Number(1.0)], Type::Num);
    let outer = Literal::List(ListLiteral::new(
        vec![Literal::List(inner.clone())],
        Type::list_of(Type::Num),
    ));

    let copy = outer.deep_copy();
    assert_eq!(copy, outer);
    match (&copy, &outer) {
        (Literal::List(copy), Literal::List(outer)) => {
            assert!(!copy.shares_storage(outer));
            match (&copy.elements()[0], &outer.elements()[0]) {
                (Literal::List(a), Literal::List(b)) => assert!(!a.shares_storage(b)),
                other => panic!("expected nested lists, got {:?}", other),
            }
        }
        other => panic!("expected lists, got {:?}", other),
    }

    let reversed = inner.reversed();
    assert!(!reversed.shares_storage(&inner));
    assert_eq!(inner.concat(&reversed).len(), 2);
}

#[test]
fn test_unparse() {
    let cases = [
        ("1 + 2 * 3", "1 + (2 * 3)"),
        ("(1 + 2) * 3", "(1 + 2) * 3"),
        ("-x", "-x"),
        ("{1, 2}[0]", "{1, 2}[0]"),
        ("1..10$2", "1..10$2"),
        ("if a : b : c", "if a : b : c"),
        ("f(1, \"a\")", "f(1, \"a\")"),
        ("\\(num x, list<num> ys: x) -> public temp g", "\\(num x, list<num> ys: x) -> public temp g"),
        ("del a, public b", "del a, public b"),
        ("1; 2", "1; 2"),
    ];

    for (source, expected) in cases {
        let rendered = parse(source).unwrap().to_string();
        assert_eq!(rendered, expected);
        assert_eq!(parse(&rendered).unwrap().to_string(), expected);
    }
}

#[test]
fn test_parent_map() {
    let root = parse("1 + f(2)").unwrap();
    let top = &root.exprs[0];

    assert_eq!(root.parents.parent(top.id), None);
    for child in top.children() {
        assert_eq!(root.parents.parent(child.id), Some(top.id));
        assert_eq!(root.parents.parent_span(child.id), Some(Span::new(0, 8)));
    }

    match &top.kind {
        ExprKind::Binary { right, .. } => {
            for argument in right.children() {
                assert_eq!(root.parents.parent(argument.id), Some(right.id));
            }
        }
        other => panic!("expected binary expression, got {:?}", other),
    }
    assert_eq!(root.parents.len(), 4);
}

#[test]
fn test_attach_context() {
    let root = parse("1 + 2").unwrap();
    let parents: &ParentMap = &root.parents;
    let left = root.exprs[0].children()[0].id;

    let error = parents.attach_context(left, Error::new(ErrorImpl::DivisionByZero, Span::new(0, 1)));
    assert_eq!(error.get_context(), Some(&Span::new(0, 5)));

    let error = Error::new(ErrorImpl::DivisionByZero, Span::new(0, 1)).with_context(Span::new(7, 9));
    let error = parents.attach_context(left, error);
    assert_eq!(error.get_context(), Some(&Span::new(7, 9)));

    let error = parents.attach_context(root.exprs[0].id, Error::new(ErrorImpl::EmptyList, Span::null()));
    assert_eq!(error.get_context(), None);
}

#[test]
fn test_expr_equality_is_kind_and_span() {
    let first = parse("1 + 2").unwrap();
    let second = parse("3 + 4").unwrap();
    let third = parse("3 - 4").unwrap();

    assert_eq!(first.exprs[0], second.exprs[0]);
    assert_eq!(second.exprs[0], third.exprs[0]);
    assert!(first.exprs[0] != parse("1").unwrap().exprs[0]);
}
