//! Built-in functions available in every namespace.

use std::sync::Arc;

use crate::{
    ast::{
        literals::{FunctionBody, FunctionLiteral, ListLiteral, Literal, NativeFn, NativeFunction},
        types::{FunctionType, Type, ANY_LIST},
    },
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{declaration::Declaration, namespace::Scope};

fn native(name: &'static str, ret: Type, params: Vec<Type>, func: NativeFn) -> Declaration {
    Declaration::native(
        name,
        Literal::Function(FunctionLiteral {
            signature: FunctionType::new(ret, params),
            body: FunctionBody::Native(NativeFunction { name, func }),
        }),
    )
}

/// The global scope every fresh namespace starts with.
pub fn prelude_scope() -> Scope {
    let declarations = vec![
        native("len", Type::Num, vec![ANY_LIST.clone()], len_list),
        native("len", Type::Num, vec![Type::String], len_string),
        native("sqrt", Type::Num, vec![Type::Num], sqrt),
        native("abs", Type::Num, vec![Type::Num], abs),
        native("round", Type::Num, vec![Type::Num], round),
        native("sum", Type::Num, vec![Type::list_of(Type::Num)], sum),
        native("max", Type::Num, vec![Type::Num, Type::Num], max_pair),
        native("max", Type::Num, vec![Type::list_of(Type::Num)], max_list),
        native("min", Type::Num, vec![Type::Num, Type::Num], min_pair),
        native("min", Type::Num, vec![Type::list_of(Type::Num)], min_list),
        native("str", Type::String, vec![Type::Any], stringify),
        native("rev", Type::String, vec![Type::String], rev),
    ];

    let mut scope = Scope::default();
    for declaration in declarations {
        scope.push_overload(Arc::new(declaration));
    }
    scope
}

fn mismatch(expected: &str, received: Option<&Literal>, span: Span) -> Error {
    Error::new(
        ErrorImpl::OperandTypeMismatch {
            expected: expected.to_string(),
            received: received.map(|l| l.tag()).unwrap_or("nothing").to_string(),
        },
        span,
    )
}

fn number(args: &[Literal], index: usize, span: Span) -> Result<f64, Error> {
    match args.get(index) {
        Some(Literal::Number(n)) => Ok(*n),
        other => Err(mismatch("number", other, span)),
    }
}

fn string(args: &[Literal], index: usize, span: Span) -> Result<&str, Error> {
    match args.get(index) {
        Some(Literal::String(s)) => Ok(s),
        other => Err(mismatch("string", other, span)),
    }
}

fn list(args: &[Literal], index: usize, span: Span) -> Result<&ListLiteral, Error> {
    match args.get(index) {
        Some(Literal::List(l)) => Ok(l),
        other => Err(mismatch("list", other, span)),
    }
}

/// The elements of a `list<num>` argument. Lists typed through `any` can
/// still hold other values, which are reported as invalid operands.
fn numbers(args: &[Literal], span: Span) -> Result<Vec<f64>, Error> {
    let list = list(args, 0, span)?;
    list.elements()
        .iter()
        .map(|e| match e {
            Literal::Number(n) => Ok(*n),
            other => Err(Error::new(
                ErrorImpl::InvalidOperand {
                    expected: Type::Num.to_string(),
                    received: other.get_type().to_string(),
                },
                span,
            )),
        })
        .collect()
}

fn len_list(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(list(args, 0, span)?.len() as f64))
}

fn len_string(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(string(args, 0, span)?.chars().count() as f64))
}

fn sqrt(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(number(args, 0, span)?.sqrt()))
}

fn abs(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(number(args, 0, span)?.abs()))
}

fn round(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(number(args, 0, span)?.round()))
}

fn sum(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(numbers(args, span)?.iter().sum()))
}

fn max_pair(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(number(args, 0, span)?.max(number(args, 1, span)?)))
}

fn min_pair(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::Number(number(args, 0, span)?.min(number(args, 1, span)?)))
}

fn empty_list(span: Span) -> Error {
    Error::new(ErrorImpl::IndexOutOfBounds { index: 0, length: 0 }, span)
}

fn max_list(args: &[Literal], span: Span) -> Result<Literal, Error> {
    numbers(args, span)?
        .into_iter()
        .reduce(f64::max)
        .map(Literal::Number)
        .ok_or_else(|| empty_list(span))
}

fn min_list(args: &[Literal], span: Span) -> Result<Literal, Error> {
    numbers(args, span)?
        .into_iter()
        .reduce(f64::min)
        .map(Literal::Number)
        .ok_or_else(|| empty_list(span))
}

fn stringify(args: &[Literal], span: Span) -> Result<Literal, Error> {
    match args.first() {
        Some(Literal::String(s)) => Ok(Literal::String(s.clone())),
        Some(other) => Ok(Literal::String(other.to_string())),
        None => Err(mismatch("any", None, span)),
    }
}

fn rev(args: &[Literal], span: Span) -> Result<Literal, Error> {
    Ok(Literal::String(string(args, 0, span)?.chars().rev().collect()))
}
