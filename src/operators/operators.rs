//! Operator descriptors.
//!
//! Every operator the language knows is a row in a static table: the syntax
//! it implements, the kind of routine that runs it, the operand types it
//! accepts and its result type. The type checker calls [`resolve`] to pick a
//! row and records its id on the node; the executor looks the row up again
//! and calls [`Operator::exec`].

use chrono::{NaiveDateTime, TimeDelta};
use lazy_static::lazy_static;
use tracing::trace;

use crate::{
    ast::{
        ast::OpType,
        literals::{ListLiteral, Literal},
        types::{format_types, Type, ANY_LIST},
    },
    config::Options,
    errors::errors::{Error, ErrorImpl},
    Span,
};

/// Index of an operator in the operator table.
pub type OperatorId = usize;

/// Step of a range written without `$`.
pub const DEFAULT_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    NumArithmetic,
    NumComparison,
    Equality,
    Boolean,
    StringConcat,
    StringComparison,
    ListConcat,
    ListIndex,
    StringIndex,
    DateTimespan,
    DateDifference,
    TimespanArithmetic,
    DateComparison,
    TimespanComparison,
    Negate,
    Not,
    ListReverse,
    Range,
    Conditional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub op: OpType,
    pub kind: OperatorKind,
    pub operands: Vec<Type>,
    pub result: Type,
}

lazy_static! {
    static ref OPERATORS: Vec<Operator> = operator_table();
}

const ORDERING_OPS: [OpType; 4] = [OpType::Less, OpType::Greater, OpType::LessEq, OpType::GreaterEq];

fn operator_table() -> Vec<Operator> {
    let mut table = vec![];
    let mut add = |ops: &[OpType], kind: OperatorKind, operands: Vec<Type>, result: Type| {
        for op in ops {
            table.push(Operator::new(*op, kind, operands.clone(), result.clone()));
        }
    };

    add(
        &[OpType::Add, OpType::Sub, OpType::Mul, OpType::Div, OpType::Mod, OpType::Pow],
        OperatorKind::NumArithmetic,
        vec![Type::Num, Type::Num],
        Type::Num,
    );
    add(&ORDERING_OPS, OperatorKind::NumComparison, vec![Type::Num, Type::Num], Type::Bool);
    add(&[OpType::Eq, OpType::NotEq], OperatorKind::Equality, vec![Type::Any, Type::Any], Type::Bool);
    add(&[OpType::And, OpType::Or], OperatorKind::Boolean, vec![Type::Bool, Type::Bool], Type::Bool);
    add(&[OpType::Add], OperatorKind::StringConcat, vec![Type::String, Type::String], Type::String);
    add(&ORDERING_OPS, OperatorKind::StringComparison, vec![Type::String, Type::String], Type::Bool);
    add(&[OpType::Add], OperatorKind::ListConcat, vec![ANY_LIST.clone(), ANY_LIST.clone()], ANY_LIST.clone());
    add(&[OpType::Index], OperatorKind::ListIndex, vec![ANY_LIST.clone(), Type::Num], Type::Any);
    add(&[OpType::Index], OperatorKind::StringIndex, vec![Type::String, Type::Num], Type::String);
    add(&[OpType::Add, OpType::Sub], OperatorKind::DateTimespan, vec![Type::Date, Type::Timespan], Type::Date);
    add(&[OpType::Sub], OperatorKind::DateDifference, vec![Type::Date, Type::Date], Type::Timespan);
    add(
        &[OpType::Add, OpType::Sub],
        OperatorKind::TimespanArithmetic,
        vec![Type::Timespan, Type::Timespan],
        Type::Timespan,
    );
    add(&ORDERING_OPS, OperatorKind::DateComparison, vec![Type::Date, Type::Date], Type::Bool);
    add(&ORDERING_OPS, OperatorKind::TimespanComparison, vec![Type::Timespan, Type::Timespan], Type::Bool);
    add(&[OpType::Neg], OperatorKind::Negate, vec![Type::Num], Type::Num);
    add(&[OpType::Neg], OperatorKind::Negate, vec![Type::Timespan], Type::Timespan);
    add(&[OpType::Not], OperatorKind::Not, vec![Type::Bool], Type::Bool);
    add(&[OpType::Not], OperatorKind::ListReverse, vec![ANY_LIST.clone()], ANY_LIST.clone());
    add(
        &[OpType::DotDot],
        OperatorKind::Range,
        vec![Type::Num, Type::Num, Type::Num],
        Type::list_of(Type::Num),
    );
    add(&[OpType::If], OperatorKind::Conditional, vec![Type::Bool, Type::Any, Type::Any], Type::Any);

    table
}

/// The operator registered under `id`.
pub fn get(id: OperatorId) -> Option<&'static Operator> {
    OPERATORS.get(id)
}

pub fn operators() -> &'static [Operator] {
    &OPERATORS
}

/// Picks the first operator implementing `op` that accepts `operands` and
/// returns its id together with the result type.
pub fn resolve(op: OpType, operands: &[Type], span: Span) -> Result<(OperatorId, Type), Error> {
    let found = OPERATORS
        .iter()
        .enumerate()
        .filter(|(_, operator)| operator.op == op)
        .find_map(|(id, operator)| operator.resolve(operands).map(|ty| (id, ty)));

    match found {
        Some((id, ty)) => {
            trace!(%op, operands = %format_types(operands), id, result = %ty, "resolved operator");
            Ok((id, ty))
        }
        None => Err(Error::new(
            ErrorImpl::IncompatibleOperator {
                operator: op.to_string(),
                operands: format_types(operands),
            },
            span,
        )),
    }
}

/// The common type of two compatible types. A wildcard on either side
/// makes the result that wildcard, as nothing is known statically about the
/// values behind it.
fn unify(a: &Type, b: &Type) -> Option<Type> {
    if !a.check(b) && !b.check(a) {
        return None;
    }

    Some(widen(a, b))
}

fn widen(a: &Type, b: &Type) -> Type {
    match (a, b) {
        _ if is_wildcard(a) => a.clone(),
        _ if is_wildcard(b) => b.clone(),
        (Type::List(a), Type::List(b)) => Type::list_of(widen(a, b)),
        _ => a.clone(),
    }
}

fn is_wildcard(ty: &Type) -> bool {
    matches!(ty, Type::Any) || ty.is_any_list()
}

impl Operator {
    pub fn new(op: OpType, kind: OperatorKind, operands: Vec<Type>, result: Type) -> Self {
        Operator {
            op,
            kind,
            operands,
            result,
        }
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    /// The result type for the given operand types, or `None` when this
    /// operator does not accept them. Generic kinds derive the result from
    /// the concrete operand types.
    pub fn resolve(&self, operands: &[Type]) -> Option<Type> {
        if operands.len() != self.operands.len() {
            return None;
        }
        if !self
            .operands
            .iter()
            .zip(operands.iter())
            .all(|(expected, received)| expected.check(received))
        {
            return None;
        }

        match self.kind {
            OperatorKind::ListConcat => unify(&operands[0], &operands[1]),
            OperatorKind::ListIndex => operands[0].element_type().cloned(),
            OperatorKind::ListReverse => Some(operands[0].clone()),
            OperatorKind::Equality => unify(&operands[0], &operands[1]).map(|_| Type::Bool),
            OperatorKind::Conditional => unify(&operands[1], &operands[2]),
            _ => Some(self.result.clone()),
        }
    }

    /// Pops this operator's operands off `stack` and pushes the result.
    pub fn exec(&self, stack: &mut Vec<Literal>, span: Span, options: &Options) -> Result<(), Error> {
        let arity = self.arity();
        if stack.len() < arity {
            return Err(Error::new(ErrorImpl::StackUnderflow, span));
        }
        let operands = stack.split_off(stack.len() - arity);
        trace!(op = %self.op, kind = ?self.kind, "exec operator");

        // Values typed through `any` are only checked here.
        for (expected, operand) in self.operands.iter().zip(&operands) {
            let received = operand.get_type();
            if !expected.check(&received) {
                return Err(Error::new(
                    ErrorImpl::InvalidOperand {
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                    span,
                ));
            }
        }

        let result = match self.kind {
            OperatorKind::NumArithmetic => self.num_arithmetic(&operands, span)?,
            OperatorKind::NumComparison => {
                let (a, b) = binary(&operands, span)?;
                self.compare(number(a, span)?, number(b, span)?, span)?
            }
            OperatorKind::Equality => {
                let (a, b) = binary(&operands, span)?;
                match self.op {
                    OpType::Eq => Literal::Boolean(a == b),
                    OpType::NotEq => Literal::Boolean(a != b),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::Boolean => {
                let (a, b) = binary(&operands, span)?;
                let (a, b) = (boolean(a, span)?, boolean(b, span)?);
                match self.op {
                    OpType::And => Literal::Boolean(a && b),
                    OpType::Or => Literal::Boolean(a || b),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::StringConcat => {
                let (a, b) = binary(&operands, span)?;
                let (a, b) = (string(a, span)?, string(b, span)?);
                match self.op {
                    OpType::Add => Literal::String(format!("{}{}", a, b)),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::StringComparison => {
                let (a, b) = binary(&operands, span)?;
                self.compare(string(a, span)?, string(b, span)?, span)?
            }
            OperatorKind::ListConcat => {
                let (a, b) = binary(&operands, span)?;
                let (a, b) = (list(a, span)?, list(b, span)?);
                match self.op {
                    OpType::Add => Literal::List(a.concat(b)),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::ListIndex => {
                let (target, index) = binary(&operands, span)?;
                let target = list(target, span)?;
                match self.op {
                    OpType::Index => {
                        let index = checked_index(number(index, span)?, target.len(), span)?;
                        target.elements()[index].clone()
                    }
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::StringIndex => {
                let (target, index) = binary(&operands, span)?;
                let target = string(target, span)?;
                match self.op {
                    OpType::Index => {
                        let length = target.chars().count();
                        let index = checked_index(number(index, span)?, length, span)?;
                        Literal::String(target.chars().skip(index).take(1).collect())
                    }
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::DateTimespan => {
                let (a, b) = binary(&operands, span)?;
                let (date, seconds) = (date(a, span)?, timespan(b, span)?);
                let delta = TimeDelta::try_seconds(seconds).ok_or_else(|| self.overflow(span))?;
                let shifted = match self.op {
                    OpType::Add => date.checked_add_signed(delta),
                    OpType::Sub => date.checked_sub_signed(delta),
                    _ => return Err(self.invalid_operator_type(span)),
                };
                Literal::Date(shifted.ok_or_else(|| self.overflow(span))?)
            }
            OperatorKind::DateDifference => {
                let (a, b) = binary(&operands, span)?;
                match self.op {
                    OpType::Sub => Literal::Timespan((date(a, span)? - date(b, span)?).num_seconds()),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::TimespanArithmetic => {
                let (a, b) = binary(&operands, span)?;
                let (a, b) = (timespan(a, span)?, timespan(b, span)?);
                let value = match self.op {
                    OpType::Add => a.checked_add(b),
                    OpType::Sub => a.checked_sub(b),
                    _ => return Err(self.invalid_operator_type(span)),
                };
                Literal::Timespan(value.ok_or_else(|| self.overflow(span))?)
            }
            OperatorKind::DateComparison => {
                let (a, b) = binary(&operands, span)?;
                self.compare(date(a, span)?, date(b, span)?, span)?
            }
            OperatorKind::TimespanComparison => {
                let (a, b) = binary(&operands, span)?;
                self.compare(timespan(a, span)?, timespan(b, span)?, span)?
            }
            OperatorKind::Negate => {
                let operand = unary(&operands, span)?;
                if self.op != OpType::Neg {
                    return Err(self.invalid_operator_type(span));
                }
                match operand {
                    Literal::Number(value) => Literal::Number(-value),
                    Literal::Timespan(value) => {
                        Literal::Timespan(value.checked_neg().ok_or_else(|| self.overflow(span))?)
                    }
                    other => return Err(mismatch("number or timespan", other, span)),
                }
            }
            OperatorKind::Not => {
                let operand = boolean(unary(&operands, span)?, span)?;
                match self.op {
                    OpType::Not => Literal::Boolean(!operand),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::ListReverse => {
                let operand = list(unary(&operands, span)?, span)?;
                match self.op {
                    OpType::Not => Literal::List(operand.reversed()),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::Range => {
                let (start, end, step) = ternary(&operands, span)?;
                match self.op {
                    OpType::DotDot => Literal::List(create_sequence(
                        number(start, span)?,
                        number(end, span)?,
                        number(step, span)?,
                        span,
                        options.max_list_size,
                    )?),
                    _ => return Err(self.invalid_operator_type(span)),
                }
            }
            OperatorKind::Conditional => {
                let (condition, then_value, else_value) = ternary(&operands, span)?;
                if self.op != OpType::If {
                    return Err(self.invalid_operator_type(span));
                }
                if boolean(condition, span)? {
                    then_value.clone()
                } else {
                    else_value.clone()
                }
            }
        };

        stack.push(result);
        Ok(())
    }

    fn num_arithmetic(&self, operands: &[Literal], span: Span) -> Result<Literal, Error> {
        let (a, b) = binary(operands, span)?;
        let (a, b) = (number(a, span)?, number(b, span)?);

        let value = match self.op {
            OpType::Add => a + b,
            OpType::Sub => a - b,
            OpType::Mul => a * b,
            OpType::Div | OpType::Mod if b == 0.0 => {
                return Err(Error::new(ErrorImpl::DivisionByZero, span));
            }
            OpType::Div => a / b,
            OpType::Mod => a % b,
            OpType::Pow => a.powf(b),
            _ => return Err(self.invalid_operator_type(span)),
        };

        Ok(Literal::Number(value))
    }

    fn compare<T: PartialOrd>(&self, a: T, b: T, span: Span) -> Result<Literal, Error> {
        let result = match self.op {
            OpType::Less => a < b,
            OpType::Greater => a > b,
            OpType::LessEq => a <= b,
            OpType::GreaterEq => a >= b,
            _ => return Err(self.invalid_operator_type(span)),
        };
        Ok(Literal::Boolean(result))
    }

    fn invalid_operator_type(&self, span: Span) -> Error {
        Error::new(
            ErrorImpl::InvalidOperatorType {
                operator: format!("{} ({:?})", self.op, self.kind),
            },
            span,
        )
    }

    fn overflow(&self, span: Span) -> Error {
        Error::new(
            ErrorImpl::ArithmeticOverflow {
                operator: self.op.to_string(),
            },
            span,
        )
    }
}

/// Builds the list `start..end$step`.
///
/// A descending range needs a negative step. The produced values start at
/// `start` and advance by `step`; the number of elements is bounded by
/// `max_size`.
pub fn create_sequence(
    start: f64,
    end: f64,
    step: f64,
    span: Span,
    max_size: usize,
) -> Result<ListLiteral, Error> {
    let (mut low, mut high) = (start, end);

    if low > high && step > 0.0 {
        return Err(Error::new(ErrorImpl::InvalidRange { start, end }, span));
    } else if low > high {
        std::mem::swap(&mut low, &mut high);
    }

    let size = (high - low).abs() / step.abs();
    // A zero step gives an infinite size.
    if size.is_nan() || size > max_size as f64 {
        return Err(Error::new(ErrorImpl::ListTooLarge { size, max: max_size }, span));
    }

    let mut elements = vec![];
    let mut value = start;
    while low <= high {
        elements.push(Literal::Number(value));
        value += step;
        low += step.abs();
    }

    Ok(ListLiteral::new(elements, Type::Num))
}

/// Converts a number used as an index, checking it is a whole number inside
/// `0..length`.
fn checked_index(value: f64, length: usize, span: Span) -> Result<usize, Error> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::new(ErrorImpl::NotAnInteger { value }, span));
    }
    if value < 0.0 || value >= length as f64 {
        return Err(Error::new(
            ErrorImpl::IndexOutOfBounds {
                index: value as i64,
                length,
            },
            span,
        ));
    }
    Ok(value as usize)
}

fn unary(operands: &[Literal], span: Span) -> Result<&Literal, Error> {
    match operands {
        [operand] => Ok(operand),
        _ => Err(Error::new(ErrorImpl::StackUnderflow, span)),
    }
}

fn binary(operands: &[Literal], span: Span) -> Result<(&Literal, &Literal), Error> {
    match operands {
        [a, b] => Ok((a, b)),
        _ => Err(Error::new(ErrorImpl::StackUnderflow, span)),
    }
}

fn ternary(operands: &[Literal], span: Span) -> Result<(&Literal, &Literal, &Literal), Error> {
    match operands {
        [a, b, c] => Ok((a, b, c)),
        _ => Err(Error::new(ErrorImpl::StackUnderflow, span)),
    }
}

fn mismatch(expected: &str, received: &Literal, span: Span) -> Error {
    Error::new(
        ErrorImpl::OperandTypeMismatch {
            expected: expected.to_string(),
            received: received.tag().to_string(),
        },
        span,
    )
}

fn number(literal: &Literal, span: Span) -> Result<f64, Error> {
    match literal {
        Literal::Number(value) => Ok(*value),
        other => Err(mismatch("number", other, span)),
    }
}

fn boolean(literal: &Literal, span: Span) -> Result<bool, Error> {
    match literal {
        Literal::Boolean(value) => Ok(*value),
        other => Err(mismatch("boolean", other, span)),
    }
}

fn string(literal: &Literal, span: Span) -> Result<&str, Error> {
    match literal {
        Literal::String(value) => Ok(value),
        other => Err(mismatch("string", other, span)),
    }
}

fn date(literal: &Literal, span: Span) -> Result<NaiveDateTime, Error> {
    match literal {
        Literal::Date(value) => Ok(*value),
        other => Err(mismatch("date", other, span)),
    }
}

fn timespan(literal: &Literal, span: Span) -> Result<i64, Error> {
    match literal {
        Literal::Timespan(value) => Ok(*value),
        other => Err(mismatch("timespan", other, span)),
    }
}

fn list(literal: &Literal, span: Span) -> Result<&ListLiteral, Error> {
    match literal {
        Literal::List(value) => Ok(value),
        other => Err(mismatch("list", other, span)),
    }
}
