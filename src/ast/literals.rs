//! Runtime values.
//!
//! Every executed expression produces exactly one [`Literal`]. Lists share
//! their backing storage structurally; a binding that must own its list
//! calls [`Literal::deep_copy`].

use std::{fmt::Display, sync::Arc};

use chrono::{NaiveDateTime, Timelike};

use crate::{
    declarations::declaration::Declaration,
    errors::errors::Error,
    lexer::lexer::escape,
    Span,
};

use super::{
    ast::{Expr, Parameter},
    types::{FunctionType, Type},
};

pub type NativeFn = fn(&[Literal], Span) -> Result<Literal, Error>;

#[derive(Debug, Clone)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Date(NaiveDateTime),
    /// Seconds.
    Timespan(i64),
    List(ListLiteral),
    Function(FunctionLiteral),
}

impl Literal {
    pub fn get_type(&self) -> Type {
        match self {
            Literal::Number(_) => Type::Num,
            Literal::String(_) => Type::String,
            Literal::Boolean(_) => Type::Bool,
            Literal::Date(_) => Type::Date,
            Literal::Timespan(_) => Type::Timespan,
            Literal::List(list) => Type::list_of(list.element_type().clone()),
            Literal::Function(function) => Type::Function(function.signature.clone()),
        }
    }

    /// Copies nested lists into fresh storage so the result shares nothing
    /// with `self`.
    pub fn deep_copy(&self) -> Literal {
        match self {
            Literal::List(list) => Literal::List(list.deep_copy()),
            other => other.clone(),
        }
    }

    /// Name of the runtime tag, used in internal error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Literal::Number(_) => "number",
            Literal::String(_) => "string",
            Literal::Boolean(_) => "boolean",
            Literal::Date(_) => "date",
            Literal::Timespan(_) => "timespan",
            Literal::List(_) => "list",
            Literal::Function(_) => "function",
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Boolean(a), Literal::Boolean(b)) => a == b,
            (Literal::Date(a), Literal::Date(b)) => a == b,
            (Literal::Timespan(a), Literal::Timespan(b)) => a == b,
            (Literal::List(a), Literal::List(b)) => a.elements() == b.elements(),
            (Literal::Function(a), Literal::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(value) => write!(f, "{}", format_number(*value)),
            Literal::String(value) => write!(f, "\"{}\"", escape(value)),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Date(value) => write!(f, "{}", format_date(value)),
            Literal::Timespan(value) => write!(f, "{}", format_timespan(*value)),
            Literal::List(list) => write!(f, "{}", list),
            Literal::Function(function) => write!(f, "{}", function),
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn format_date(value: &NaiveDateTime) -> String {
    if value.second() != 0 {
        value.format("%d.%m.%Y@%H:%M:%S").to_string()
    } else if value.hour() != 0 || value.minute() != 0 {
        value.format("%d.%m.%Y@%H:%M").to_string()
    } else {
        value.format("%d.%m.%Y").to_string()
    }
}

const TIMESPAN_UNITS: [(char, i64); 6] = [
    ('y', 31_536_000),
    ('w', 604_800),
    ('d', 86_400),
    ('h', 3_600),
    ('m', 60),
    ('s', 1),
];

pub fn format_timespan(seconds: i64) -> String {
    if seconds == 0 {
        return String::from("0s");
    }

    let mut result = String::new();
    if seconds < 0 {
        result.push('-');
    }

    let mut remaining = seconds.unsigned_abs();
    for (unit, size) in TIMESPAN_UNITS {
        let size = size as u64;
        if remaining >= size {
            result.push_str(&format!("{}{}", remaining / size, unit));
            remaining %= size;
        }
    }

    result
}

#[derive(Debug, Clone)]
pub struct ListLiteral {
    elements: Arc<Vec<Literal>>,
    element_type: Type,
}

impl ListLiteral {
    pub fn new(elements: Vec<Literal>, element_type: Type) -> Self {
        ListLiteral {
            elements: Arc::new(elements),
            element_type,
        }
    }

    pub fn elements(&self) -> &[Literal] {
        &self.elements
    }

    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn deep_copy(&self) -> ListLiteral {
        ListLiteral::new(
            self.elements.iter().map(Literal::deep_copy).collect(),
            self.element_type.clone(),
        )
    }

    /// A new list holding the elements in reverse order.
    pub fn reversed(&self) -> ListLiteral {
        let mut elements = self.elements.as_ref().clone();
        elements.reverse();
        ListLiteral::new(elements, self.element_type.clone())
    }

    pub fn concat(&self, other: &ListLiteral) -> ListLiteral {
        let mut elements = self.elements.as_ref().clone();
        elements.extend(other.elements.iter().cloned());
        ListLiteral::new(elements, self.element_type.clone())
    }

    pub fn shares_storage(&self, other: &ListLiteral) -> bool {
        Arc::ptr_eq(&self.elements, &other.elements)
    }
}

impl Display for ListLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements = self
            .elements
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", elements)
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Lambda {
        params: Vec<Parameter>,
        body: Arc<Expr>,
        /// Bindings of the enclosing call frames at the time the lambda was
        /// evaluated.
        captured: Vec<Arc<Declaration>>,
    },
    Native(NativeFunction),
}

#[derive(Debug, Clone)]
pub struct FunctionLiteral {
    pub signature: FunctionType,
    pub body: FunctionBody,
}

impl PartialEq for FunctionLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
            && match (&self.body, &other.body) {
                (FunctionBody::Lambda { body: a, .. }, FunctionBody::Lambda { body: b, .. }) => {
                    Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
                }
                (FunctionBody::Native(a), FunctionBody::Native(b)) => a.name == b.name,
                _ => false,
            }
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            FunctionBody::Lambda { params, body, .. } => {
                let params = params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "\\({}: {})", params, body)
            }
            FunctionBody::Native(native) => write!(f, "{}", native.name),
        }
    }
}
