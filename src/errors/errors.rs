use std::fmt::Display;

use thiserror::Error;

use crate::{declarations::suggestions::format_unknown_identifier, Span};

/// Broad classification of an [`Error`], so a host can tell user mistakes
/// from configuration bugs without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Declaration,
    DuplicateDeclaration,
    Semantic,
    Execution,
    Internal,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
    context: Option<Span>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
            context: None,
        }
    }

    /// Attaches the span of the enclosing node, used when rendering.
    pub fn with_context(mut self, context: Span) -> Self {
        self.context = Some(context);
        self
    }

    pub fn get_position(&self) -> &Span {
        &self.span
    }

    pub fn get_context(&self) -> Option<&Span> {
        self.context.as_ref()
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnclosedString
            | ErrorImpl::InvalidDate { .. }
            | ErrorImpl::InvalidTimespan { .. } => ErrorKind::Lexical,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::NestingTooDeep { .. } => ErrorKind::Syntax,
            ErrorImpl::UnknownIdentifier { .. } => ErrorKind::Declaration,
            ErrorImpl::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::IncompatibleOperator { .. }
            | ErrorImpl::IncompatibleCall { .. }
            | ErrorImpl::NotAFunction { .. }
            | ErrorImpl::EmptyList
            | ErrorImpl::DuplicateParameter { .. }
            | ErrorImpl::DeleteNative { .. } => ErrorKind::Semantic,
            ErrorImpl::DivisionByZero
            | ErrorImpl::IndexOutOfBounds { .. }
            | ErrorImpl::InvalidRange { .. }
            | ErrorImpl::ListTooLarge { .. }
            | ErrorImpl::CallDepthExceeded { .. }
            | ErrorImpl::EvaluationTooDeep { .. }
            | ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::NotAnInteger { .. }
            | ErrorImpl::ArithmeticOverflow { .. } => ErrorKind::Execution,
            ErrorImpl::InvalidOperatorType { .. }
            | ErrorImpl::OperandTypeMismatch { .. }
            | ErrorImpl::StackUnderflow
            | ErrorImpl::UnresolvedNode { .. } => ErrorKind::Internal,
        }
    }

    /// Suggested identifiers for an unresolved name, empty otherwise.
    pub fn suggestions(&self) -> &[String] {
        match &self.internal_error {
            ErrorImpl::UnknownIdentifier { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnclosedString => "UnclosedString",
            ErrorImpl::InvalidDate { .. } => "InvalidDate",
            ErrorImpl::InvalidTimespan { .. } => "InvalidTimespan",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::IncompatibleOperator { .. } => "IncompatibleOperator",
            ErrorImpl::IncompatibleCall { .. } => "IncompatibleCall",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::EmptyList => "EmptyList",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::DeleteNative { .. } => "DeleteNative",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::InvalidRange { .. } => "InvalidRange",
            ErrorImpl::ListTooLarge { .. } => "ListTooLarge",
            ErrorImpl::CallDepthExceeded { .. } => "CallDepthExceeded",
            ErrorImpl::EvaluationTooDeep { .. } => "EvaluationTooDeep",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::NotAnInteger { .. } => "NotAnInteger",
            ErrorImpl::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            ErrorImpl::InvalidOperatorType { .. } => "InvalidOperatorType",
            ErrorImpl::OperandTypeMismatch { .. } => "OperandTypeMismatch",
            ErrorImpl::StackUnderflow => "StackUnderflow",
            ErrorImpl::UnresolvedNode { .. } => "UnresolvedNode",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnclosedString => {
                ErrorTip::Suggestion(String::from("String literal is missing its closing quote"))
            }
            ErrorImpl::UnexpectedToken { token, expected } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, expected {}",
                token, expected
            )),
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`, expected one of num, string, bool, date, timespan, any",
                type_
            )),
            ErrorImpl::NestingTooDeep { .. } | ErrorImpl::EvaluationTooDeep { .. } => {
                ErrorTip::Suggestion(String::from("Split the expression into smaller named parts"))
            }
            ErrorImpl::UnknownIdentifier { suggestions, .. } if !suggestions.is_empty() => {
                ErrorTip::Suggestion(format!("Did you mean `{}`?", suggestions[0]))
            }
            ErrorImpl::DuplicateDeclaration { name, .. } => ErrorTip::Suggestion(format!(
                "Delete `{}` first using `del {}`",
                name, name
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::IncompatibleOperator { operator, operands } => ErrorTip::Suggestion(format!(
                "Operator `{}` does not accept ({})",
                operator, operands
            )),
            ErrorImpl::IncompatibleCall { function, arguments } => ErrorTip::Suggestion(format!(
                "No declaration of `{}` accepts arguments ({})",
                function, arguments
            )),
            ErrorImpl::InvalidOperand { expected, received } => ErrorTip::Suggestion(format!(
                "A value of type `{}` reached an operation expecting `{}` through an `any` type",
                received, expected
            )),
            ErrorImpl::IndexOutOfBounds { index, length } => ErrorTip::Suggestion(format!(
                "Valid indices are 0 to {}, received {}",
                length.saturating_sub(1),
                index
            )),
            ErrorImpl::InvalidOperatorType { .. }
            | ErrorImpl::OperandTypeMismatch { .. }
            | ErrorImpl::StackUnderflow
            | ErrorImpl::UnresolvedNode { .. } => ErrorTip::Suggestion(String::from(
                "This is an engine bug, not a problem with the input",
            )),
            _ => ErrorTip::None,
        }
    }

    /// The user facing message, including suggestions and position where
    /// the error kind carries them.
    pub fn get_message(&self) -> String {
        match &self.internal_error {
            ErrorImpl::UnknownIdentifier { name, suggestions } => {
                format_unknown_identifier(name, suggestions, &self.span)
            }
            other => other.to_string(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_message())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unclosed string literal")]
    UnclosedString,
    #[error("invalid date: {token:?}")]
    InvalidDate { token: String },
    #[error("invalid timespan: {token:?}")]
    InvalidTimespan { token: String },

    // syntax
    #[error("unexpected token {token:?}, expected {expected}")]
    UnexpectedToken { token: String, expected: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("expression nesting exceeds the maximum depth of {max}")]
    NestingTooDeep { max: usize },

    // declarations
    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String, suggestions: Vec<String> },
    #[error("'{name}' is already declared as `{existing}`, cannot redeclare it as `{received}`")]
    DuplicateDeclaration {
        name: String,
        existing: String,
        received: String,
    },

    // semantic
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator {operator} is not applicable to ({operands})")]
    IncompatibleOperator { operator: String, operands: String },
    #[error("no declaration of '{function}' accepts ({arguments})")]
    IncompatibleCall { function: String, arguments: String },
    #[error("expression of type {received} is not a function")]
    NotAFunction { received: String },
    #[error("empty list literals are not allowed")]
    EmptyList,
    #[error("parameter '{name}' declared twice")]
    DuplicateParameter { name: String },
    #[error("built-in '{name}' cannot be deleted")]
    DeleteNative { name: String },

    // execution
    #[error("division by zero")]
    DivisionByZero,
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("invalid range: {start} to {end}")]
    InvalidRange { start: f64, end: f64 },
    #[error("list of size {size} exceeds the maximum of {max}")]
    ListTooLarge { size: f64, max: usize },
    #[error("maximum call depth of {max} exceeded")]
    CallDepthExceeded { max: usize },
    #[error("evaluation nesting exceeds the maximum depth of {max}")]
    EvaluationTooDeep { max: usize },
    #[error("invalid operand: expected {expected}, received {received}")]
    InvalidOperand { expected: String, received: String },
    #[error("{value} is not an integer")]
    NotAnInteger { value: f64 },
    #[error("result of {operator} is out of range")]
    ArithmeticOverflow { operator: String },

    // internal
    #[error("invalid operator type: {operator}")]
    InvalidOperatorType { operator: String },
    #[error("operand tag mismatch: expected {expected}, received {received}")]
    OperandTypeMismatch { expected: String, received: String },
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error("node {node} was executed before being resolved")]
    UnresolvedNode { node: String },
}
