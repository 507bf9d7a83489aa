#![allow(clippy::module_inception)]

use std::fmt::Display;

use crate::{
    ast::ast::Root,
    declarations::namespace::Namespace,
    errors::errors::Error,
    ast::literals::Literal,
    type_checker::type_checker::TypedRoot,
};

pub mod ast;
pub mod config;
pub mod declarations;
pub mod diagnostics;
pub mod errors;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod macros;
pub mod operators;
pub mod parser;
pub mod transform;
pub mod type_checker;

extern crate regex;

/// A byte offset into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0)
    }
}

/// A half-open `start..end` byte range of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span {
            start: Position(start),
            end: Position(end),
        }
    }

    pub fn null() -> Self {
        Span::default()
    }

    /// The smallest span containing both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.0.saturating_sub(self.start.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.0, self.end.0)
    }
}

/// Tokenizes and parses `source` into an untyped tree.
pub fn parse(source: &str) -> Result<Root, Error> {
    parse_with(source, &config::Options::default())
}

/// Like [`parse`], with the nesting limit taken from `options`.
pub fn parse_with(source: &str, options: &config::Options) -> Result<Root, Error> {
    let tokens = lexer::lexer::tokenize(source)?;
    parser::parser::parse(tokens, options)
}

/// Resolves names and types of `root` against a snapshot of `namespace`.
pub fn type_check(root: Root, namespace: &Namespace) -> Result<TypedRoot, Error> {
    type_checker::type_checker::type_check(root, namespace)
}

/// Executes a resolved tree, returning one value per top-level expression.
pub fn execute(root: &TypedRoot, namespace: &mut Namespace) -> Result<Vec<Literal>, Error> {
    executor::executor::execute(root, namespace, &config::Options::default())
}

/// Returns the 1-based line number, the text of that line and the column of
/// `position` inside it.
pub fn get_line_at_position(content: &str, position: u32) -> (usize, String, usize) {
    let pos = (position as usize).min(content.len());

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.trim_end_matches('\n').to_string(), pos - start);
        }

        start = end;
        line_number += 1;
    }

    // Position at the very end of the input points just past the last line.
    let last = content.rsplit('\n').next().unwrap_or("");
    (
        content.matches('\n').count() + 1,
        last.to_string(),
        last.len(),
    )
}
