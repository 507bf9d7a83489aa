//! Parser module for building the expression tree.
//!
//! Transforms a stream of tokens into a [`crate::ast::ast::Root`]. It uses a
//! Pratt parser with NUD (null denotation) and LED (left denotation)
//! handlers and a binding power table for precedence, and handles:
//!
//! - Operators, calls, indexing and ranges
//! - List, lambda, conditional, assignment and delete expressions
//! - Type annotations on lambda parameters
//!
//! No semantic validation happens here.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod types;
