//! Type checking and semantic analysis module.
//!
//! Walks the parsed tree bottom-up and:
//!
//! - resolves identifiers and call targets through the namespace
//! - picks an operator for every operator node
//! - annotates every node with its type
//!
//! Declarations made by the input are applied to a fork of the namespace, so
//! checking never changes the caller's state.

pub mod type_checker;
