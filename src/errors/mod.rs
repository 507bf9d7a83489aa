//! Error types and error handling for the engine.
//!
//! Every pass (lexing, parsing, resolution, execution) reports failures
//! through the single [`errors::Error`] type. It includes:
//!
//! - The error variant with its data
//! - The span of the offending input and an optional enclosing span
//! - A coarse [`errors::ErrorKind`] so hosts can separate user errors from
//!   internal ones
//! - Tips and formatted messages

pub mod errors;
