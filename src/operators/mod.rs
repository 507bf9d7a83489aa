//! Operator framework.
//!
//! Operators are resolved against operand types during type checking and
//! executed against the operand stack afterwards.

pub mod operators;

#[cfg(test)]
mod tests;
