//! Stack machine evaluation of type checked trees.
//!
//! Every expression leaves exactly one value on the operand stack. Calls run
//! in a fresh scope that is popped again whether or not the body fails.

pub mod executor;

#[cfg(test)]
mod tests;
