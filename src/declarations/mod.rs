//! Declarations and the scoped namespace they live in.
//!
//! - declaration: a named, typed binding with flags fixed at construction
//! - namespace: the scope chain with overloads and the shared global scope
//! - prelude: built-in functions
//! - suggestions: edit-distance ranking for unresolved names

pub mod declaration;
pub mod namespace;
pub mod prelude;
pub mod suggestions;
