/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the tree and the values it produces
///
/// Submodules:
/// - ast: Expression nodes, the parent map and the root
/// - literals: Runtime values
/// - types: The structural type system
pub mod ast;
pub mod literals;
pub mod types;

#[cfg(test)]
mod tests;
