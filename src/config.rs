//! Engine limits and switches.

/// Limits applied while evaluating one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Largest list a range expression may produce.
    pub max_list_size: usize,
    /// Number of "did you mean" candidates reported for an unknown name.
    pub max_suggestions: usize,
    /// Deepest allowed nesting of function calls.
    pub max_call_depth: usize,
    /// Deepest allowed nesting of expressions and types in one input.
    /// Execution, which also nests through calls, may go twice as deep.
    pub max_nesting_depth: usize,
    /// Run constant folding before type checking.
    pub fold_constants: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_list_size: 10_000,
            max_suggestions: 3,
            max_call_depth: 64,
            max_nesting_depth: 256,
            fold_constants: true,
        }
    }
}
