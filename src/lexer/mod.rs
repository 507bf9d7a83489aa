//! Lexical analysis.
//!
//! Converts source text into a stream of tokens. It handles:
//!
//! - Tokenization using an ordered table of anchored regex patterns
//! - Keywords, identifiers and number/string/date/timespan literals
//! - Token spans for error reporting

pub mod lexer;
pub mod tokens;
