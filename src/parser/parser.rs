//! Parser implementation for building the expression tree.
//!
//! The parser is a Pratt parser: NUD (null denotation) handlers parse
//! prefix positions, LED (left denotation) handlers parse infix positions
//! and a binding power table decides precedence. Type annotations have their
//! own NUD table.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::ast::{NodeId, Root},
    config::Options,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span, MK_TOKEN,
};

use super::{
    expr::parse_expr,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
    },
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// Parsing state: the token stream, the lookup tables, the node id
/// counter and the current nesting depth.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
    current_id: NodeId,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, max_depth: usize) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let end = tokens.last().map(|t| t.span.end.0).unwrap_or(0);
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                Span::new(end, end)
            ));
        }

        Parser {
            tokens,
            pos: 0,
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            current_id: 0,
            depth: 0,
            max_depth,
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous one. Never moves
    /// past the final EOF token.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn unexpected(&self, expected: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: token.to_string(),
                expected: expected.to_string(),
            },
            token.span,
        )
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            Err(self.unexpected(&format!("`{}`", expected_kind.symbol())))
        } else {
            Ok(self.advance())
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Binding power of the current token; tokens without one end an
    /// expression.
    pub fn current_binding_power(&self) -> BindingPower {
        *self
            .binding_power_lookup
            .get(&self.current_token_kind())
            .unwrap_or(&BindingPower::Default)
    }

    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Restores a depth saved with [`Parser::depth`] once a nested parse
    /// returns.
    pub fn restore_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Goes one level deeper, failing at the current token once the
    /// configured maximum is passed.
    pub fn descend(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep {
                    max: self.max_depth,
                },
                self.current_token().span,
            ));
        }
        Ok(())
    }

    /// Advances the internal ID counter and returns the previous value.
    pub fn advance_id(&mut self) -> NodeId {
        let id = self.current_id;
        self.current_id += 1;
        id
    }
}

/// Parses a token stream into a [`Root`] of `;`-separated expressions.
pub fn parse(tokens: Vec<Token>, options: &Options) -> Result<Root, Error> {
    let mut parser = Parser::new(tokens, options.max_nesting_depth);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let start = parser.current_token().span.start;
    let mut exprs = vec![];

    loop {
        exprs.push(parse_expr(&mut parser, BindingPower::Default)?);

        match parser.current_token_kind() {
            TokenKind::Semicolon => {
                parser.advance();
                if !parser.has_tokens() {
                    break;
                }
            }
            TokenKind::EOF => break,
            _ => return Err(parser.unexpected("`;` or end of input")),
        }
    }

    let end = exprs.last().map(|e| e.span.end).unwrap_or(start);
    debug!(expressions = exprs.len(), nodes = parser.current_id, "parsed input");

    Ok(Root::new(exprs, Span { start, end }))
}
