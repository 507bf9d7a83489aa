//! Type annotation parsing.
//!
//! Parameter types are written as a primitive name (`num`, `string`, `bool`,
//! `date`, `timespan`, `any`), a list type `list<T>` or a function type
//! `(T1 T2 -> R)`. Dispatch goes through a NUD table like expressions do.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::List, parse_list_type);
    parser.type_nud(TokenKind::OpenParen, parse_function_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Type::from_name(&token.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType {
                type_: token.value.clone(),
            },
            token.span,
        )
    })
}

pub fn parse_list_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::List)?;
    parser.expect(TokenKind::Less)?;
    let element = parse_type(parser)?;
    parser.expect(TokenKind::Greater)?;

    Ok(Type::list_of(element))
}

pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::Arrow {
        params.push(parse_type(parser)?);
    }

    parser.expect(TokenKind::Arrow)?;
    let ret = parse_type(parser)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Type::function(ret, params))
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let depth = parser.depth();
    parser.descend()?;

    let token_kind = parser.current_token_kind();
    let result = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => nud(parser),
        None => Err(parser.unexpected("a type")),
    };

    parser.restore_depth(depth);
    result
}
