use crate::{
    ast::{
        ast::{AssignTarget, DeleteTarget, Expr, ExprKind, OpType, Parameter},
        literals::Literal,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{parse_date, parse_timespan},
        tokens::{Token, TokenKind},
    },
};

use super::{lookups::BindingPower, parser::Parser, types::parse_type};

/// Parses an expression whose operators bind tighter than `bp`. Every
/// nested call and every operator folded into the left hand side counts
/// towards the parser's depth limit, so the depth bounds the height of the
/// resulting tree.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    let depth = parser.depth();
    let result = parse_nested_expr(parser, bp);
    parser.restore_depth(depth);
    result
}

fn parse_nested_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    parser.descend()?;

    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected("an expression")),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected("an operator")),
        };

        parser.descend()?;
        let binding_power = parser.current_binding_power();
        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

fn binary_op(kind: TokenKind) -> Option<OpType> {
    match kind {
        TokenKind::Plus => Some(OpType::Add),
        TokenKind::Dash => Some(OpType::Sub),
        TokenKind::Star => Some(OpType::Mul),
        TokenKind::Slash => Some(OpType::Div),
        TokenKind::Percent => Some(OpType::Mod),
        TokenKind::Caret => Some(OpType::Pow),
        TokenKind::Equals => Some(OpType::Eq),
        TokenKind::NotEquals => Some(OpType::NotEq),
        TokenKind::Less => Some(OpType::Less),
        TokenKind::Greater => Some(OpType::Greater),
        TokenKind::LessEquals => Some(OpType::LessEq),
        TokenKind::GreaterEquals => Some(OpType::GreaterEq),
        TokenKind::And => Some(OpType::And),
        TokenKind::Or => Some(OpType::Or),
        _ => None,
    }
}

fn literal_from_token(token: &Token) -> Result<Literal, Error> {
    let invalid = |error: ErrorImpl| Error::new(error, token.span);

    match token.kind {
        TokenKind::Number => token.value.parse::<f64>().map(Literal::Number).map_err(|_| {
            invalid(ErrorImpl::NumberParseError {
                token: token.value.clone(),
            })
        }),
        TokenKind::String => Ok(Literal::String(token.value.clone())),
        TokenKind::True => Ok(Literal::Boolean(true)),
        TokenKind::False => Ok(Literal::Boolean(false)),
        TokenKind::Date => parse_date(&token.value).map(Literal::Date).ok_or_else(|| {
            invalid(ErrorImpl::InvalidDate {
                token: token.value.clone(),
            })
        }),
        TokenKind::Timespan => parse_timespan(&token.value)
            .map(Literal::Timespan)
            .ok_or_else(|| {
                invalid(ErrorImpl::InvalidTimespan {
                    token: token.value.clone(),
                })
            }),
        _ => Err(invalid(ErrorImpl::UnexpectedToken {
            token: token.to_string(),
            expected: String::from("a literal"),
        })),
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let id = parser.advance_id();

    let kind = match token.kind {
        TokenKind::Identifier => ExprKind::Identifier(token.value.clone()),
        _ => ExprKind::Literal(literal_from_token(&token)?),
    };

    Ok(Expr::new(id, token.span, kind))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let op = binary_op(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.to_string(),
                expected: String::from("a binary operator"),
            },
            operator_token.span,
        )
    })?;

    let right = parse_expr(parser, bp)?;

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&right.span),
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    ))
}

/// `^` is right associative: the right operand binds everything of higher
/// power than unary operators, including further `^`.
pub fn parse_power_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let right = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&right.span),
        ExprKind::Binary {
            op: OpType::Pow,
            left: Box::new(left),
            right: Box::new(right),
        },
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let op = if operator_token.kind == TokenKind::Not {
        OpType::Not
    } else {
        OpType::Neg
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(
        parser.advance_id(),
        operator_token.span.cover(&operand.span),
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
    ))
}

pub fn parse_range_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let end = parse_expr(parser, bp)?;

    let step = if parser.current_token_kind() == TokenKind::Dollar {
        parser.advance();
        Some(Box::new(parse_expr(parser, bp)?))
    } else {
        None
    };

    let last = step.as_ref().map(|s| s.span).unwrap_or(end.span);

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&last),
        ExprKind::Range {
            start: Box::new(left),
            end: Box::new(end),
            step,
        },
    ))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();

    let public = parser.current_token_kind() == TokenKind::Public;
    if public {
        parser.advance();
    }

    let temp = parser.current_token_kind() == TokenKind::Temp;
    if temp {
        parser.advance();
    }

    let name = parser.expect(TokenKind::Identifier)?;

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&name.span),
        ExprKind::Assignment {
            value: Box::new(left),
            target: AssignTarget {
                name: name.value,
                span: name.span,
                public,
                temp,
            },
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses `expr (',' expr)*` up to (and including) the `close` token.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<(Vec<Expr>, Token), Error> {
    let mut exprs = vec![];

    if parser.current_token_kind() != close {
        loop {
            exprs.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    let close = parser.expect(close)?;
    Ok((exprs, close))
}

pub fn parse_list_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance();
    let (elements, close) = parse_expr_list(parser, TokenKind::CloseCurly)?;

    Ok(Expr::new(
        parser.advance_id(),
        open.span.cover(&close.span),
        ExprKind::List(elements),
    ))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let (arguments, close) = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&close.span),
        ExprKind::Call {
            callee: Box::new(left),
            arguments,
        },
    ))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    let close = parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::new(
        parser.advance_id(),
        left.span.cover(&close.span),
        ExprKind::Index {
            target: Box::new(left),
            index: Box::new(index),
        },
    ))
}

pub fn parse_lambda_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance();
    let mut params = vec![];

    if parser.current_token_kind() != TokenKind::Colon {
        loop {
            let type_start = parser.current_token().span;
            let ty = parse_type(parser)?;
            let name = parser.expect(TokenKind::Identifier)?;
            params.push(Parameter {
                name: name.value,
                ty,
                span: type_start.cover(&name.span),
            });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    parser.expect(TokenKind::Colon)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(
        parser.advance_id(),
        open.span.cover(&close.span),
        ExprKind::Lambda {
            params,
            body: Box::new(body),
        },
    ))
}

pub fn parse_conditional_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let if_token = parser.advance();

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Colon)?;
    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Colon)?;
    // Stop before `->` so an assignment applies to the whole conditional.
    let else_branch = parse_expr(parser, BindingPower::Assignment)?;

    Ok(Expr::new(
        parser.advance_id(),
        if_token.span.cover(&else_branch.span),
        ExprKind::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
    ))
}

pub fn parse_delete_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let del = parser.advance();
    let mut targets = vec![];

    loop {
        let public = parser.current_token_kind() == TokenKind::Public;
        if public {
            parser.advance();
        }

        let name = parser.expect(TokenKind::Identifier)?;
        targets.push(DeleteTarget {
            name: name.value,
            span: name.span,
            public,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    let end = targets.last().map(|t| t.span).unwrap_or(del.span);

    Ok(Expr::new(
        parser.advance_id(),
        del.span.cover(&end),
        ExprKind::Delete { targets },
    ))
}
