use tracing::debug;

use crate::{
    ast::ast::{Expr, ExprKind, Root},
    errors::errors::Error,
};

/// A rewrite of single nodes. The driver hands every node to the pass after
/// its children have been rewritten.
pub trait Transformation {
    fn name(&self) -> &'static str;

    fn transform(&mut self, expr: Expr) -> Result<Expr, Error>;
}

/// Runs `pass` over every top-level expression of `root` and rebuilds the
/// parent map for the rewritten tree.
pub fn transform_root(pass: &mut dyn Transformation, root: Root) -> Result<Root, Error> {
    debug!(pass = pass.name(), expressions = root.exprs.len(), "transforming");
    let span = root.span;

    let exprs = root
        .exprs
        .into_iter()
        .map(|expr| transform_expr(pass, expr))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Root::new(exprs, span))
}

/// Rewrites the children of `expr` bottom-up, then offers `expr` itself to
/// `pass`. A replacement keeps the id and span of the node it replaces.
pub fn transform_expr(pass: &mut dyn Transformation, expr: Expr) -> Result<Expr, Error> {
    let Expr {
        id,
        span,
        kind,
        ty,
        operator,
    } = expr;

    let rebuilt = Expr {
        id,
        span,
        kind: transform_children(pass, kind)?,
        ty,
        operator,
    };

    let mut replacement = pass.transform(rebuilt)?;
    replacement.id = id;
    replacement.span = span;
    Ok(replacement)
}

fn transform_boxed(pass: &mut dyn Transformation, expr: Box<Expr>) -> Result<Box<Expr>, Error> {
    transform_expr(pass, *expr).map(Box::new)
}

fn transform_all(pass: &mut dyn Transformation, exprs: Vec<Expr>) -> Result<Vec<Expr>, Error> {
    exprs
        .into_iter()
        .map(|expr| transform_expr(pass, expr))
        .collect()
}

fn transform_children(pass: &mut dyn Transformation, kind: ExprKind) -> Result<ExprKind, Error> {
    Ok(match kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Delete { .. } => kind,
        ExprKind::List(elements) => ExprKind::List(transform_all(pass, elements)?),
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op,
            left: transform_boxed(pass, left)?,
            right: transform_boxed(pass, right)?,
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: transform_boxed(pass, operand)?,
        },
        ExprKind::Range { start, end, step } => ExprKind::Range {
            start: transform_boxed(pass, start)?,
            end: transform_boxed(pass, end)?,
            step: match step {
                Some(step) => Some(transform_boxed(pass, step)?),
                None => None,
            },
        },
        ExprKind::Index { target, index } => ExprKind::Index {
            target: transform_boxed(pass, target)?,
            index: transform_boxed(pass, index)?,
        },
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => ExprKind::Conditional {
            condition: transform_boxed(pass, condition)?,
            then_branch: transform_boxed(pass, then_branch)?,
            else_branch: transform_boxed(pass, else_branch)?,
        },
        ExprKind::Call { callee, arguments } => ExprKind::Call {
            callee: transform_boxed(pass, callee)?,
            arguments: transform_all(pass, arguments)?,
        },
        ExprKind::Lambda { params, body } => ExprKind::Lambda {
            params,
            body: transform_boxed(pass, body)?,
        },
        ExprKind::Assignment { value, target } => ExprKind::Assignment {
            value: transform_boxed(pass, value)?,
            target,
        },
    })
}
