use tracing::trace;

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        literals::Literal,
        types::Type,
    },
    config::Options,
    errors::errors::Error,
    operators::operators::{self, OperatorKind},
};

use super::transform::Transformation;

const FOLDABLE: [OperatorKind; 5] = [
    OperatorKind::NumArithmetic,
    OperatorKind::Boolean,
    OperatorKind::StringConcat,
    OperatorKind::Negate,
    OperatorKind::Not,
];

/// Replaces operator nodes whose operands are all literals with their value.
///
/// Operators that fail, such as a division by zero, are left in place so the
/// fault is reported when the input runs.
#[derive(Debug, Default)]
pub struct ConstantFolding {
    options: Options,
    pub folded: usize,
}

impl ConstantFolding {
    pub fn new(options: &Options) -> Self {
        ConstantFolding {
            options: options.clone(),
            folded: 0,
        }
    }

    fn fold(&self, expr: &Expr) -> Option<Literal> {
        let (op, operands) = match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                (*op, vec![left.as_literal()?, right.as_literal()?])
            }
            ExprKind::Unary { op, operand } => (*op, vec![operand.as_literal()?]),
            _ => return None,
        };

        let types: Vec<Type> = operands.iter().map(|literal| literal.get_type()).collect();
        let (id, _) = operators::resolve(op, &types, expr.span).ok()?;
        let operator = operators::get(id)?;
        if !FOLDABLE.contains(&operator.kind) {
            return None;
        }

        let mut stack: Vec<Literal> = operands.into_iter().cloned().collect();
        operator.exec(&mut stack, expr.span, &self.options).ok()?;
        stack.pop()
    }
}

impl Transformation for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant folding"
    }

    fn transform(&mut self, expr: Expr) -> Result<Expr, Error> {
        match self.fold(&expr) {
            Some(value) => {
                trace!(expr = %expr, value = %value, "folded");
                self.folded += 1;
                Ok(Expr::new(expr.id, expr.span, ExprKind::Literal(value)))
            }
            None => Ok(expr),
        }
    }
}
