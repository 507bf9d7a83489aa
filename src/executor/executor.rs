use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, ExprKind, ParentMap},
        literals::{FunctionBody, FunctionLiteral, ListLiteral, Literal},
        types::Type,
    },
    config::Options,
    declarations::{declaration::Declaration, namespace::Namespace},
    errors::errors::{Error, ErrorImpl},
    operators::operators::{self, DEFAULT_STEP},
    type_checker::type_checker::TypedRoot,
    Span,
};

/// Evaluation state: the operand stack and the namespace values are bound
/// in.
pub struct Executor<'a> {
    pub namespace: &'a mut Namespace,
    pub options: &'a Options,
    pub parents: &'a ParentMap,
    pub stack: Vec<Literal>,
    depth: usize,
    nesting: usize,
}

impl<'a> Executor<'a> {
    pub fn new(namespace: &'a mut Namespace, options: &'a Options, parents: &'a ParentMap) -> Self {
        Executor {
            namespace,
            options,
            parents,
            stack: vec![],
            depth: 0,
            nesting: 0,
        }
    }

    /// Deepest allowed nesting of [`execute_expr`], counted across calls.
    pub fn max_nesting(&self) -> usize {
        self.options.max_nesting_depth.saturating_mul(2)
    }

    pub fn pop(&mut self, span: Span) -> Result<Literal, Error> {
        self.stack
            .pop()
            .ok_or_else(|| Error::new(ErrorImpl::StackUnderflow, span))
    }

    fn pop_n(&mut self, count: usize, span: Span) -> Result<Vec<Literal>, Error> {
        if self.stack.len() < count {
            return Err(Error::new(ErrorImpl::StackUnderflow, span));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// Calls `function` with `arguments` and pushes its result.
    pub fn call(&mut self, function: &FunctionLiteral, arguments: Vec<Literal>, span: Span) -> Result<(), Error> {
        if self.depth >= self.options.max_call_depth {
            return Err(Error::new(
                ErrorImpl::CallDepthExceeded {
                    max: self.options.max_call_depth,
                },
                span,
            ));
        }

        for (expected, argument) in function.signature.params.iter().zip(&arguments) {
            if !expected.check(&argument.get_type()) {
                return Err(invalid_operand(expected, argument, span));
            }
        }

        match &function.body {
            FunctionBody::Native(native) => {
                trace!(function = native.name, "call native");
                let result = (native.func)(&arguments, span)?;
                self.stack.push(result);
                Ok(())
            }
            FunctionBody::Lambda {
                params,
                body,
                captured,
            } => {
                trace!(function = %function, "call");
                self.namespace.enter();
                self.depth += 1;

                for declaration in captured {
                    self.namespace.import(Arc::clone(declaration));
                }
                for (param, argument) in params.iter().zip(arguments) {
                    self.namespace.declare_local(Declaration::bound(
                        &param.name,
                        param.span,
                        param.ty.clone(),
                        argument,
                        false,
                        false,
                    ));
                }

                let result = execute_expr(self, body);

                self.depth -= 1;
                self.namespace.leave();
                result
            }
        }
    }
}

/// Executes every top-level expression of `root` in order, returning their
/// values.
pub fn execute(root: &TypedRoot, namespace: &mut Namespace, options: &Options) -> Result<Vec<Literal>, Error> {
    debug!(expressions = root.exprs().len(), "executing");
    let mut executor = Executor::new(namespace, options, &root.root().parents);
    let mut results = vec![];

    for expr in root.exprs() {
        execute_expr(&mut executor, expr).map_err(|error| {
            debug!(error = %error, "execution failed");
            error
        })?;
        results.push(executor.pop(expr.span)?);
    }

    Ok(results)
}

fn unresolved(expr: &Expr) -> Error {
    Error::new(
        ErrorImpl::UnresolvedNode {
            node: expr.kind.name().to_string(),
        },
        expr.span,
    )
}

/// A value whose runtime type contradicts the static one, which only
/// happens for values that passed through `any`.
fn invalid_operand(expected: &Type, received: &Literal, span: Span) -> Error {
    Error::new(
        ErrorImpl::InvalidOperand {
            expected: expected.to_string(),
            received: received.get_type().to_string(),
        },
        span,
    )
}

fn resolved_type(expr: &Expr) -> Result<&Type, Error> {
    expr.ty.as_ref().ok_or_else(|| unresolved(expr))
}

/// Executes `expr`, leaving exactly one value on the stack.
pub fn execute_expr(executor: &mut Executor, expr: &Expr) -> Result<(), Error> {
    if executor.nesting >= executor.max_nesting() {
        return Err(Error::new(
            ErrorImpl::EvaluationTooDeep {
                max: executor.max_nesting(),
            },
            expr.span,
        ));
    }

    executor.nesting += 1;
    let result = exec_node(executor, expr);
    executor.nesting -= 1;

    result.map_err(|error| executor.parents.attach_context(expr.id, error))
}

fn exec_node(executor: &mut Executor, expr: &Expr) -> Result<(), Error> {
    match &expr.kind {
        ExprKind::Literal(literal) => {
            executor.stack.push(literal.clone());
            Ok(())
        }
        ExprKind::Identifier(name) => {
            let value = lookup(executor, name, expr)?;
            executor.stack.push(value);
            Ok(())
        }
        ExprKind::List(elements) => {
            for element in elements {
                execute_expr(executor, element)?;
            }
            let values = executor.pop_n(elements.len(), expr.span)?;
            let element_type = resolved_type(expr)?
                .element_type()
                .cloned()
                .ok_or_else(|| unresolved(expr))?;
            executor.stack.push(Literal::List(ListLiteral::new(values, element_type)));
            Ok(())
        }
        ExprKind::Binary { left, right, .. } => {
            execute_expr(executor, left)?;
            execute_expr(executor, right)?;
            exec_operator(executor, expr)
        }
        ExprKind::Unary { operand, .. } => {
            execute_expr(executor, operand)?;
            exec_operator(executor, expr)
        }
        ExprKind::Range { start, end, step } => {
            execute_expr(executor, start)?;
            execute_expr(executor, end)?;
            match step {
                Some(step) => execute_expr(executor, step)?,
                None => executor.stack.push(Literal::Number(DEFAULT_STEP)),
            }
            exec_operator(executor, expr)
        }
        ExprKind::Index { target, index } => {
            execute_expr(executor, target)?;
            execute_expr(executor, index)?;
            exec_operator(executor, expr)
        }
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            execute_expr(executor, condition)?;
            match executor.pop(condition.span)? {
                Literal::Boolean(true) => execute_expr(executor, then_branch),
                Literal::Boolean(false) => execute_expr(executor, else_branch),
                other => Err(invalid_operand(&Type::Bool, &other, condition.span)),
            }
        }
        ExprKind::Call { callee, arguments } => {
            let function = match &callee.kind {
                ExprKind::Identifier(name) => lookup(executor, name, callee)?,
                _ => {
                    execute_expr(executor, callee)?;
                    executor.pop(callee.span)?
                }
            };
            let function = match function {
                Literal::Function(function) => function,
                other => {
                    let expected = resolved_type(callee)?;
                    return Err(invalid_operand(expected, &other, callee.span));
                }
            };

            for argument in arguments {
                execute_expr(executor, argument)?;
            }
            let arguments = executor.pop_n(arguments.len(), expr.span)?;
            executor.call(&function, arguments, expr.span)
        }
        ExprKind::Lambda { params, body } => {
            let signature = resolved_type(expr)?
                .as_function()
                .cloned()
                .ok_or_else(|| unresolved(expr))?;

            executor.stack.push(Literal::Function(FunctionLiteral {
                signature,
                body: FunctionBody::Lambda {
                    params: params.clone(),
                    body: Arc::new((**body).clone()),
                    captured: executor.namespace.frame_declarations(),
                },
            }));
            Ok(())
        }
        ExprKind::Assignment { value, target } => {
            execute_expr(executor, value)?;
            let result = executor.pop(value.span)?;

            executor.namespace.declare(Declaration::bound(
                &target.name,
                target.span,
                resolved_type(value)?.clone(),
                result.clone(),
                target.public,
                target.temp,
            ))?;

            executor.stack.push(result);
            Ok(())
        }
        ExprKind::Delete { targets } => {
            let removed: usize = targets
                .iter()
                .map(|target| executor.namespace.delete(&target.name, target.public))
                .sum();
            executor.stack.push(Literal::Number(removed as f64));
            Ok(())
        }
    }
}

/// The value bound to the declaration of `name` the type checker picked for
/// `expr`.
fn lookup(executor: &Executor, name: &str, expr: &Expr) -> Result<Literal, Error> {
    let ty = resolved_type(expr)?;
    let declaration = executor.namespace.resolve_typed(name, ty, expr.span)?;

    declaration
        .value()
        .cloned()
        .ok_or_else(|| unresolved(expr))
}

fn exec_operator(executor: &mut Executor, expr: &Expr) -> Result<(), Error> {
    let operator = expr
        .operator
        .and_then(operators::get)
        .ok_or_else(|| unresolved(expr))?;

    operator.exec(&mut executor.stack, expr.span, executor.options)
}
