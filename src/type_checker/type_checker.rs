use std::{collections::HashSet, fmt::Display};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, ExprKind, OpType, ParentMap, Root},
        types::{format_types, Type},
    },
    declarations::{declaration::Declaration, namespace::Namespace},
    errors::errors::{Error, ErrorImpl},
    operators::operators::{self, OperatorId},
    Span,
};

/// A tree in which every node carries its resolved type and every operator
/// node the id of the operator that implements it.
#[derive(Debug, Clone)]
pub struct TypedRoot {
    root: Root,
}

impl TypedRoot {
    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.root.exprs
    }

    /// Result types of the top-level expressions.
    pub fn types(&self) -> Vec<Type> {
        self.root
            .exprs
            .iter()
            .filter_map(|expr| expr.ty.clone())
            .collect()
    }

    pub fn into_root(self) -> Root {
        self.root
    }
}

impl Display for TypedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// State of one type checking pass. Declarations made by the checked input
/// go into a private fork of the caller's namespace.
#[derive(Debug)]
pub struct TypeChecker {
    pub namespace: Namespace,
    pub parents: ParentMap,
}

impl TypeChecker {
    pub fn new(namespace: &Namespace, parents: ParentMap) -> Self {
        TypeChecker {
            namespace: namespace.fork(),
            parents,
        }
    }
}

/// Resolves every name and type in `root`. Fails on the first error.
pub fn type_check(mut root: Root, namespace: &Namespace) -> Result<TypedRoot, Error> {
    debug!(expressions = root.exprs.len(), "type checking");
    let mut type_checker = TypeChecker::new(namespace, root.parents.clone());

    for expr in root.exprs.iter_mut() {
        let ty = type_check_expr(&mut type_checker, expr).map_err(|error| {
            debug!(error = %error, "type checking failed");
            error
        })?;
        trace!(expr = %expr, ty = %ty, "resolved top-level expression");
    }

    Ok(TypedRoot { root })
}

/// Resolves `expr` and its children, annotating each with its type.
pub fn type_check_expr(type_checker: &mut TypeChecker, expr: &mut Expr) -> Result<Type, Error> {
    let id = expr.id;
    let (ty, operator) = resolve_expr(type_checker, expr)
        .map_err(|error| type_checker.parents.attach_context(id, error))?;
    expr.ty = Some(ty.clone());
    expr.operator = operator;
    Ok(ty)
}

fn type_mismatch(expected: &Type, received: &Type, span: Span) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        span,
    )
}

fn resolve_expr(
    type_checker: &mut TypeChecker,
    expr: &mut Expr,
) -> Result<(Type, Option<OperatorId>), Error> {
    let span = expr.span;

    match &mut expr.kind {
        ExprKind::Literal(literal) => Ok((literal.get_type(), None)),
        ExprKind::Identifier(name) => {
            let declaration = type_checker.namespace.resolve(name, None, span)?;
            Ok((declaration.ty().clone(), None))
        }
        ExprKind::List(elements) => {
            let mut element_type: Option<Type> = None;

            for element in elements.iter_mut() {
                let ty = type_check_expr(type_checker, element)?;
                element_type = match element_type {
                    None => Some(ty),
                    Some(expected) if expected.check(&ty) => Some(expected),
                    Some(expected) if ty.check(&expected) => Some(ty),
                    Some(expected) => return Err(type_mismatch(&expected, &ty, element.span)),
                };
            }

            match element_type {
                Some(element_type) => Ok((Type::list_of(element_type), None)),
                None => Err(Error::new(ErrorImpl::EmptyList, span)),
            }
        }
        ExprKind::Binary { op, left, right } => {
            let operands = [
                type_check_expr(type_checker, left)?,
                type_check_expr(type_checker, right)?,
            ];
            resolve_operator(*op, &operands, span)
        }
        ExprKind::Unary { op, operand } => {
            let operands = [type_check_expr(type_checker, operand)?];
            resolve_operator(*op, &operands, span)
        }
        ExprKind::Range { start, end, step } => {
            let start_type = type_check_expr(type_checker, start)?;
            let end_type = type_check_expr(type_checker, end)?;
            let step_type = match step {
                Some(step) => type_check_expr(type_checker, step)?,
                None => Type::Num,
            };
            resolve_operator(OpType::DotDot, &[start_type, end_type, step_type], span)
        }
        ExprKind::Index { target, index } => {
            let operands = [
                type_check_expr(type_checker, target)?,
                type_check_expr(type_checker, index)?,
            ];
            resolve_operator(OpType::Index, &operands, span)
        }
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition_type = type_check_expr(type_checker, condition)?;
            if !Type::Bool.check(&condition_type) {
                return Err(type_mismatch(&Type::Bool, &condition_type, condition.span));
            }

            let then_type = type_check_expr(type_checker, then_branch)?;
            let else_type = type_check_expr(type_checker, else_branch)?;
            if !then_type.check(&else_type) && !else_type.check(&then_type) {
                return Err(type_mismatch(&then_type, &else_type, else_branch.span));
            }

            resolve_operator(OpType::If, &[condition_type, then_type, else_type], span)
        }
        ExprKind::Call { callee, arguments } => {
            let mut argument_types = vec![];
            for argument in arguments.iter_mut() {
                argument_types.push(type_check_expr(type_checker, argument)?);
            }

            let callee_name = match &callee.kind {
                ExprKind::Identifier(name) => Some(name.clone()),
                _ => None,
            };

            let callee_type = match callee_name {
                Some(name) => {
                    let ty = resolve_callee(type_checker, &name, &argument_types, callee.span)?;
                    callee.ty = Some(ty.clone());
                    ty
                }
                None => {
                    let ty = type_check_expr(type_checker, callee)?;
                    let function = ty.as_function().ok_or_else(|| {
                        Error::new(
                            ErrorImpl::NotAFunction {
                                received: ty.to_string(),
                            },
                            callee.span,
                        )
                    })?;

                    if !function.check_params(&argument_types) {
                        return Err(Error::new(
                            ErrorImpl::IncompatibleCall {
                                function: callee.to_string(),
                                arguments: format_types(&argument_types),
                            },
                            span,
                        ));
                    }
                    ty
                }
            };

            match callee_type {
                Type::Function(function) => Ok((*function.ret, None)),
                other => Err(Error::new(
                    ErrorImpl::NotAFunction {
                        received: other.to_string(),
                    },
                    callee.span,
                )),
            }
        }
        ExprKind::Lambda { params, body } => {
            let mut seen = HashSet::new();
            for param in params.iter() {
                if !seen.insert(param.name.as_str()) {
                    return Err(Error::new(
                        ErrorImpl::DuplicateParameter {
                            name: param.name.clone(),
                        },
                        param.span,
                    ));
                }
            }

            type_checker.namespace.enter();
            for param in params.iter() {
                type_checker.namespace.declare_local(Declaration::typed(
                    &param.name,
                    param.span,
                    param.ty.clone(),
                    false,
                    false,
                ));
            }
            let body_type = type_check_expr(type_checker, body);
            type_checker.namespace.leave();

            let param_types = params.iter().map(|param| param.ty.clone()).collect();
            Ok((Type::function(body_type?, param_types), None))
        }
        ExprKind::Assignment { value, target } => {
            let ty = type_check_expr(type_checker, value)?;
            type_checker.namespace.declare(Declaration::typed(
                &target.name,
                target.span,
                ty.clone(),
                target.public,
                target.temp,
            ))?;
            Ok((ty, None))
        }
        ExprKind::Delete { targets } => {
            for target in targets.iter() {
                if target.public && type_checker.namespace.is_native(&target.name) {
                    return Err(Error::new(
                        ErrorImpl::DeleteNative {
                            name: target.name.clone(),
                        },
                        target.span,
                    ));
                }
                type_checker.namespace.delete(&target.name, target.public);
            }
            Ok((Type::Num, None))
        }
    }
}

fn resolve_operator(
    op: OpType,
    operands: &[Type],
    span: Span,
) -> Result<(Type, Option<OperatorId>), Error> {
    let (id, ty) = operators::resolve(op, operands, span)?;
    Ok((ty, Some(id)))
}

/// Picks the overload of `name` accepting `arguments`. A name that exists
/// but is not a function is reported as such instead of as a bad call.
fn resolve_callee(
    type_checker: &TypeChecker,
    name: &str,
    arguments: &[Type],
    span: Span,
) -> Result<Type, Error> {
    match type_checker.namespace.resolve(name, Some(arguments), span) {
        Ok(declaration) => Ok(declaration.ty().clone()),
        Err(error) => match type_checker.namespace.resolve(name, None, span) {
            Ok(declaration) if !declaration.is_function() => Err(Error::new(
                ErrorImpl::NotAFunction {
                    received: declaration.ty().to_string(),
                },
                span,
            )),
            _ => Err(error),
        },
    }
}
