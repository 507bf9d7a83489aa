//! Core AST definitions.
//!
//! The tree is a closed enumeration of expression kinds. Nodes own their
//! children; the back-reference from a child to its parent lives outside the
//! tree in a [`ParentMap`] keyed by node id, so rewriting never has to patch
//! up pointers.

use std::{collections::HashMap, fmt::Display};

use crate::{errors::errors::Error, operators::operators::OperatorId, Span};

use super::{literals::Literal, types::Type};

pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
    Neg,
    Not,
    DotDot,
    Index,
    If,
}

impl Display for OpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            OpType::Add => "+",
            OpType::Sub | OpType::Neg => "-",
            OpType::Mul => "*",
            OpType::Div => "/",
            OpType::Mod => "%",
            OpType::Pow => "^",
            OpType::Eq => "==",
            OpType::NotEq => "!=",
            OpType::Less => "<",
            OpType::Greater => ">",
            OpType::LessEq => "<=",
            OpType::GreaterEq => ">=",
            OpType::And => "&&",
            OpType::Or => "||",
            OpType::Not => "!",
            OpType::DotDot => "..",
            OpType::Index => "[]",
            OpType::If => "if",
        };
        write!(f, "{}", symbol)
    }
}

/// A typed lambda parameter such as `num x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

/// The declared name on the right of `->`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTarget {
    pub name: String,
    pub span: Span,
    pub public: bool,
    pub temp: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub name: String,
    pub span: Span,
    pub public: bool,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    List(Vec<Expr>),
    Binary {
        op: OpType,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: OpType,
        operand: Box<Expr>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Lambda {
        params: Vec<Parameter>,
        body: Box<Expr>,
    },
    Assignment {
        value: Box<Expr>,
        target: AssignTarget,
    },
    Delete {
        targets: Vec<DeleteTarget>,
    },
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::Identifier(_) => "identifier",
            ExprKind::List(_) => "list",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Range { .. } => "range",
            ExprKind::Index { .. } => "index",
            ExprKind::Conditional { .. } => "conditional",
            ExprKind::Call { .. } => "call",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
    /// Filled in by the type checker.
    pub ty: Option<Type>,
    /// The operator chosen by the type checker for operator nodes.
    pub operator: Option<OperatorId>,
}

impl Expr {
    pub fn new(id: NodeId, span: Span, kind: ExprKind) -> Self {
        Expr {
            id,
            span,
            kind,
            ty: None,
            operator: None,
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Delete { .. } => vec![],
            ExprKind::List(elements) => elements.iter().collect(),
            ExprKind::Binary { left, right, .. } => vec![left, right],
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Range { start, end, step } => {
                let mut children: Vec<&Expr> = vec![start, end];
                if let Some(step) = step {
                    children.push(step);
                }
                children
            }
            ExprKind::Index { target, index } => vec![target, index],
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![condition, then_branch, else_branch],
            ExprKind::Call { callee, arguments } => {
                let mut children: Vec<&Expr> = vec![callee];
                children.extend(arguments.iter());
                children
            }
            ExprKind::Lambda { body, .. } => vec![body],
            ExprKind::Assignment { value, .. } => vec![value],
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Whether the unparsed form needs parentheses when nested.
    fn is_compound(&self) -> bool {
        match &self.kind {
            ExprKind::Binary { .. }
            | ExprKind::Unary { .. }
            | ExprKind::Range { .. }
            | ExprKind::Conditional { .. }
            | ExprKind::Assignment { .. }
            | ExprKind::Delete { .. } => true,
            ExprKind::Literal(Literal::Number(n)) => *n < 0.0,
            ExprKind::Literal(Literal::Timespan(t)) => *t < 0,
            _ => false,
        }
    }

    fn nested(&self) -> String {
        if self.is_compound() {
            format!("({})", self)
        } else {
            self.to_string()
        }
    }
}

/// Nodes are equal when they are the same kind of node at the same place.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
            && self.span == other.span
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the expression as source text that parses back to the same tree
/// shape.
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{}", literal),
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::List(elements) => write!(f, "{{{}}}", join(elements)),
            ExprKind::Binary { op, left, right } => {
                write!(f, "{} {} {}", left.nested(), op, right.nested())
            }
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op, operand.nested()),
            ExprKind::Range { start, end, step } => {
                write!(f, "{}..{}", start.nested(), end.nested())?;
                if let Some(step) = step {
                    write!(f, "${}", step.nested())?;
                }
                Ok(())
            }
            ExprKind::Index { target, index } => write!(f, "{}[{}]", target.nested(), index),
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(
                f,
                "if {} : {} : {}",
                condition.nested(),
                then_branch.nested(),
                else_branch.nested()
            ),
            ExprKind::Call { callee, arguments } => {
                write!(f, "{}({})", callee.nested(), join(arguments))
            }
            ExprKind::Lambda { params, body } => {
                let params = params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "\\({}: {})", params, body)
            }
            ExprKind::Assignment { value, target } => {
                write!(f, "{} -> ", value.nested())?;
                if target.public {
                    write!(f, "public ")?;
                }
                if target.temp {
                    write!(f, "temp ")?;
                }
                write!(f, "{}", target.name)
            }
            ExprKind::Delete { targets } => {
                let targets = targets
                    .iter()
                    .map(|t| {
                        if t.public {
                            format!("public {}", t.name)
                        } else {
                            t.name.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "del {}", targets)
            }
        }
    }
}

/// Maps every node id to its parent's id and span.
#[derive(Debug, Clone, Default)]
pub struct ParentMap {
    parents: HashMap<NodeId, (NodeId, Span)>,
}

impl ParentMap {
    pub fn build(exprs: &[Expr]) -> Self {
        let mut map = ParentMap::default();
        for expr in exprs {
            map.record(expr);
        }
        map
    }

    fn record(&mut self, expr: &Expr) {
        for child in expr.children() {
            self.parents.insert(child.id, (expr.id, expr.span));
            self.record(child);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).map(|(parent, _)| *parent)
    }

    pub fn parent_span(&self, id: NodeId) -> Option<Span> {
        self.parents.get(&id).map(|(_, span)| *span)
    }

    /// Attaches the span of `id`'s parent to `error` unless the error
    /// already carries a context.
    pub fn attach_context(&self, id: NodeId, error: Error) -> Error {
        match (error.get_context(), self.parent_span(id)) {
            (None, Some(span)) => error.with_context(span),
            _ => error,
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// A parsed input: the top-level expressions separated by `;`.
#[derive(Debug, Clone)]
pub struct Root {
    pub exprs: Vec<Expr>,
    pub span: Span,
    pub parents: ParentMap,
}

impl Root {
    pub fn new(exprs: Vec<Expr>, span: Span) -> Self {
        let parents = ParentMap::build(&exprs);
        Root {
            exprs,
            span,
            parents,
        }
    }

    pub fn rebuild_parents(&mut self) {
        self.parents = ParentMap::build(&self.exprs);
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let exprs = self
            .exprs
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", exprs)
    }
}
