//! The structural type system.
//!
//! Types are plain values compared by shape. [`Type::check`] is the single
//! compatibility predicate used for assignments, parameter binding and
//! overload selection. It is directional: `a.check(b)` asks whether a value
//! of type `b` may be used where `a` is expected.

use std::fmt::Display;

use lazy_static::lazy_static;

lazy_static! {
    /// `list<any>`, compatible with every list type.
    pub static ref ANY_LIST: Type = Type::List(Box::new(Type::Any));
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Num,
    String,
    Bool,
    Date,
    Timespan,
    Any,
    List(Box<Type>),
    Function(FunctionType),
}

impl Type {
    pub fn list_of(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn function(ret: Type, params: Vec<Type>) -> Type {
        Type::Function(FunctionType::new(ret, params))
    }

    /// Resolves a primitive type name as written in source.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "num" => Some(Type::Num),
            "string" => Some(Type::String),
            "bool" => Some(Type::Bool),
            "date" => Some(Type::Date),
            "timespan" => Some(Type::Timespan),
            "any" => Some(Type::Any),
            _ => None,
        }
    }

    pub fn is_any_list(&self) -> bool {
        *self == *ANY_LIST
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Whether a value of type `other` is acceptable where `self` is expected.
    pub fn check(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) => true,
            (Type::List(expected), Type::List(received)) => {
                self.is_any_list() || other.is_any_list() || expected.check(received)
            }
            (Type::Function(function), _) => function.check(other, true),
            _ => self == other,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Num => write!(f, "num"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Date => write!(f, "date"),
            Type::Timespan => write!(f, "timespan"),
            Type::Any => write!(f, "any"),
            Type::List(element) => write!(f, "list<{}>", element),
            Type::Function(function) => write!(f, "{}", function),
        }
    }
}

/// Return type plus the ordered parameter types of a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub ret: Box<Type>,
    pub params: Vec<Type>,
}

impl FunctionType {
    pub fn new(ret: Type, params: Vec<Type>) -> Self {
        FunctionType {
            ret: Box::new(ret),
            params,
        }
    }

    /// Checks `other` against this signature. Arity is compared before any
    /// parameter, parameters are compared positionally and the return type
    /// only when `include_return` is set.
    pub fn check(&self, other: &Type, include_return: bool) -> bool {
        let other = match other {
            Type::Any => return true,
            Type::Function(other) => other,
            _ => return false,
        };

        if self.params.len() != other.params.len() {
            return false;
        }

        for (expected, received) in self.params.iter().zip(other.params.iter()) {
            if !expected.check(received) {
                return false;
            }
        }

        !include_return || self.ret.check(&other.ret)
    }

    /// Call-site check: do the argument types fit the parameters?
    pub fn check_params(&self, arguments: &[Type]) -> bool {
        self.params.len() == arguments.len()
            && self
                .params
                .iter()
                .zip(arguments.iter())
                .all(|(param, argument)| param.check(argument))
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for param in &self.params {
            write!(f, "{} ", param)?;
        }
        write!(f, "-> {})", self.ret)
    }
}

pub fn format_types(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
