use std::{cmp::Ordering, fmt::Display};

use crate::{
    ast::{literals::Literal, types::Type},
    Span,
};

/// Properties of a declaration, fixed when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeclFlags {
    /// Lives in the shared global scope.
    pub global: bool,
    /// Removed once the current evaluation finishes.
    pub temp: bool,
    /// The bound value is a list and is deep copied on bind.
    pub must_copy: bool,
    /// Built-in; cannot be deleted or replaced.
    pub native: bool,
}

/// What a declaration is bound to. The type checker declares names without
/// values; the executor binds values.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Typed,
    Value(Literal),
}

#[derive(Debug, Clone)]
pub struct Declaration {
    name: String,
    span: Span,
    ty: Type,
    value: Binding,
    flags: DeclFlags,
}

impl Declaration {
    fn build(name: &str, span: Span, ty: Type, value: Binding, global: bool, temp: bool, native: bool) -> Self {
        let must_copy = ty.is_list();
        Declaration {
            name: name.to_string(),
            span,
            ty,
            value,
            flags: DeclFlags {
                global,
                temp,
                must_copy,
                native,
            },
        }
    }

    /// A binding to a runtime value typed by the value itself. List values
    /// are deep copied.
    pub fn variable(name: &str, span: Span, value: Literal, global: bool, temp: bool) -> Self {
        let ty = value.get_type();
        Declaration::bound(name, span, ty, value, global, temp)
    }

    /// A binding to a runtime value under its statically resolved type.
    /// List values are deep copied.
    pub fn bound(name: &str, span: Span, ty: Type, value: Literal, global: bool, temp: bool) -> Self {
        let value = if ty.is_list() { value.deep_copy() } else { value };
        Declaration::build(name, span, ty, Binding::Value(value), global, temp, false)
    }

    /// A declaration that only carries a type, used during type checking.
    pub fn typed(name: &str, span: Span, ty: Type, global: bool, temp: bool) -> Self {
        Declaration::build(name, span, ty, Binding::Typed, global, temp, false)
    }

    /// A built-in function living in the global scope.
    pub fn native(name: &str, value: Literal) -> Self {
        let ty = value.get_type();
        Declaration::build(name, Span::null(), ty, Binding::Value(value), true, false, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn value(&self) -> Option<&Literal> {
        match &self.value {
            Binding::Value(value) => Some(value),
            Binding::Typed => None,
        }
    }

    pub fn flags(&self) -> DeclFlags {
        self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    pub fn is_temp(&self) -> bool {
        self.flags.temp
    }

    pub fn must_copy(&self) -> bool {
        self.flags.must_copy
    }

    pub fn is_native(&self) -> bool {
        self.flags.native
    }

    pub fn is_function(&self) -> bool {
        self.ty.is_function()
    }

    /// Whether `other` occupies the same slot as `self`: two non-functions,
    /// or two functions with identical parameter lists.
    pub fn same_signature(&self, other: &Declaration) -> bool {
        match (self.ty.as_function(), other.ty.as_function()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.params == b.params,
            _ => false,
        }
    }
}

/// Shorter names first, then lexicographic, then by type.
impl Ord for Declaration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .len()
            .cmp(&other.name.len())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.ty.to_string().cmp(&other.ty.to_string()))
    }
}

impl PartialOrd for Declaration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Declaration {}

impl Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}
