//! Scoped symbol tables.
//!
//! A [`Namespace`] is a stack of local scopes (the session's root scope
//! first, call frames after it) on top of a global scope shared between
//! sessions. The global scope holds public declarations and the built-ins
//! and sits behind an `RwLock`: lookups read concurrently, public declare
//! and delete take the write lock.

use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::trace;

use crate::{
    ast::types::{format_types, Type},
    config::Options,
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{declaration::Declaration, prelude::prelude_scope, suggestions::suggest_similar};

/// Declarations of one scope, keyed by name. Each name maps to its overloads
/// in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    declarations: BTreeMap<String, Vec<Arc<Declaration>>>,
}

impl Scope {
    pub fn get(&self, name: &str) -> &[Arc<Declaration>] {
        self.declarations
            .get(name)
            .map(|overloads| overloads.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Declaration>> {
        self.declarations.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.declarations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `declaration`, replacing a compatible declaration with the same
    /// signature. Functions with different parameter lists coexist.
    pub fn declare(&mut self, declaration: Arc<Declaration>) -> Result<(), Error> {
        let overloads = self
            .declarations
            .entry(declaration.name().to_string())
            .or_default();

        let duplicate = |existing: &Declaration| {
            Error::new(
                ErrorImpl::DuplicateDeclaration {
                    name: declaration.name().to_string(),
                    existing: existing.ty().to_string(),
                    received: declaration.ty().to_string(),
                },
                declaration.span(),
            )
        };

        if let Some(index) = overloads.iter().position(|d| d.same_signature(&declaration)) {
            let existing = &overloads[index];
            if existing.is_native() || !existing.ty().check(declaration.ty()) {
                return Err(duplicate(existing.as_ref()));
            }
            overloads[index] = declaration;
            return Ok(());
        }

        if let Some(existing) = overloads
            .iter()
            .find(|d| !d.is_function() || !declaration.is_function())
        {
            return Err(duplicate(existing.as_ref()));
        }

        overloads.push(declaration);
        Ok(())
    }

    /// Adds `declaration` without conflict checks, shadowing earlier ones.
    pub fn push(&mut self, declaration: Arc<Declaration>) {
        let overloads = self
            .declarations
            .entry(declaration.name().to_string())
            .or_default();
        overloads.retain(|d| !d.same_signature(&declaration));
        overloads.insert(0, declaration);
    }

    /// Appends an overload without conflict checks.
    pub fn push_overload(&mut self, declaration: Arc<Declaration>) {
        self.declarations
            .entry(declaration.name().to_string())
            .or_default()
            .push(declaration);
    }

    /// Removes the non-native declarations named `name`.
    pub fn remove(&mut self, name: &str) -> usize {
        let Some(overloads) = self.declarations.get_mut(name) else {
            return 0;
        };

        let before = overloads.len();
        overloads.retain(|d| d.is_native());
        let removed = before - overloads.len();

        if overloads.is_empty() {
            self.declarations.remove(name);
        }
        removed
    }

    fn clear_temp(&mut self) -> usize {
        let before = self.len();
        for overloads in self.declarations.values_mut() {
            overloads.retain(|d| !d.is_temp());
        }
        self.declarations.retain(|_, overloads| !overloads.is_empty());
        before - self.len()
    }
}

pub type SharedScope = Arc<RwLock<Scope>>;

#[derive(Debug)]
pub struct Namespace {
    scopes: Vec<Scope>,
    global: SharedScope,
    max_suggestions: usize,
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace::with_prelude()
    }
}

impl Namespace {
    /// A namespace over an existing global scope.
    pub fn new(global: SharedScope) -> Self {
        Namespace {
            scopes: vec![Scope::default()],
            global,
            max_suggestions: Options::default().max_suggestions,
        }
    }

    /// A namespace with a fresh global scope holding the built-ins.
    pub fn with_prelude() -> Self {
        Namespace::new(Arc::new(RwLock::new(prelude_scope())))
    }

    pub fn with_options(mut self, options: &Options) -> Self {
        self.max_suggestions = options.max_suggestions;
        self
    }

    pub fn global_scope(&self) -> SharedScope {
        Arc::clone(&self.global)
    }

    /// A new session sharing this namespace's global scope.
    pub fn session(&self) -> Namespace {
        Namespace {
            scopes: vec![Scope::default()],
            global: Arc::clone(&self.global),
            max_suggestions: self.max_suggestions,
        }
    }

    /// An independent snapshot, including a private copy of the global
    /// scope. Changes to the fork never reach `self`.
    pub fn fork(&self) -> Namespace {
        Namespace {
            scopes: self.scopes.clone(),
            global: Arc::new(RwLock::new(self.read_global().clone())),
            max_suggestions: self.max_suggestions,
        }
    }

    fn read_global(&self) -> RwLockReadGuard<'_, Scope> {
        self.global.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_global(&self) -> RwLockWriteGuard<'_, Scope> {
        self.global.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn innermost(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Pushes a scope for a call frame.
    pub fn enter(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pops the innermost call frame. The root scope is never popped.
    pub fn leave(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of local scopes, the root scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares into the global scope when the declaration is global and
    /// into the innermost local scope otherwise.
    pub fn declare(&mut self, declaration: Declaration) -> Result<Arc<Declaration>, Error> {
        let declaration = Arc::new(declaration);
        trace!(declaration = %declaration, global = declaration.is_global(), "declare");

        if declaration.is_global() {
            self.write_global().declare(Arc::clone(&declaration))?;
        } else {
            self.innermost().declare(Arc::clone(&declaration))?;
        }

        Ok(declaration)
    }

    /// Binds a parameter in the innermost scope, shadowing outer names.
    pub fn declare_local(&mut self, declaration: Declaration) -> Arc<Declaration> {
        let declaration = Arc::new(declaration);
        trace!(declaration = %declaration, "declare local");
        self.innermost().push(Arc::clone(&declaration));
        declaration
    }

    /// Re-binds an existing declaration in the innermost scope, used for
    /// the bindings a function captured.
    pub fn import(&mut self, declaration: Arc<Declaration>) {
        self.innermost().push(declaration);
    }

    /// Visits the overloads of `name` scope by scope, innermost first and the
    /// global scope last, until `pick` returns a declaration.
    fn find<F>(&self, name: &str, mut pick: F) -> (Option<Arc<Declaration>>, bool)
    where
        F: FnMut(&Arc<Declaration>) -> bool,
    {
        let mut known = false;

        for scope in self.scopes.iter().rev() {
            let overloads = scope.get(name);
            known |= !overloads.is_empty();
            if let Some(found) = overloads.iter().find(|&d| pick(d)) {
                return (Some(Arc::clone(found)), true);
            }
        }

        let global = self.read_global();
        let overloads = global.get(name);
        known |= !overloads.is_empty();
        let found = overloads.iter().find(|&d| pick(d)).cloned();
        (found, known)
    }

    /// Looks `name` up. With argument types only function declarations
    /// accepting those arguments qualify.
    pub fn resolve(
        &self,
        name: &str,
        arg_types: Option<&[Type]>,
        span: Span,
    ) -> Result<Arc<Declaration>, Error> {
        let (found, known) = match arg_types {
            None => self.find(name, |_| true),
            Some(arguments) => self.find(name, |d| {
                d.ty()
                    .as_function()
                    .map(|f| f.check_params(arguments))
                    .unwrap_or(false)
            }),
        };

        match found {
            Some(declaration) => Ok(declaration),
            None if known => Err(Error::new(
                ErrorImpl::IncompatibleCall {
                    function: name.to_string(),
                    arguments: format_types(arg_types.unwrap_or(&[])),
                },
                span,
            )),
            None => Err(self.unknown_identifier(name, span)),
        }
    }

    /// Looks up the declaration of `name` whose type equals `ty`.
    pub fn resolve_typed(&self, name: &str, ty: &Type, span: Span) -> Result<Arc<Declaration>, Error> {
        match self.find(name, |d| d.ty() == ty) {
            (Some(declaration), _) => Ok(declaration),
            (None, _) => Err(self.unknown_identifier(name, span)),
        }
    }

    pub fn unknown_identifier(&self, name: &str, span: Span) -> Error {
        Error::new(
            ErrorImpl::UnknownIdentifier {
                name: name.to_string(),
                suggestions: self.suggestions_for(name),
            },
            span,
        )
    }

    /// Up to `max_suggestions` visible names similar to `name`.
    pub fn suggestions_for(&self, name: &str) -> Vec<String> {
        let visible = self.visible_declarations();
        suggest_similar(name, visible.iter().map(|d| d.name()), self.max_suggestions)
    }

    /// Removes the non-native declarations named `name`, from the global
    /// scope or from the innermost local scope that has one.
    pub fn delete(&mut self, name: &str, global: bool) -> usize {
        let removed = if global {
            self.write_global().remove(name)
        } else {
            self.scopes
                .iter_mut()
                .rev()
                .find(|scope| !scope.get(name).is_empty())
                .map(|scope| scope.remove(name))
                .unwrap_or(0)
        };

        trace!(name, global, removed, "delete");
        removed
    }

    pub fn is_native(&self, name: &str) -> bool {
        self.read_global().get(name).iter().any(|d| d.is_native())
    }

    /// Removes every `temp` declaration, local and global.
    pub fn clear_temp(&mut self) -> usize {
        let mut removed = self.write_global().clear_temp();
        for scope in &mut self.scopes {
            removed += scope.clear_temp();
        }
        removed
    }

    /// Every visible declaration, sorted.
    pub fn visible_declarations(&self) -> Vec<Arc<Declaration>> {
        let mut visible: Vec<Arc<Declaration>> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.iter().cloned())
            .collect();
        visible.extend(self.read_global().iter().cloned());
        visible.sort();
        visible
    }

    /// Declarations of the call frames above the root scope, outermost
    /// first.
    pub fn frame_declarations(&self) -> Vec<Arc<Declaration>> {
        self.scopes
            .iter()
            .skip(1)
            .flat_map(|scope| scope.iter().cloned())
            .collect()
    }
}
