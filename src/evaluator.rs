//! Runs one command through the whole pipeline.

use tracing::debug;

use crate::{
    ast::literals::Literal,
    config::Options,
    declarations::namespace::Namespace,
    errors::errors::Error,
    executor::executor::execute,
    transform::{constant_folding::ConstantFolding, transform::transform_root},
    type_checker::type_checker::type_check,
};

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: Options,
}

impl Evaluator {
    pub fn new(options: Options) -> Self {
        Evaluator { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// A namespace with the built-ins and a fresh global scope, configured
    /// with this evaluator's options.
    pub fn namespace(&self) -> Namespace {
        Namespace::with_prelude().with_options(&self.options)
    }

    /// Parses, resolves and executes `source` against `namespace`, returning
    /// one value per top-level expression. `temp` declarations are removed
    /// afterwards whether or not the evaluation succeeded.
    pub fn evaluate(&self, source: &str, namespace: &mut Namespace) -> Result<Vec<Literal>, Error> {
        debug!(source, "evaluating");
        let result = self.run(source, namespace);

        let removed = namespace.clear_temp();
        if removed > 0 {
            debug!(removed, "cleared temporary declarations");
        }

        result
    }

    fn run(&self, source: &str, namespace: &mut Namespace) -> Result<Vec<Literal>, Error> {
        let mut root = crate::parse_with(source, &self.options)?;

        if self.options.fold_constants {
            let mut folding = ConstantFolding::new(&self.options);
            root = transform_root(&mut folding, root)?;
            debug!(folded = folding.folded, "constant folding done");
        }

        let typed = type_check(root, namespace)?;
        execute(&typed, namespace, &self.options)
    }
}
