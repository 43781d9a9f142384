use std::fmt;

use crate::context::{Context, ResolveError};

/// Tries each sub-context in order and resolves through the first one that
/// reports the name as resolvable.
#[derive(Default)]
pub struct FirstMatch<'a> {
    contexts: Vec<Box<dyn Context + 'a>>,
}

impl<'a> FirstMatch<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, context: impl Context + 'a) -> Self {
        self.push(context);
        self
    }

    pub fn push(&mut self, context: impl Context + 'a) {
        self.contexts.push(Box::new(context));
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl<'a> FromIterator<Box<dyn Context + 'a>> for FirstMatch<'a> {
    fn from_iter<I: IntoIterator<Item = Box<dyn Context + 'a>>>(iter: I) -> Self {
        FirstMatch {
            contexts: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for FirstMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstMatch")
            .field("contexts", &self.contexts.len())
            .finish()
    }
}

impl Context for FirstMatch<'_> {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        let Some((index, context)) = self
            .contexts
            .iter()
            .enumerate()
            .find(|(_, context)| context.is_resolvable(name))
        else {
            return Err(ResolveError::unresolved(name, arguments));
        };
        tracing::trace!(name, index, "resolving through sub-context");
        context.resolve(name, arguments)
    }

    fn is_resolvable(&self, name: &str) -> bool {
        self.contexts.iter().any(|context| context.is_resolvable(name))
    }
}

/// Placeholder for a context that is declared but not connected yet.
///
/// It claims every name so a [`FirstMatch`] cannot skip past it, and then
/// refuses to resolve any of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwired;

impl Context for Unwired {
    fn resolve(&self, name: &str, _: &[f64]) -> Result<f64, ResolveError> {
        Err(ResolveError::NotImplemented {
            name: name.to_string(),
        })
    }

    fn is_resolvable(&self, _: &str) -> bool {
        true
    }
}
