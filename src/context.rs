//! Name resolution during evaluation.
//!
//! A [`Context`] answers "what is `name` when called with these arguments?".
//! Zero arguments means a variable or constant lookup; one or more means a
//! function call. The parser and the tree never know which context they run
//! against.

use std::{rc::Rc, sync::Arc};

use miette::Diagnostic;
use thiserror::Error;

pub mod combine;
pub mod host;
pub mod math;
pub mod variables;

pub trait Context {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError>;

    /// Whether `name` is known at all, for any arity. Combinators use this to
    /// pick a context without attempting a resolution.
    fn is_resolvable(&self, name: &str) -> bool;
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ResolveError {
    #[error("cannot resolve `{name}` with {arity} argument(s)")]
    #[diagnostic(
        code(expr::unresolved),
        help("check the spelling of `{name}` and the number of arguments")
    )]
    Unresolved { name: String, arity: usize },

    #[error("unknown function `{name}`")]
    #[diagnostic(code(expr::unknown_function))]
    UnknownFunction { name: String },

    #[error("`{name}` takes {expected} argument(s) but {found} were supplied")]
    #[diagnostic(code(expr::arity))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("`{name}` reached a context that is not wired up")]
    #[diagnostic(
        code(expr::not_implemented),
        help("replace the placeholder context with a real one")
    )]
    NotImplemented { name: String },
}

impl ResolveError {
    pub fn unresolved(name: &str, arguments: &[f64]) -> Self {
        ResolveError::Unresolved {
            name: name.to_string(),
            arity: arguments.len(),
        }
    }

    /// The name that failed to resolve.
    pub fn name(&self) -> &str {
        match self {
            ResolveError::Unresolved { name, .. }
            | ResolveError::UnknownFunction { name }
            | ResolveError::ArityMismatch { name, .. }
            | ResolveError::NotImplemented { name } => name,
        }
    }
}

impl<C: Context + ?Sized> Context for &C {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        (**self).resolve(name, arguments)
    }

    fn is_resolvable(&self, name: &str) -> bool {
        (**self).is_resolvable(name)
    }
}

impl<C: Context + ?Sized> Context for Box<C> {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        (**self).resolve(name, arguments)
    }

    fn is_resolvable(&self, name: &str) -> bool {
        (**self).is_resolvable(name)
    }
}

impl<C: Context + ?Sized> Context for Rc<C> {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        (**self).resolve(name, arguments)
    }

    fn is_resolvable(&self, name: &str) -> bool {
        (**self).is_resolvable(name)
    }
}

impl<C: Context + ?Sized> Context for Arc<C> {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        (**self).resolve(name, arguments)
    }

    fn is_resolvable(&self, name: &str) -> bool {
        (**self).is_resolvable(name)
    }
}
