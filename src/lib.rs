//! Arithmetic expressions evaluated against pluggable contexts.
//!
//! ```
//! use expression_engine::{FirstMatch, MathContext, Variables};
//!
//! let tree = expression_engine::parse("clamp(sin(x) + 2, 0, 1)").unwrap();
//! let context = FirstMatch::new()
//!     .with(Variables::new().with("x", 0.5))
//!     .with(MathContext);
//! assert_eq!(tree.evaluate(&context).unwrap(), 1.0);
//! ```

use miette::Diagnostic;
use thiserror::Error;

pub mod ast;
pub mod context;
mod eval;
pub mod lex;
pub mod parse;

pub use ast::Node;
pub use context::{
    Context, ResolveError,
    combine::{FirstMatch, Unwired},
    host::{Expose, HostContext, Members},
    math::MathContext,
    variables::Variables,
};
pub use lex::Lexer;
pub use parse::{Parser, SyntaxError};

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
}

/// Parses `source` into a tree that can be evaluated any number of times.
pub fn parse(source: &str) -> Result<Node, SyntaxError> {
    Parser::new(None, source).parse()
}

/// Parses and evaluates `source` in one go.
pub fn evaluate<C: Context + ?Sized>(source: &str, context: &C) -> Result<f64, Error> {
    Ok(parse(source)?.evaluate(context)?)
}
