//! Error types for rule compilation.

use thiserror::Error;

/// Errors raised while compiling a [`crate::rule::Rule`] into the network.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("rule '{rule}' has no patterns")]
    EmptyRule { rule: String },
}
