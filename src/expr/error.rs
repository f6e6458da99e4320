//! Error types for expression compilation and evaluation.

use thiserror::Error;

/// Errors that can occur while compiling or evaluating a calculated setting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// The setting text is not a valid expression script.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// An identifier other than `resources` or a local was referenced.
    #[error("'{0}' is not defined")]
    Unresolved(String),

    /// An operation was applied to a value of the wrong shape.
    #[error("type error: {0}")]
    Type(String),
}

impl ExprError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        ExprError::Syntax {
            offset,
            message: message.into(),
        }
    }
}
