//! Error types for cmdbridge-core.
//!
//! Every stage of the pipeline reports through [`BridgeError`]. Lexing and
//! parsing failures are additionally recorded as [`Diagnostic`]s on the
//! `ParseResult` so that a statement can be inspected without executing it.

use crate::token::Position;
use serde::Serialize;
use thiserror::Error;

/// Failure while binding caller arguments to placeholders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// Placeholder number `.0` (1-based) had no supplied value.
    #[error("argument {0} was not supplied")]
    MissingArgument(usize),

    #[error("statement binds {expected} argument(s) but {supplied} were supplied")]
    ExtraArgument { expected: usize, supplied: usize },
}

/// cmdbridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Lex error at {position}: {message}")]
    Lex { position: Position, message: String },

    #[error("Syntax error at {position}: {message}")]
    Syntax { position: Position, message: String },

    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    #[error("Emit error: {0}")]
    Emit(String),

    #[error("Function '{name}' failed: {message}")]
    Function { name: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cmdbridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn lex(position: Position, message: impl Into<String>) -> Self {
        BridgeError::Lex {
            position,
            message: message.into(),
        }
    }

    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        BridgeError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Source position for lex and syntax errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            BridgeError::Lex { position, .. } | BridgeError::Syntax { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }

    /// Converts a lex/syntax error into a diagnostic. Other errors are returned unchanged.
    pub fn into_diagnostic(self) -> Result<Diagnostic, BridgeError> {
        match self {
            BridgeError::Lex { position, message } => Ok(Diagnostic {
                kind: DiagnosticKind::Lex,
                position,
                message,
            }),
            BridgeError::Syntax { position, message } => Ok(Diagnostic {
                kind: DiagnosticKind::Syntax,
                position,
                message,
            }),
            other => Err(other),
        }
    }
}

impl Serialize for BridgeError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Lex,
    Syntax,
}

/// A positioned lex or syntax failure kept on a `ParseResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: Position,
    pub message: String,
}

impl From<Diagnostic> for BridgeError {
    fn from(d: Diagnostic) -> Self {
        match d.kind {
            DiagnosticKind::Lex => BridgeError::Lex {
                position: d.position,
                message: d.message,
            },
            DiagnosticKind::Syntax => BridgeError::Syntax {
                position: d.position,
                message: d.message,
            },
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.kind {
            DiagnosticKind::Lex => "lex error",
            DiagnosticKind::Syntax => "syntax error",
        };
        write!(f, "{} at {}: {}", label, self.position, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let pos = Position::new(1, 7, 6);
        let err = BridgeError::syntax(pos, "expected value");
        assert_eq!(err.to_string(), "Syntax error at line 1, column 7: expected value");

        let err = BridgeError::lex(Position::new(2, 1, 10), "unexpected character '#'");
        assert_eq!(
            err.to_string(),
            "Lex error at line 2, column 1: unexpected character '#'"
        );

        let err = BridgeError::from(BindError::MissingArgument(3));
        assert_eq!(err.to_string(), "Bind error: argument 3 was not supplied");

        let err = BridgeError::from(BindError::ExtraArgument {
            expected: 1,
            supplied: 2,
        });
        assert_eq!(
            err.to_string(),
            "Bind error: statement binds 1 argument(s) but 2 were supplied"
        );

        let err = BridgeError::Emit("null argument".to_string());
        assert_eq!(err.to_string(), "Emit error: null argument");
    }

    #[test]
    fn test_diagnostic_round_trip() {
        let pos = Position::new(3, 4, 20);
        let diag = BridgeError::syntax(pos, "boom").into_diagnostic().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::Syntax);
        assert_eq!(diag.to_string(), "syntax error at line 3, column 4: boom");

        let err: BridgeError = diag.into();
        assert_eq!(err.position(), Some(pos));
    }

    #[test]
    fn test_non_positional_errors_stay_errors() {
        let err = BridgeError::Emit("x".to_string());
        assert!(err.position().is_none());
        assert!(err.into_diagnostic().is_err());
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = BridgeError::from(BindError::MissingArgument(1));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Bind error: argument 1 was not supplied\"");
    }
}
