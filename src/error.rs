// ⚠️ Error Types
// Driver misuse and catalog loading failures. Validation failures are values, not errors.

use thiserror::Error;

use crate::fields::FieldName;

/// Raised when a driver asks a control to do something a browser would refuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{field}` has no option `{value}`")]
    UnknownOption { field: FieldName, value: String },

    #[error("control `{0}` is disabled")]
    ControlDisabled(String),

    #[error("field `{field}` does not support `{action}`")]
    UnsupportedAction {
        field: FieldName,
        action: &'static str,
    },

    #[error("no confirmation dialog is open")]
    NoDialog,
}

/// Raised while loading or checking a location catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no countries")]
    Empty,

    #[error("country `{0}` has no states")]
    NoStates(String),

    #[error("state `{state}` in `{country}` has no cities")]
    NoCities { country: String, state: String },

    #[error("duplicate {kind} `{name}` in {scope}")]
    Duplicate {
        kind: &'static str,
        name: String,
        scope: String,
    },
}
