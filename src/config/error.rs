use std::fmt;

use thiserror::Error;

/// One rejected field in a scene configuration.
///
/// Every variant carries the JSON path of the offending value, e.g.
/// `layers[2].sprites[0]`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{path}: missing required field")]
    Missing { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: duplicate layer name \"{name}\"")]
    DuplicateLayer { path: String, name: String },

    #[error("{path}: sprite list must not be empty")]
    EmptySprites { path: String },

    #[error("{path}: unknown sprite \"{name}\"")]
    UnknownSprite { path: String, name: String },

    #[error("{path}: unknown value \"{value}\" (expected one of: {allowed})")]
    UnknownVariant {
        path: String,
        value: String,
        allowed: &'static str,
    },

    #[error("{path}: {message}")]
    Invalid { path: String, message: String },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::Missing { path }
            | ValidationError::WrongType { path, .. }
            | ValidationError::DuplicateLayer { path, .. }
            | ValidationError::EmptySprites { path }
            | ValidationError::UnknownSprite { path, .. }
            | ValidationError::UnknownVariant { path, .. }
            | ValidationError::Invalid { path, .. } => path,
        }
    }
}

/// Every violation found in a single validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.len();
        write!(f, "{n} configuration error{}", if n == 1 { "" } else { "s" })?;
        for e in &self.0 {
            write!(f, "\n  - {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
