use std::collections::BTreeMap;

use thiserror::Error;

use crate::UnknownTag;

/// Inline form errors, keyed by the form field they belong to.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unknown or expired session")]
    UnknownSession,

    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    #[error("{0}")]
    Invalid(String),

    #[error("Permission denied: {0}")]
    Forbidden(&'static str),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Cannot change {kind} status from {from} to {to}")]
    Transition {
        kind: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error(transparent)]
    UnknownTag(#[from] UnknownTag),
}

impl PortalError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        PortalError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
