//! Error taxonomy for service desk operations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::phase::Phase;

/// Errors raised by the service desk
///
/// Every failure leaves cases and assets exactly as they were.
#[derive(Debug, Error, Diagnostic)]
pub enum FleetError {
    #[error("{kind} not found: {id}")]
    #[diagnostic(
        code(fleetcare::not_found),
        help("List records with `fleetcare asset list` or `fleetcare case list`")
    )]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid transition: {from} -> {to}")]
    #[diagnostic(code(fleetcare::invalid_transition))]
    InvalidTransition {
        from: Phase,
        to: Phase,
        #[help]
        allowed: Option<String>,
    },

    #[error("Validation failed: {0}")]
    #[diagnostic(code(fleetcare::validation))]
    Validation(String),

    #[error("Concurrent update on {id}: expected revision {expected}, found {found}")]
    #[diagnostic(
        code(fleetcare::conflict),
        help("Reload the record and retry the request")
    )]
    ConcurrencyConflict { id: String, expected: u32, found: u32 },

    #[error("Storage error: {0}")]
    #[diagnostic(code(fleetcare::storage))]
    Storage(String),
}

impl FleetError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        FleetError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        FleetError::Validation(msg.into())
    }

    /// Build an invalid-transition error listing the phases reachable from `from`
    pub fn invalid_transition(from: Phase, to: Phase) -> Self {
        let allowed = from.allowed_transitions();
        let allowed = if allowed.is_empty() {
            None
        } else {
            Some(format!(
                "Allowed from {}: {}",
                from,
                allowed
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        };
        FleetError::InvalidTransition { from, to, allowed }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, FleetError::ConcurrencyConflict { .. })
    }
}

/// Errors raised by persistence adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("revision mismatch on {id}: expected {expected}, found {found}")]
    RevisionMismatch { id: String, expected: u32, found: u32 },

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl From<StoreError> for FleetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionMismatch {
                id,
                expected,
                found,
            } => FleetError::ConcurrencyConflict {
                id,
                expected,
                found,
            },
            other => FleetError::Storage(other.to_string()),
        }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
