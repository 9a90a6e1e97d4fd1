//! # Desk Error Type
//!
//! Unified error taxonomy for desk operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Atelier POS                            │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  commit ticket                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Desk Operation                                                  │  │
//! │  │  Result<T, DeskError>                                            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Pre-write guard? ── Validation / NoOpenSession ── no writes ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  First write fails? ── Storage ── clean abort, cart kept ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Second write fails? ── PartialCommit ── cart kept, logged ────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The UI must distinguish "committed" from "failed" even when failure   │
//! │  occurs mid-commit: a PartialCommit is NEVER reported as success.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use atelier_core::{CoreError, ValidationError};
use atelier_db::DbError;

/// Error taxonomy surfaced by every desk operation.
#[derive(Debug, Error)]
pub enum DeskError {
    /// A required field is missing or invalid. Detected before any write;
    /// the operation had no side effects.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation targeted a session (or other entity) that does not
    /// exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An operation requiring an open session found none. Detected before
    /// any write.
    #[error("No open cash session")]
    NoOpenSession,

    /// The durable store failed to persist a write. For a two-part commit
    /// this means the FIRST write failed: nothing was recorded and the
    /// cart is preserved.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The movement write succeeded but the sale write failed. The
    /// movement is immutable by design, so there is no rollback: the cart
    /// stays uncommitted and the detail carries what the operator and the
    /// log need for manual reconciliation.
    #[error(
        "Partial commit: movement {movement_id} recorded against session {session_id} \
         but the sale record failed: {detail}"
    )]
    PartialCommit {
        session_id: String,
        movement_id: String,
        detail: String,
    },
}

impl DeskError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DeskError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::Validation(message.into())
    }
}

/// Converts database errors to desk errors.
///
/// ## Mapping
/// ```text
/// DbError::NotFound    → DeskError::NotFound
/// DbError::Validation  → DeskError::Validation
/// everything else      → DeskError::Storage
/// ```
impl From<DbError> for DeskError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DeskError::NotFound { entity, id },
            DbError::Validation(e) => DeskError::Validation(e.to_string()),
            other => DeskError::Storage(other.to_string()),
        }
    }
}

/// Converts core domain errors to desk errors.
impl From<CoreError> for DeskError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound { line_id } => DeskError::not_found("Cart line", line_id),
            CoreError::Validation(e) => DeskError::Validation(e.to_string()),
        }
    }
}

/// Converts raw validation errors to desk errors.
impl From<ValidationError> for DeskError {
    fn from(err: ValidationError) -> Self {
        DeskError::Validation(err.to_string())
    }
}

/// Result type for desk operations.
pub type DeskResult<T> = Result<T, DeskError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err: DeskError = DbError::not_found("CashSession", "s1").into();
        assert!(matches!(err, DeskError::NotFound { .. }));

        let err: DeskError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert!(matches!(err, DeskError::Storage(_)));
    }

    #[test]
    fn test_partial_commit_message_carries_reconciliation_detail() {
        let err = DeskError::PartialCommit {
            session_id: "s1".to_string(),
            movement_id: "m1".to_string(),
            detail: "sale_records insert failed".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("m1"));
        assert!(message.contains("s1"));
        assert!(message.contains("sale_records insert failed"));
    }
}
