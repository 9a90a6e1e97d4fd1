//! # Validation Module
//!
//! Input validation utilities for Atelier POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Desk layer (Rust)                                            │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: checks that run before any write                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraint on business_date                                │
//! │  └── Foreign key movements → cash_sessions                             │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected input must leave no trace: every validator here runs before
//! the first repository write of the operation that calls it.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that a required identifier is present and non-blank.
///
/// ## Example
/// ```rust
/// use atelier_core::validation::validate_required_id;
///
/// assert!(validate_required_id("session_id", "a3f1").is_ok());
/// assert!(validate_required_id("session_id", "  ").is_err());
/// ```
pub fn validate_required_id(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a ledger amount in cents.
///
/// ## Rules
/// - Must be non-negative (≥ 0)
/// - Zero is allowed (complimentary services still produce a ledger entry)
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a withdrawal amount in cents.
///
/// ## Rules
/// - Must be positive (> 0); taking nothing out of the drawer is a no-op
///   that should never reach the ledger
pub fn validate_withdrawal_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "withdrawal amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a line or item label.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_label(label: &str) -> ValidationResult<()> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "label".to_string(),
        });
    }

    if label.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_id() {
        assert!(validate_required_id("session_id", "abc").is_ok());
        assert!(validate_required_id("session_id", "").is_err());
        assert!(validate_required_id("session_id", "   ").is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("amount", 0).is_ok());
        assert!(validate_amount_cents("amount", 2500).is_ok());
        assert!(validate_amount_cents("amount", -1).is_err());
    }

    #[test]
    fn test_validate_withdrawal_cents() {
        assert!(validate_withdrawal_cents(2000).is_ok());
        assert!(validate_withdrawal_cents(0).is_err());
        assert!(validate_withdrawal_cents(-500).is_err());
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("Haircut").is_ok());
        assert!(validate_label("").is_err());
        assert!(validate_label("   ").is_err());
        assert!(validate_label(&"A".repeat(300)).is_err());
    }
}
