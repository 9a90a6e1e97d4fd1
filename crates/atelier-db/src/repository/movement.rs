//! # Movement Repository
//!
//! The append-only money ledger. Every cash-drawer event (a committed
//! ticket, a tip, a withdrawal for the bank drop) is one row here, tied to
//! exactly one session.
//!
//! ## Append-Only Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Movement Ledger                                    │
//! │                                                                         │
//! │  record_movement() ──► INSERT ──► row is now frozen forever            │
//! │                                                                         │
//! │  There is NO update and NO delete on this repository. A mistake is     │
//! │  corrected by recording an offsetting Income/Withdrawal, so the        │
//! │  audit trail shows both the error and the correction.                  │
//! │                                                                         │
//! │  change_cents is computed HERE, at write time, and stored with the     │
//! │  row. It is never recomputed from the other columns later.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backfill note: the ledger checks that the session *exists* (foreign key)
//! but not that it is *open*: administrators may legitimately record
//! movements against an already-closed day.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use atelier_core::validation::{validate_amount_cents, validate_required_id};
use atelier_core::{change_for, Movement, MovementKind, PaymentMethod};

/// Column list shared by every movement SELECT.
const MOVEMENT_COLUMNS: &str =
    "m.id, m.session_id, m.kind, m.payment_method, m.amount_cents, m.tip_cents, \
     m.cash_received_cents, m.change_cents, m.linked_appointment_id, m.notes, \
     m.recorded_at, m.recorded_by";

/// Input for appending a ledger entry.
///
/// `change_cents` is deliberately absent: it is derived at write time from
/// the payment method, amount, tip and cash received.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub session_id: String,
    pub kind: MovementKind,
    pub payment_method: PaymentMethod,
    pub amount_cents: i64,
    pub tip_cents: i64,
    pub cash_received_cents: Option<i64>,
    pub linked_appointment_id: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

/// A ledger row joined with its session's business date, for display.
///
/// Customer names for appointment-linked rows are resolved by the desk
/// layer through the appointment book; they are not this store's data.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub movement: Movement,

    /// Business date of the owning session.
    pub session_date: NaiveDate,
}

/// Repository for movement ledger operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends a movement to the ledger.
    ///
    /// ## Validation (before any write)
    /// - `session_id` must be present
    /// - `amount_cents` and `tip_cents` must be ≥ 0
    ///
    /// ## Derivation
    /// `change_cents = max(cash_received − (amount + tip), 0)` for Cash,
    /// `0` for every other method. Captured now, stored with the row.
    ///
    /// A session id that refers to no existing session surfaces as a
    /// foreign-key violation from the store.
    pub async fn record_movement(&self, new: &NewMovement) -> DbResult<Movement> {
        validate_required_id("session_id", &new.session_id)?;
        validate_amount_cents("amount", new.amount_cents)?;
        validate_amount_cents("tip", new.tip_cents)?;

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            session_id: new.session_id.clone(),
            kind: new.kind,
            payment_method: new.payment_method,
            amount_cents: new.amount_cents,
            tip_cents: new.tip_cents,
            cash_received_cents: new.cash_received_cents,
            change_cents: change_for(
                new.payment_method,
                new.amount_cents,
                new.tip_cents,
                new.cash_received_cents,
            ),
            linked_appointment_id: new.linked_appointment_id.clone(),
            notes: new.notes.clone(),
            recorded_at: Utc::now(),
            recorded_by: new.recorded_by.clone(),
        };

        debug!(
            session_id = %movement.session_id,
            kind = ?movement.kind,
            amount = movement.amount_cents,
            "Recording movement"
        );

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, session_id, kind, payment_method,
                amount_cents, tip_cents, cash_received_cents, change_cents,
                linked_appointment_id, notes, recorded_at, recorded_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.session_id)
        .bind(movement.kind)
        .bind(movement.payment_method)
        .bind(movement.amount_cents)
        .bind(movement.tip_cents)
        .bind(movement.cash_received_cents)
        .bind(movement.change_cents)
        .bind(&movement.linked_appointment_id)
        .bind(&movement.notes)
        .bind(movement.recorded_at)
        .bind(&movement.recorded_by)
        .execute(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Lists movements newest first, optionally filtered to one session,
    /// each joined with the owning session's business date.
    pub async fn list_movements(&self, session_id: Option<&str>) -> DbResult<Vec<MovementRow>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}, s.business_date AS session_date
            FROM movements m
            JOIN cash_sessions s ON s.id = m.session_id
            WHERE (?1 IS NULL OR m.session_id = ?1)
            ORDER BY m.recorded_at DESC, m.id DESC
            "#
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Gets a single movement by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Movement>> {
        let movement = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements m WHERE m.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::session::NewSession;
    use atelier_core::SessionState;

    async fn db_with_session() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = db
            .sessions()
            .upsert_session(&NewSession {
                business_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                opening_float_cents: 10000,
                closing_total_cents: None,
                state: SessionState::Open,
                notes: None,
                opened_by: None,
            })
            .await
            .unwrap();
        (db, session.id)
    }

    fn income(session_id: &str, method: PaymentMethod) -> NewMovement {
        NewMovement {
            session_id: session_id.to_string(),
            kind: MovementKind::Income,
            payment_method: method,
            amount_cents: 2500,
            tip_cents: 500,
            cash_received_cents: Some(4000),
            linked_appointment_id: None,
            notes: Some("Haircut ×1".to_string()),
            recorded_by: Some("op-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_change_captured_at_write_time() {
        let (db, session_id) = db_with_session().await;
        let repo = db.movements();

        // Cash: 4000 − (2500 + 500) = 1000
        let cash = repo
            .record_movement(&income(&session_id, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(cash.change_cents, 1000);

        // Card: change is always zero, cash_received is ignored
        let card = repo
            .record_movement(&income(&session_id, PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(card.change_cents, 0);
    }

    #[tokio::test]
    async fn test_validation_rejects_before_write() {
        let (db, session_id) = db_with_session().await;
        let repo = db.movements();

        let blank_session = income("", PaymentMethod::Cash);
        let err = repo.record_movement(&blank_session).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let mut negative = income(&session_id, PaymentMethod::Cash);
        negative.amount_cents = -1;
        let err = repo.record_movement(&negative).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing reached the ledger
        assert!(repo.list_movements(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_fk_violation() {
        let (db, _) = db_with_session().await;
        let repo = db.movements();

        let err = repo
            .record_movement(&income("no-such-session", PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_backfill_against_closed_session_is_legal() {
        let (db, session_id) = db_with_session().await;
        db.sessions().close_session(&session_id, None).await.unwrap();

        let movement = db
            .movements()
            .record_movement(&income(&session_id, PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(movement.session_id, session_id);
    }

    #[tokio::test]
    async fn test_list_joins_session_date_and_filters() {
        let (db, session_id) = db_with_session().await;
        let repo = db.movements();

        repo.record_movement(&income(&session_id, PaymentMethod::Cash))
            .await
            .unwrap();
        repo.record_movement(&income(&session_id, PaymentMethod::Card))
            .await
            .unwrap();

        let all = repo.list_movements(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[0].session_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );

        let filtered = repo.list_movements(Some(&session_id)).await.unwrap();
        assert_eq!(filtered.len(), 2);

        let none = repo.list_movements(Some("other-session")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_movements_are_immutable() {
        let (db, session_id) = db_with_session().await;
        let repo = db.movements();

        let recorded = repo
            .record_movement(&income(&session_id, PaymentMethod::Cash))
            .await
            .unwrap();

        // Unrelated operations...
        repo.record_movement(&income(&session_id, PaymentMethod::Card))
            .await
            .unwrap();
        db.sessions().close_session(&session_id, Some(99)).await.unwrap();

        // ...leave the original row byte-for-byte intact
        let reread = repo.get_by_id(&recorded.id).await.unwrap().unwrap();
        assert_eq!(reread.amount_cents, recorded.amount_cents);
        assert_eq!(reread.tip_cents, recorded.tip_cents);
        assert_eq!(reread.change_cents, recorded.change_cents);
        assert_eq!(reread.notes, recorded.notes);
        assert_eq!(reread.session_id, recorded.session_id);
    }
}
