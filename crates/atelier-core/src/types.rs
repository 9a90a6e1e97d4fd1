//! # Domain Types
//!
//! Core domain types used throughout Atelier POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CashSession   │   │    Movement     │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  business_date  │   │  session_id(FK) │   │  customer_id    │       │
//! │  │  state          │   │  kind           │   │  amount_cents   │       │
//! │  │  opening_float  │   │  amount + tip   │   │  appointment?   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SessionState   │   │  MovementKind   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Income         │   │  Cash, Card     │       │
//! │  │  Closed         │   │  Withdrawal     │   │  Mobile, Bank   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Movement` of kind `Income` written by a ticket commit has a sibling
//! `SaleRecord` with the same amount and appointment link: the ledger row is
//! the cash-flow projection, the sale row is the revenue/appointment-history
//! projection of the same business event.
//!
//! Read-only views of external collaborators (catalog, appointment book,
//! customers) also live here so the whole workspace shares one vocabulary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Session State
// =============================================================================

/// Lifecycle state of a daily cash session.
///
/// ## Invariant
/// At most one session is `Open` at any instant, across the whole system.
/// The store's `reopen` operation is the only path that moves "open" from
/// one session to another, and it does so atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The drawer is in use; movements are being recorded against it.
    Open,
    /// The drawer was counted and closed for the day.
    Closed,
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Money in: a committed ticket or an administrative backfill.
    Income,
    /// Money out: cash taken from the drawer (supplier run, bank drop).
    Withdrawal,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; the only method that produces change.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Mobile wallet transfer.
    MobileTransfer,
    /// Direct bank transfer.
    BankTransfer,
}

// =============================================================================
// Cash Session
// =============================================================================

/// The record of one physical cash drawer being in use for one business date.
///
/// Sessions are keyed by `business_date` with a UNIQUE constraint: opening
/// the drawer twice for the same date upserts the existing row rather than
/// duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The calendar date this drawer serves. Unique across all sessions.
    #[ts(as = "String")]
    pub business_date: NaiveDate,

    /// Cash placed in the drawer when it was opened.
    pub opening_float_cents: i64,

    /// Operator-entered count at close. None until the operator records it.
    pub closing_total_cents: Option<i64>,

    /// Open or Closed.
    pub state: SessionState,

    /// Free-form operator notes.
    pub notes: Option<String>,

    /// User reference of whoever opened the drawer.
    pub opened_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashSession {
    /// Whether this session currently accepts new work at the desk.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Returns the opening float as Money.
    #[inline]
    pub fn opening_float(&self) -> Money {
        Money::from_cents(self.opening_float_cents)
    }

    /// Returns the operator-entered closing total, if recorded.
    #[inline]
    pub fn closing_total(&self) -> Option<Money> {
        self.closing_total_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One ledger entry (money in or out) against a session.
///
/// ## Immutability
/// Movements are append-only. There is no update or delete operation
/// anywhere in the workspace; corrections are offsetting entries, which
/// preserves the audit trail. `change_cents` is captured at write time,
/// never recomputed from the other fields later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: String,

    /// Owning session. Always references an existing session, but not
    /// necessarily the open one: admins may backfill closed days.
    pub session_id: String,

    pub kind: MovementKind,

    pub payment_method: PaymentMethod,

    /// Amount due, excluding tip. Never negative.
    pub amount_cents: i64,

    /// Tip on top of the amount. Never negative, defaults to zero.
    pub tip_cents: i64,

    /// Cash handed over by the customer. Only meaningful for Cash.
    pub cash_received_cents: Option<i64>,

    /// Change returned, captured at write time.
    /// Zero for non-cash methods.
    pub change_cents: i64,

    /// Appointment this movement settles, when it came from one.
    pub linked_appointment_id: Option<String>,

    /// Cart description or operator note.
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,

    /// User reference of the operator who recorded it.
    pub recorded_by: Option<String>,
}

impl Movement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn tip(&self) -> Money {
        Money::from_cents(self.tip_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// Revenue/appointment-history projection of a completed sale.
///
/// Written once at commit time alongside the Income movement, never mutated.
/// A counter sale (walk-in) uses the designated walk-in customer identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,

    /// Appointment this sale settles, when it came from one.
    pub linked_appointment_id: Option<String>,

    /// The customer charged; the walk-in identity for counter sales.
    pub customer_id: String,

    pub amount_cents: i64,

    pub payment_method: PaymentMethod,

    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,

    /// Staff member credited with the sale, when known.
    pub staff_id: Option<String>,
}

impl SaleRecord {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// External Collaborator Views
// =============================================================================
// The catalog, appointment book and customer directory are owned by other
// parts of the product. The desk only ever reads these shapes.

/// A sellable catalog item (service or retail product).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub id: String,
    pub label: String,
    pub unit_price_cents: i64,
}

impl CatalogItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Status of a scheduled appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A scheduled appointment, as served by the appointment book.
///
/// Binding one to a ticket seeds the cart with a single line for its
/// service at its agreed price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub service_label: String,
    pub price_cents: i64,
    #[ts(as = "String")]
    pub scheduled_on: NaiveDate,
    pub status: AppointmentStatus,
}

/// A customer identity, as served by the customer directory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(state: SessionState) -> CashSession {
        CashSession {
            id: "s1".to_string(),
            business_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            opening_float_cents: 10000,
            closing_total_cents: None,
            state,
            notes: None,
            opened_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_is_open() {
        assert!(session(SessionState::Open).is_open());
        assert!(!session(SessionState::Closed).is_open());
    }

    #[test]
    fn test_session_money_accessors() {
        let mut s = session(SessionState::Open);
        assert_eq!(s.opening_float().cents(), 10000);
        assert_eq!(s.closing_total(), None);

        s.closing_total_cents = Some(12500);
        assert_eq!(s.closing_total().unwrap().cents(), 12500);
    }
}
