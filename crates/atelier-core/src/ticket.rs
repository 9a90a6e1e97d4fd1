//! # Ticket Module
//!
//! The transient cart behind a POS ticket, and the math that turns it into
//! a committed sale: subtotal, total due, change.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ticket Cart Lifecycle                             │
//! │                                                                         │
//! │  POS view opens ──► Cart::new()                                        │
//! │                                                                         │
//! │  Pick catalog item ──► add_catalog_line() ──► merge or append          │
//! │  Type free item ─────► add_freeform_line() ─► append (validated)       │
//! │  Pick appointment ───► bind_appointment() ──► REPLACE whole cart       │
//! │  Edit quantity ──────► set_quantity() ──────► overwrite, NO clamping   │
//! │                                                                         │
//! │  Commit ──► Income movement + sale record written ──► clear()          │
//! │  Abandon ──► cart dropped, nothing persisted                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Editable State vs Commit Guard
//! `set_quantity` accepts zero and negative values on purpose. The cart is
//! editable working state; [`Cart::lines_committable`] is the single gate
//! that keeps invalid carts out of the ledger. The UI disables the commit
//! button off the same predicate the engine enforces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Appointment, CatalogItem, PaymentMethod};

// =============================================================================
// Change Formula
// =============================================================================

/// Change returned to the customer, captured at write time.
///
/// Only cash produces change: `max(cash_received − (amount + tip), 0)`.
/// Every other method settles exactly, so change is zero. The movement
/// ledger and the ticket engine both go through this one function.
///
/// ## Example
/// ```rust
/// use atelier_core::ticket::change_for;
/// use atelier_core::types::PaymentMethod;
///
/// assert_eq!(change_for(PaymentMethod::Cash, 2500, 500, Some(4000)), 1000);
/// assert_eq!(change_for(PaymentMethod::Cash, 2500, 500, Some(2000)), 0);
/// assert_eq!(change_for(PaymentMethod::Card, 2500, 500, Some(4000)), 0);
/// ```
pub fn change_for(
    method: PaymentMethod,
    amount_cents: i64,
    tip_cents: i64,
    cash_received_cents: Option<i64>,
) -> i64 {
    if method != PaymentMethod::Cash {
        return 0;
    }
    let due = amount_cents + tip_cents;
    (cash_received_cents.unwrap_or(0) - due).max(0)
}

// =============================================================================
// Cart Line
// =============================================================================

/// What a cart line was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// A priced service or product picked from the catalog.
    CatalogService,
    /// An ad-hoc item the operator typed in (label + price).
    FreeformItem,
    /// The service of a bound appointment, at its agreed price.
    AppointmentService,
}

/// One line of the in-progress ticket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Stable id for UI edits (quantity, removal).
    pub line_id: String,

    pub kind: LineKind,

    /// Catalog item or appointment the line came from. None for freeform.
    pub source_id: Option<String>,

    /// Label shown to the operator and carried into the movement notes.
    pub label: String,

    /// Price locked in when the line was added.
    pub unit_price_cents: i64,

    /// Freely editable; only the commit guard requires it to be ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    fn new(kind: LineKind, source_id: Option<String>, label: String, unit_price_cents: i64) -> Self {
        CartLine {
            line_id: Uuid::new_v4().to_string(),
            kind,
            source_id,
            label,
            unit_price_cents,
            quantity: 1,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Ticket Totals
// =============================================================================

/// Totals summary for the tender screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TicketTotals {
    pub subtotal_cents: i64,
    pub total_due_cents: i64,
    pub change_cents: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress selection of items being sold before it is committed.
///
/// ## Invariants
/// - Purely in-memory; the commit operation is the only boundary crossing
///   into durable storage
/// - Binding an appointment replaces the cart wholesale; it is never merged
/// - Adding catalog lines while an appointment is bound is allowed (mixed
///   cart); only binding a *new* appointment resets
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    /// Ordered lines of the ticket.
    pub lines: Vec<CartLine>,

    /// Appointment this ticket settles, when seeded from one.
    pub bound_appointment_id: Option<String>,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            bound_appointment_id: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a catalog item, merging into an existing line for the same item.
    ///
    /// ## Behavior
    /// - Same catalog item already in cart: quantity += 1
    /// - Otherwise: new line with quantity 1
    /// - A bound appointment is left in place (mixed carts are legal)
    pub fn add_catalog_line(&mut self, item: &CatalogItem) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.kind == LineKind::CatalogService && l.source_id.as_deref() == Some(&item.id))
        {
            line.quantity += 1;
            return;
        }

        self.lines.push(CartLine::new(
            LineKind::CatalogService,
            Some(item.id.clone()),
            item.label.clone(),
            item.unit_price_cents,
        ));
    }

    /// Adds an ad-hoc line the operator typed in.
    ///
    /// Rejected (no line added, returns `false`) when the label is blank or
    /// the price is not positive.
    pub fn add_freeform_line(&mut self, label: &str, unit_price_cents: i64) -> bool {
        let label = label.trim();
        if label.is_empty() || unit_price_cents <= 0 {
            return false;
        }

        self.lines.push(CartLine::new(
            LineKind::FreeformItem,
            None,
            label.to_string(),
            unit_price_cents,
        ));
        true
    }

    /// Overwrites a line's quantity with the given number.
    ///
    /// Zero and negative values are accepted here; the commit guard is what
    /// prevents committing such a cart.
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                line_id: line_id.to_string(),
            })?;

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound {
                line_id: line_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Replaces the entire cart with a single line for the appointment's
    /// service and binds the appointment.
    ///
    /// Selecting an appointment always resets the ticket; whatever was in
    /// the cart before is discarded, not merged.
    pub fn bind_appointment(&mut self, appointment: &Appointment) {
        self.lines.clear();
        self.lines.push(CartLine::new(
            LineKind::AppointmentService,
            Some(appointment.id.clone()),
            appointment.service_label.clone(),
            appointment.price_cents,
        ));
        self.bound_appointment_id = Some(appointment.id.clone());
    }

    /// Clears the appointment binding without touching existing lines.
    pub fn unbind_appointment(&mut self) {
        self.bound_appointment_id = None;
    }

    /// Clears all lines and the binding.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.bound_appointment_id = None;
        self.created_at = Utc::now();
    }

    /// Number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtotal: Σ(unit price × quantity).
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// The cart half of the commit guard: non-empty, every quantity ≥ 1.
    ///
    /// The other half (an open session must exist) lives in the ticket
    /// engine, which owns session access.
    pub fn lines_committable(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|l| l.quantity >= 1)
    }

    /// Human-readable summary carried into the movement notes.
    ///
    /// ## Example
    /// `"Haircut ×1, Color treatment ×2"`
    pub fn description(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{} ×{}", l.label, l.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Totals for the tender screen, using the ledger's change formula.
    pub fn totals(
        &self,
        tip_cents: i64,
        cash_received_cents: Option<i64>,
        method: PaymentMethod,
    ) -> TicketTotals {
        let subtotal_cents = self.subtotal_cents();
        TicketTotals {
            subtotal_cents,
            total_due_cents: subtotal_cents + tip_cents,
            change_cents: change_for(method, subtotal_cents, tip_cents, cash_received_cents),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppointmentStatus;

    fn haircut() -> CatalogItem {
        CatalogItem {
            id: "svc-haircut".to_string(),
            label: "Haircut".to_string(),
            unit_price_cents: 2500,
        }
    }

    fn color() -> CatalogItem {
        CatalogItem {
            id: "svc-color".to_string(),
            label: "Color treatment".to_string(),
            unit_price_cents: 6000,
        }
    }

    fn ana_appointment() -> Appointment {
        Appointment {
            id: "7".to_string(),
            customer_id: "cust-ana".to_string(),
            customer_name: "Ana".to_string(),
            service_label: "Blow dry".to_string(),
            price_cents: 1800,
            scheduled_on: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: AppointmentStatus::Pending,
        }
    }

    #[test]
    fn test_add_catalog_line_merges_same_item() {
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());
        cart.add_catalog_line(&haircut());
        cart.add_catalog_line(&color());

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.subtotal_cents(), 2 * 2500 + 6000);
    }

    #[test]
    fn test_add_freeform_line_rejects_invalid() {
        let mut cart = Cart::new();

        assert!(!cart.add_freeform_line("", 500));
        assert!(!cart.add_freeform_line("   ", 500));
        assert!(!cart.add_freeform_line("Hair pins", 0));
        assert!(!cart.add_freeform_line("Hair pins", -100));
        assert!(cart.is_empty());

        assert!(cart.add_freeform_line("Hair pins", 350));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].kind, LineKind::FreeformItem);
    }

    #[test]
    fn test_set_quantity_does_not_clamp() {
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());
        let line_id = cart.lines[0].line_id.clone();

        cart.set_quantity(&line_id, 0).unwrap();
        assert_eq!(cart.lines[0].quantity, 0);

        cart.set_quantity(&line_id, -3).unwrap();
        assert_eq!(cart.lines[0].quantity, -3);

        assert!(matches!(
            cart.set_quantity("no-such-line", 1),
            Err(CoreError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());
        let line_id = cart.lines[0].line_id.clone();

        cart.remove_line(&line_id).unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_line(&line_id).is_err());
    }

    #[test]
    fn test_bind_appointment_replaces_cart_wholesale() {
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());
        cart.add_catalog_line(&color());

        cart.bind_appointment(&ana_appointment());

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].kind, LineKind::AppointmentService);
        assert_eq!(cart.lines[0].unit_price_cents, 1800);
        assert_eq!(cart.bound_appointment_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_mixed_cart_keeps_binding() {
        let mut cart = Cart::new();
        cart.bind_appointment(&ana_appointment());
        cart.add_catalog_line(&haircut());

        // Adding catalog lines does not clear the binding
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.bound_appointment_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_unbind_keeps_lines() {
        let mut cart = Cart::new();
        cart.bind_appointment(&ana_appointment());
        cart.unbind_appointment();

        assert_eq!(cart.bound_appointment_id, None);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_lines_committable() {
        let mut cart = Cart::new();
        assert!(!cart.lines_committable()); // empty

        cart.add_catalog_line(&haircut());
        assert!(cart.lines_committable());

        let line_id = cart.lines[0].line_id.clone();
        cart.set_quantity(&line_id, 0).unwrap();
        assert!(!cart.lines_committable()); // quantity < 1

        cart.set_quantity(&line_id, 2).unwrap();
        assert!(cart.lines_committable());
    }

    #[test]
    fn test_change_formula() {
        // Cash: max(received − (amount + tip), 0)
        assert_eq!(change_for(PaymentMethod::Cash, 2500, 500, Some(4000)), 1000);
        assert_eq!(change_for(PaymentMethod::Cash, 2500, 500, Some(3000)), 0);
        assert_eq!(change_for(PaymentMethod::Cash, 2500, 500, Some(2000)), 0);
        assert_eq!(change_for(PaymentMethod::Cash, 2500, 0, None), 0);

        // Non-cash methods never produce change
        assert_eq!(change_for(PaymentMethod::Card, 2500, 500, Some(9999)), 0);
        assert_eq!(change_for(PaymentMethod::MobileTransfer, 2500, 0, Some(9999)), 0);
        assert_eq!(change_for(PaymentMethod::BankTransfer, 2500, 0, Some(9999)), 0);
    }

    #[test]
    fn test_totals_haircut_scenario() {
        // Haircut $25.00 ×1, cash, tip $5.00, received $40.00 → change $10.00
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());

        let totals = cart.totals(500, Some(4000), PaymentMethod::Cash);
        assert_eq!(totals.subtotal_cents, 2500);
        assert_eq!(totals.total_due_cents, 3000);
        assert_eq!(totals.change_cents, 1000);
    }

    #[test]
    fn test_description() {
        let mut cart = Cart::new();
        cart.add_catalog_line(&haircut());
        cart.add_catalog_line(&color());
        cart.add_catalog_line(&color());

        assert_eq!(cart.description(), "Haircut ×1, Color treatment ×2");
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.bind_appointment(&ana_appointment());
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.bound_appointment_id, None);
    }
}
