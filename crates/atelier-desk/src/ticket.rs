//! # Ticket Engine
//!
//! Owns the in-progress cart and performs the two-part commit that turns it
//! into durable records: one Income movement in the cash ledger and one
//! sale record in the revenue history.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Two-Part Commit                                  │
//! │                                                                         │
//! │  commit(tip, method, cash_received)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Guards: open session? committable cart? valid amounts?                │
//! │       │          (failure here = nothing written, cart kept)           │
//! │       ▼                                                                 │
//! │  Resolve customer (appointment's, or lazy walk-in identity)            │
//! │       │          (failure here = nothing written, cart kept)           │
//! │       ▼                                                                 │
//! │  WRITE 1: Income movement ──► append-only, immutable from now on       │
//! │       │          (failure here = clean abort, cart kept)               │
//! │       ▼                                                                 │
//! │  WRITE 2: sale record                                                  │
//! │       │          (failure here = PARTIAL COMMIT: the movement cannot   │
//! │       │           be rolled back; surface PartialCommit, keep the      │
//! │       │           cart, log reconciliation detail)                     │
//! │       ▼                                                                 │
//! │  Clear cart, return change for display/printing                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The movement and the sale are two independently stored projections of
//! one business event. There is no storage transaction spanning both, so a
//! concurrent reader may transiently see the movement without the sale; a
//! second-write failure leaves that state permanently until an admin
//! reconciles it. The PartialCommit error and the error-level log entry
//! exist precisely so that never looks like success.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{DeskError, DeskResult};
use crate::external::{AppointmentService, CatalogService, IdentityService};
use crate::session::CashSessionManager;
use atelier_core::validation::{validate_amount_cents, validate_withdrawal_cents};
use atelier_core::{
    change_for, Appointment, AppointmentStatus, Cart, CatalogItem, Movement, MovementKind,
    PaymentMethod, TicketTotals,
};
use atelier_db::{Database, MovementRow, NewMovement, NewSaleRecord};

// =============================================================================
// Ticket State
// =============================================================================

/// Shared ownership of the in-progress cart.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Cart>>` because:
/// - `Arc`: Allows shared ownership across desk operations
/// - `Mutex`: Ensures only one operation mutates the cart at a time
///
/// ## Why Not RwLock?
/// Cart operations are quick, and most operations modify state.
/// A RwLock would add complexity with minimal benefit.
#[derive(Debug, Clone, Default)]
pub struct TicketState {
    cart: Arc<Mutex<Cart>>,
}

impl TicketState {
    /// Creates a new empty ticket state.
    pub fn new() -> Self {
        TicketState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Result of a successful commit, for display and receipt printing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedTicket {
    pub movement_id: String,
    pub sale_id: String,
    pub change_cents: i64,
}

/// A ledger row enriched for display: session date from the store, customer
/// name resolved through the appointment book when the row is linked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub movement: Movement,
    pub session_date: NaiveDate,
    pub customer_name: Option<String>,
}

// =============================================================================
// Ticket Engine
// =============================================================================

/// The POS ticket engine: cart mutation, totals, and the two-part commit.
///
/// Generic over the external collaborator seams so production wires the
/// real catalog/calendar/user modules and tests wire in-memory fakes.
pub struct TicketEngine<C, A, I> {
    db: Database,
    sessions: CashSessionManager,
    ticket: TicketState,
    catalog: C,
    appointments: A,
    identity: I,
}

impl<C, A, I> TicketEngine<C, A, I>
where
    C: CatalogService,
    A: AppointmentService,
    I: IdentityService,
{
    /// Creates a new engine with an empty cart.
    pub fn new(db: Database, catalog: C, appointments: A, identity: I) -> Self {
        TicketEngine {
            sessions: CashSessionManager::new(db.clone()),
            db,
            ticket: TicketState::new(),
            catalog,
            appointments,
            identity,
        }
    }

    /// The session manager backing this desk.
    pub fn sessions(&self) -> &CashSessionManager {
        &self.sessions
    }

    /// A snapshot of the current cart for the UI.
    pub fn cart(&self) -> Cart {
        self.ticket.with_cart(|c| c.clone())
    }

    // -------------------------------------------------------------------------
    // Browsing (external collaborators)
    // -------------------------------------------------------------------------

    /// Sellable items from the catalog service.
    pub async fn catalog_items(&self) -> DeskResult<Vec<CatalogItem>> {
        self.catalog.list_items().await
    }

    /// Pending appointments in the date range, ready to seed a ticket.
    pub async fn pending_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DeskResult<Vec<Appointment>> {
        let appointments = self.appointments.appointments_between(from, to).await?;
        Ok(appointments
            .into_iter()
            .filter(|a| a.status == AppointmentStatus::Pending)
            .collect())
    }

    // -------------------------------------------------------------------------
    // Cart mutation (transient, no storage involved)
    // -------------------------------------------------------------------------

    /// Adds a catalog item; a line for the same item increments instead.
    pub fn add_catalog_line(&self, item: &CatalogItem) {
        self.ticket.with_cart_mut(|c| c.add_catalog_line(item));
    }

    /// Adds an operator-typed line; returns false (and adds nothing) for a
    /// blank label or non-positive price.
    pub fn add_freeform_line(&self, label: &str, unit_price_cents: i64) -> bool {
        self.ticket
            .with_cart_mut(|c| c.add_freeform_line(label, unit_price_cents))
    }

    /// Overwrites a line's quantity. Zero/negative values are accepted;
    /// the commit guard is what blocks them from persisting.
    pub fn set_quantity(&self, line_id: &str, quantity: i64) -> DeskResult<()> {
        self.ticket
            .with_cart_mut(|c| c.set_quantity(line_id, quantity))
            .map_err(DeskError::from)
    }

    /// Removes a line from the cart.
    pub fn remove_line(&self, line_id: &str) -> DeskResult<()> {
        self.ticket
            .with_cart_mut(|c| c.remove_line(line_id))
            .map_err(DeskError::from)
    }

    /// Seeds the ticket from an appointment: the cart is replaced wholesale
    /// with one line for the appointment's service.
    pub fn bind_appointment(&self, appointment: &Appointment) {
        self.ticket
            .with_cart_mut(|c| c.bind_appointment(appointment));
    }

    /// Drops the appointment binding, keeping the lines.
    pub fn unbind_appointment(&self) {
        self.ticket.with_cart_mut(|c| c.unbind_appointment());
    }

    /// Abandons the ticket: clears lines and binding, persists nothing.
    pub fn clear(&self) {
        self.ticket.with_cart_mut(|c| c.clear());
    }

    /// Totals for the tender screen.
    pub fn totals(
        &self,
        tip_cents: i64,
        cash_received_cents: Option<i64>,
        method: PaymentMethod,
    ) -> TicketTotals {
        self.ticket
            .with_cart(|c| c.totals(tip_cents, cash_received_cents, method))
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Whether commit is currently allowed: non-empty cart, every line
    /// quantity ≥ 1, and an open session at the desk.
    pub async fn can_commit(&self) -> DeskResult<bool> {
        if !self.ticket.with_cart(|c| c.lines_committable()) {
            return Ok(false);
        }
        Ok(self.sessions.get_open_session().await?.is_some())
    }

    /// Turns the cart into one Income movement and one sale record, then
    /// clears the cart and returns the change to hand back.
    ///
    /// ## Failure Semantics
    /// - Guard/resolution failures: nothing written, cart kept
    /// - Movement write fails: `Storage`, nothing written, cart kept
    /// - Sale write fails after the movement is durable: `PartialCommit`
    ///   with the session id, movement id and cart description; the cart
    ///   stays uncommitted so the operator sees something went wrong
    pub async fn commit(
        &self,
        tip_cents: i64,
        method: PaymentMethod,
        cash_received_cents: Option<i64>,
    ) -> DeskResult<CommittedTicket> {
        validate_amount_cents("tip", tip_cents)?;
        if let Some(received) = cash_received_cents {
            validate_amount_cents("cash received", received)?;
        }

        let session = self
            .sessions
            .get_open_session()
            .await?
            .ok_or(DeskError::NoOpenSession)?;

        // One snapshot: cart edits racing this commit do not bleed into it
        let (committable, subtotal_cents, bound_appointment, description) =
            self.ticket.with_cart(|c| {
                (
                    c.lines_committable(),
                    c.subtotal_cents(),
                    c.bound_appointment_id.clone(),
                    c.description(),
                )
            });

        if !committable {
            return Err(DeskError::validation(
                "Cart is empty or has a line with quantity below 1",
            ));
        }

        // Resolve identities before the first write; a failure here aborts
        // with nothing recorded
        let customer = match &bound_appointment {
            Some(appointment_id) => self.appointments.customer_for(appointment_id).await?,
            None => self.identity.walk_in_customer().await?,
        };
        let operator = self.identity.current_operator().await?;

        let change_cents = change_for(method, subtotal_cents, tip_cents, cash_received_cents);

        // WRITE 1: the ledger movement
        let movement = self
            .db
            .movements()
            .record_movement(&NewMovement {
                session_id: session.id.clone(),
                kind: MovementKind::Income,
                payment_method: method,
                amount_cents: subtotal_cents,
                tip_cents,
                cash_received_cents,
                linked_appointment_id: bound_appointment.clone(),
                notes: Some(description.clone()),
                recorded_by: operator,
            })
            .await?;

        // WRITE 2: the sale record. The movement is already durable and
        // immutable; a failure from here on is a partial commit.
        let sale = match self
            .db
            .sales()
            .record_sale(&NewSaleRecord {
                linked_appointment_id: bound_appointment,
                customer_id: customer.id,
                amount_cents: subtotal_cents,
                payment_method: method,
                occurred_at: Utc::now(),
                staff_id: None,
            })
            .await
        {
            Ok(sale) => sale,
            Err(err) => {
                error!(
                    session_id = %session.id,
                    movement_id = %movement.id,
                    cart = %description,
                    error = %err,
                    "Sale record failed after movement was written; manual reconciliation required"
                );
                return Err(DeskError::PartialCommit {
                    session_id: session.id,
                    movement_id: movement.id,
                    detail: err.to_string(),
                });
            }
        };

        // Both halves durable: the ticket is done
        self.ticket.with_cart_mut(|c| c.clear());

        info!(
            movement_id = %movement.id,
            sale_id = %sale.id,
            amount = subtotal_cents,
            change = change_cents,
            "Ticket committed"
        );

        Ok(CommittedTicket {
            movement_id: movement.id,
            sale_id: sale.id,
            change_cents,
        })
    }

    // -------------------------------------------------------------------------
    // Standalone withdrawal
    // -------------------------------------------------------------------------

    /// Records a withdrawal against the open session, bypassing the cart.
    ///
    /// Fails with `NoOpenSession` when no session is open; nothing is
    /// written in that case.
    pub async fn record_withdrawal(
        &self,
        amount_cents: i64,
        notes: Option<String>,
    ) -> DeskResult<Movement> {
        validate_withdrawal_cents(amount_cents)?;

        let session = self
            .sessions
            .get_open_session()
            .await?
            .ok_or(DeskError::NoOpenSession)?;

        let operator = self.identity.current_operator().await?;

        let movement = self
            .db
            .movements()
            .record_movement(&NewMovement {
                session_id: session.id.clone(),
                kind: MovementKind::Withdrawal,
                payment_method: PaymentMethod::Cash,
                amount_cents,
                tip_cents: 0,
                cash_received_cents: None,
                linked_appointment_id: None,
                notes,
                recorded_by: operator,
            })
            .await?;

        info!(
            movement_id = %movement.id,
            session_id = %session.id,
            amount = amount_cents,
            "Withdrawal recorded"
        );

        Ok(movement)
    }

    // -------------------------------------------------------------------------
    // Ledger view
    // -------------------------------------------------------------------------

    /// Movements newest first, optionally filtered to one session, enriched
    /// with the customer name for appointment-linked rows.
    pub async fn ledger(&self, session_id: Option<&str>) -> DeskResult<Vec<LedgerEntry>> {
        let rows = self.db.movements().list_movements(session_id).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for MovementRow {
            movement,
            session_date,
        } in rows
        {
            // An appointment the book no longer knows leaves the name blank
            // rather than failing the whole listing
            let customer_name = match &movement.linked_appointment_id {
                Some(appointment_id) => self
                    .appointments
                    .customer_for(appointment_id)
                    .await
                    .ok()
                    .map(|c| c.name),
                None => None,
            };

            entries.push(LedgerEntry {
                movement,
                session_date,
                customer_name,
            });
        }

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
