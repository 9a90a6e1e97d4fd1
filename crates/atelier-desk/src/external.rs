//! # External Collaborators
//!
//! The cash desk consumes three services owned by other parts of the salon
//! product. They are traits at the seam: the desk only ever reads from the
//! catalog and the appointment book, and asks the identity service for the
//! acting operator and the designated walk-in customer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   External Collaborator Seams                           │
//! │                                                                         │
//! │  CatalogService ────────► sellable items (id, label, unit price)       │
//! │                                                                         │
//! │  AppointmentService ────► appointments for a date range,               │
//! │                           "customer for appointment" resolution        │
//! │                                                                         │
//! │  IdentityService ───────► acting operator for audit fields,            │
//! │                           walk-in customer (created lazily on          │
//! │                           first counter sale)                          │
//! │                                                                         │
//! │  Production wires these to the salon catalog/calendar/user modules;    │
//! │  tests wire in-memory fakes.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// The desk drives these futures on its own task and never spawns them, so
// callers do not need Send bounds on the returned futures.
#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use crate::error::DeskResult;
use atelier_core::{Appointment, CatalogItem, Customer};

/// Read-only access to the sellable catalog (services and retail items).
pub trait CatalogService {
    /// Lists every item the desk may sell.
    async fn list_items(&self) -> DeskResult<Vec<CatalogItem>>;
}

/// Read-only access to the appointment book.
pub trait AppointmentService {
    /// Appointments scheduled in the inclusive date range.
    async fn appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DeskResult<Vec<Appointment>>;

    /// Resolves the customer an appointment belongs to.
    ///
    /// Fails with `NotFound` for an unknown appointment id.
    async fn customer_for(&self, appointment_id: &str) -> DeskResult<Customer>;
}

/// Operator and customer identity resolution.
pub trait IdentityService {
    /// The operator acting at the desk, for ledger audit fields.
    /// None when the desk runs unauthenticated (single-operator setups).
    async fn current_operator(&self) -> DeskResult<Option<String>>;

    /// The designated walk-in ("counter sale") customer identity.
    ///
    /// Guaranteed to exist: implementations create it lazily on first use.
    async fn walk_in_customer(&self) -> DeskResult<Customer>;
}
