//! # atelier-core: Pure Business Logic for Atelier POS
//!
//! This crate is the **heart** of the Atelier cash desk. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Atelier POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (POS / Admin UI)                    │   │
//! │  │    Session view ──► Ticket UI ──► Tender UI ──► Ledger view    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atelier-desk (Orchestration)                 │   │
//! │  │    CashSessionManager, TicketEngine, commit flow               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atelier-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ticket   │  │ validation│  │   │
//! │  │   │  Session  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  Movement │  │  change   │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atelier-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, session/ledger repos         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CashSession, Movement, SaleRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ticket`] - Transient cart and the change/totals math
//! - [`error`] - Domain error types
//! - [`validation`] - Pre-write validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use atelier_core::ticket::{change_for, Cart};
//! use atelier_core::types::{CatalogItem, PaymentMethod};
//!
//! let mut cart = Cart::new();
//! cart.add_catalog_line(&CatalogItem {
//!     id: "svc-haircut".to_string(),
//!     label: "Haircut".to_string(),
//!     unit_price_cents: 2500,
//! });
//!
//! // $25.00 due, $5.00 tip, $40.00 tendered in cash → $10.00 change
//! let totals = cart.totals(500, Some(4000), PaymentMethod::Cash);
//! assert_eq!(totals.change_cents, 1000);
//!
//! // Non-cash methods settle exactly
//! assert_eq!(change_for(PaymentMethod::Card, 2500, 500, None), 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ticket;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atelier_core::Money` instead of
// `use atelier_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use ticket::{change_for, Cart, CartLine, LineKind, TicketTotals};
pub use types::*;
