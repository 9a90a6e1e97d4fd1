//! # atelier-desk: Cash Desk Orchestration for Atelier POS
//!
//! The layer the POS and admin UIs talk to. It wires the pure domain logic
//! of `atelier-core` to the storage of `atelier-db`, and reaches the rest of
//! the salon product (catalog, appointment book, identity) through traits.
//!
//! ## What Lives Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         atelier-desk                                    │
//! │                                                                         │
//! │  CashSessionManager  ── open-for-today / close / reopen / list;        │
//! │                         guards the "one open drawer" lifecycle         │
//! │                                                                         │
//! │  TicketEngine        ── the in-progress cart, totals/change, the       │
//! │                         two-part commit (movement + sale), standalone  │
//! │                         withdrawals, the enriched ledger view          │
//! │                                                                         │
//! │  External seams      ── CatalogService, AppointmentService,            │
//! │                         IdentityService traits                         │
//! │                                                                         │
//! │  DeskError           ── Validation / NotFound / NoOpenSession /        │
//! │                         Storage / PartialCommit                        │
//! │                                                                         │
//! │  DeskConfig          ── environment-driven configuration               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Typical Wiring
//!
//! ```rust,ignore
//! use atelier_db::{Database, DbConfig};
//! use atelier_desk::{DeskConfig, TicketEngine};
//!
//! let config = DeskConfig::load()?;
//! let db = Database::new(
//!     DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
//! )
//! .await?;
//!
//! let engine = TicketEngine::new(db, catalog, appointments, identity);
//! engine.sessions().open_for_today(10_000, None, operator).await?;
//! engine.add_catalog_line(&haircut);
//! let committed = engine.commit(500, PaymentMethod::Cash, Some(4_000)).await?;
//! println!("change due: {}", committed.change_cents);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod external;
pub mod session;
pub mod ticket;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{ConfigError, DeskConfig};
pub use error::{DeskError, DeskResult};
pub use external::{AppointmentService, CatalogService, IdentityService};
pub use session::CashSessionManager;
pub use ticket::{CommittedTicket, LedgerEntry, TicketEngine, TicketState};
