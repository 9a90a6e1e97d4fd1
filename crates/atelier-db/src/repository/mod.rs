//! # Repository Module
//!
//! Database repository implementations for Atelier POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Desk operation                                                        │
//! │       │                                                                 │
//! │       │  db.sessions().find_open()                                      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SessionRepository                                                     │
//! │  ├── upsert_session(&self, new)                                        │
//! │  ├── close_session(&self, id, total)                                   │
//! │  ├── reopen_session(&self, id)                                         │
//! │  └── list_sessions(&self, from, to)                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory SQLite)                                     │
//! │  • SQL is isolated in one place                                        │
//! │  • Append-only collections have no update/delete surface to misuse    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`session::SessionRepository`] - Daily cash session lifecycle
//! - [`movement::MovementRepository`] - Append-only money ledger
//! - [`sale::SaleRepository`] - Revenue projection of committed tickets

pub mod movement;
pub mod sale;
pub mod session;
