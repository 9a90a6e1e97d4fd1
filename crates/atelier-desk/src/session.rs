//! # Cash Session Manager
//!
//! Exposes the single "current open session" concept to the rest of the
//! desk and owns the open/close/reopen lifecycle.
//!
//! ## Lifecycle Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Lifecycle Rules                              │
//! │                                                                         │
//! │  open_for_today() ──► upsert by today's date, state = Open             │
//! │                       A stale open session from another date is LEFT   │
//! │                       UNTOUCHED (logged as a warning): closing a       │
//! │                       drawer that may still hold cash is an explicit   │
//! │                       operator action, never a side effect.            │
//! │                                                                         │
//! │  close(id, total?) ──► state = Closed; omitted total keeps the         │
//! │                        stored value                                    │
//! │                                                                         │
//! │  reopen(id) ────────► the ONLY path that moves "open" between          │
//! │                       sessions: closes every other open session and    │
//! │                       opens the target in one storage transaction      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::DeskResult;
use atelier_core::validation::validate_amount_cents;
use atelier_core::{CashSession, SessionState};
use atelier_db::{Database, NewSession};

/// Manages the daily cash session lifecycle.
#[derive(Debug, Clone)]
pub struct CashSessionManager {
    db: Database,
}

impl CashSessionManager {
    /// Creates a new manager over the given database.
    pub fn new(db: Database) -> Self {
        CashSessionManager { db }
    }

    /// Returns the currently open session, or None.
    pub async fn get_open_session(&self) -> DeskResult<Option<CashSession>> {
        Ok(self.db.sessions().find_open().await?)
    }

    /// Opens (or re-opens) the drawer for today's business date.
    ///
    /// ## Behavior
    /// - Upserts by date: opening twice on the same day updates the row
    /// - A session still open for a *different* date is left untouched and
    ///   logged; operators close the previous day explicitly
    pub async fn open_for_today(
        &self,
        opening_float_cents: i64,
        notes: Option<String>,
        opened_by: Option<String>,
    ) -> DeskResult<CashSession> {
        validate_amount_cents("opening float", opening_float_cents)?;

        let today = Local::now().date_naive();

        if let Some(stale) = self.db.sessions().find_open().await? {
            if stale.business_date != today {
                warn!(
                    session_id = %stale.id,
                    business_date = %stale.business_date,
                    "Previous day's session is still open; it must be closed explicitly"
                );
            }
        }

        let session = self
            .db
            .sessions()
            .upsert_session(&NewSession {
                business_date: today,
                opening_float_cents,
                closing_total_cents: None,
                state: SessionState::Open,
                notes,
                opened_by,
            })
            .await?;

        info!(
            session_id = %session.id,
            business_date = %session.business_date,
            opening_float = session.opening_float_cents,
            "Session opened for today"
        );

        Ok(session)
    }

    /// Closes a session, optionally recording the counted drawer total.
    ///
    /// Further ticket commits and withdrawals require a (re)open session;
    /// historical movements against this one stay queryable.
    pub async fn close(
        &self,
        id: &str,
        closing_total_cents: Option<i64>,
    ) -> DeskResult<CashSession> {
        if let Some(total) = closing_total_cents {
            validate_amount_cents("closing total", total)?;
        }

        Ok(self.db.sessions().close_session(id, closing_total_cents).await?)
    }

    /// Management override: reopens a closed session to correct mistakes.
    ///
    /// Atomically closes every other open session first, so the at-most-one
    /// -open invariant holds at every observation point.
    pub async fn reopen(&self, id: &str) -> DeskResult<CashSession> {
        Ok(self.db.sessions().reopen_session(id).await?)
    }

    /// Lists sessions newest first, optionally bounded to a date range.
    pub async fn list(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DeskResult<Vec<CashSession>> {
        Ok(self.db.sessions().list_sessions(date_from, date_to).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use atelier_db::DbConfig;

    async fn manager() -> CashSessionManager {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CashSessionManager::new(db)
    }

    #[tokio::test]
    async fn test_open_for_today_then_get_open() {
        let manager = manager().await;

        assert!(manager.get_open_session().await.unwrap().is_none());

        let session = manager
            .open_for_today(10000, None, Some("op-1".to_string()))
            .await
            .unwrap();
        assert_eq!(session.state, SessionState::Open);
        assert_eq!(session.business_date, Local::now().date_naive());

        let open = manager.get_open_session().await.unwrap().unwrap();
        assert_eq!(open.id, session.id);
    }

    #[tokio::test]
    async fn test_open_twice_same_day_upserts() {
        let manager = manager().await;

        let first = manager.open_for_today(10000, None, None).await.unwrap();
        let second = manager
            .open_for_today(15000, Some("Recount".to_string()), None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.opening_float_cents, 15000);
        assert_eq!(manager.list(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_negative_float() {
        let manager = manager().await;

        let err = manager.open_for_today(-100, None, None).await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
        assert!(manager.get_open_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_and_reopen_round_trip() {
        let manager = manager().await;

        let session = manager.open_for_today(10000, None, None).await.unwrap();

        let closed = manager.close(&session.id, Some(12000)).await.unwrap();
        assert_eq!(closed.state, SessionState::Closed);
        assert_eq!(closed.closing_total_cents, Some(12000));
        assert!(manager.get_open_session().await.unwrap().is_none());

        let reopened = manager.reopen(&session.id).await.unwrap();
        assert_eq!(reopened.state, SessionState::Open);
    }

    #[tokio::test]
    async fn test_close_unknown_session() {
        let manager = manager().await;

        let err = manager.close("no-such-id", None).await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
    }
}
