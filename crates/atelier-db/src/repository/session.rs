//! # Session Repository
//!
//! Database operations for daily cash sessions.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cash Session Lifecycle                              │
//! │                                                                         │
//! │  1. OPEN FOR A DATE (upsert by business_date)                          │
//! │     └── upsert_session() → CashSession { state: Open }                 │
//! │         Re-opening the same date overwrites the row, never duplicates  │
//! │                                                                         │
//! │  2. WORK AGAINST IT                                                    │
//! │     └── movements reference the session id (see movement.rs)           │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── close_session(id, counted_total?) → state: Closed              │
//! │         Omitted total keeps whatever was stored before                 │
//! │                                                                         │
//! │  4. (MANAGEMENT OVERRIDE) REOPEN                                       │
//! │     └── reopen_session(id): ONE transaction that closes every other    │
//! │         open session, then opens the target. This is the only path     │
//! │         that moves "open" between sessions, so at most one session     │
//! │         is ever Open.                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atelier_core::{CashSession, SessionState};

/// Column list shared by every session SELECT.
const SESSION_COLUMNS: &str = "id, business_date, opening_float_cents, closing_total_cents, \
                               state, notes, opened_by, created_at, updated_at";

/// Input for opening (or re-opening) a session for a date.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub business_date: NaiveDate,
    pub opening_float_cents: i64,
    pub closing_total_cents: Option<i64>,
    pub state: SessionState,
    pub notes: Option<String>,
    pub opened_by: Option<String>,
}

/// Repository for cash session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session by business date.
    pub async fn get_by_date(&self, date: NaiveDate) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE business_date = ?1"
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Returns the session with `state = Open`, if any.
    ///
    /// Ordered by date so that if an operator opened today without closing
    /// yesterday (a documented limitation of open-for-today), the current
    /// day's session is the one the desk works against.
    pub async fn find_open(&self) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions \
             WHERE state = 'open' ORDER BY business_date DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Inserts a session for a date, or overwrites the mutable fields of the
    /// existing row for that date.
    ///
    /// ## Upsert By Design
    /// "Already exists" is not an error here: opening the drawer again for a
    /// date the operator already touched updates that day's row. The row id
    /// is stable across upserts.
    pub async fn upsert_session(&self, new: &NewSession) -> DbResult<CashSession> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(date = %new.business_date, state = ?new.state, "Upserting session");

        sqlx::query(
            r#"
            INSERT INTO cash_sessions (
                id, business_date, opening_float_cents, closing_total_cents,
                state, notes, opened_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT (business_date) DO UPDATE SET
                opening_float_cents = excluded.opening_float_cents,
                closing_total_cents = excluded.closing_total_cents,
                state = excluded.state,
                notes = excluded.notes,
                opened_by = excluded.opened_by,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(new.business_date)
        .bind(new.opening_float_cents)
        .bind(new.closing_total_cents)
        .bind(new.state)
        .bind(&new.notes)
        .bind(&new.opened_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // Re-read by date: on conflict the stored row keeps its original id.
        self.get_by_date(new.business_date)
            .await?
            .ok_or_else(|| DbError::not_found("CashSession", new.business_date.to_string()))
    }

    /// Lists sessions ordered by business date descending, optionally
    /// bounded to an inclusive date range.
    pub async fn list_sessions(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> DbResult<Vec<CashSession>> {
        let sessions = sqlx::query_as::<_, CashSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM cash_sessions
            WHERE (?1 IS NULL OR business_date >= ?1)
              AND (?2 IS NULL OR business_date <= ?2)
            ORDER BY business_date DESC
            "#
        ))
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Closes a session, optionally recording the operator's counted total.
    ///
    /// ## Behavior
    /// - `closing_total_cents = None` keeps the previously stored value
    /// - Fails with `NotFound` if the id does not exist
    pub async fn close_session(
        &self,
        id: &str,
        closing_total_cents: Option<i64>,
    ) -> DbResult<CashSession> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_sessions SET
                state = 'closed',
                closing_total_cents = COALESCE(?2, closing_total_cents),
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(closing_total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CashSession", id));
        }

        info!(session_id = %id, "Session closed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("CashSession", id))
    }

    /// Reopens a session as a single atomic unit:
    /// (a) every other Open session is Closed, then (b) the target is Opened.
    ///
    /// ## Atomicity
    /// Both UPDATEs run inside one SQLite transaction, so no reader ever
    /// observes two Open sessions. Step (a) runs even when nothing else is
    /// currently open. Fails with `NotFound` (and rolls back) if the target
    /// id does not exist.
    pub async fn reopen_session(&self, id: &str) -> DbResult<CashSession> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE cash_sessions SET state = 'closed', updated_at = ?1 \
             WHERE state = 'open' AND id != ?2",
        )
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE cash_sessions SET state = 'open', updated_at = ?1 WHERE id = ?2",
        )
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back step (a)
            return Err(DbError::not_found("CashSession", id));
        }

        tx.commit().await?;

        info!(session_id = %id, "Session reopened");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("CashSession", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_session(date: NaiveDate, state: SessionState) -> NewSession {
        NewSession {
            business_date: date,
            opening_float_cents: 10000,
            closing_total_cents: None,
            state,
            notes: None,
            opened_by: Some("op-1".to_string()),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_date() {
        let db = test_db().await;
        let repo = db.sessions();

        let first = repo
            .upsert_session(&new_session(date(1), SessionState::Open))
            .await
            .unwrap();

        let mut again = new_session(date(1), SessionState::Open);
        again.opening_float_cents = 20000;
        let second = repo.upsert_session(&again).await.unwrap();

        // Same row: id is stable, fields overwritten
        assert_eq!(first.id, second.id);
        assert_eq!(second.opening_float_cents, 20000);

        let all = repo.list_sessions(None, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_close_keeps_prior_total_when_omitted() {
        let db = test_db().await;
        let repo = db.sessions();

        let mut new = new_session(date(1), SessionState::Open);
        new.closing_total_cents = Some(12345);
        let session = repo.upsert_session(&new).await.unwrap();

        let closed = repo.close_session(&session.id, None).await.unwrap();
        assert_eq!(closed.state, SessionState::Closed);
        assert_eq!(closed.closing_total_cents, Some(12345));

        // And an explicit total overwrites
        let reclosed = repo.close_session(&session.id, Some(15000)).await.unwrap();
        assert_eq!(reclosed.closing_total_cents, Some(15000));
    }

    #[tokio::test]
    async fn test_close_unknown_id_is_not_found() {
        let db = test_db().await;
        let repo = db.sessions();

        let err = repo.close_session("no-such-session", None).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reopen_moves_open_between_sessions() {
        let db = test_db().await;
        let repo = db.sessions();

        let s1 = repo
            .upsert_session(&new_session(date(1), SessionState::Open))
            .await
            .unwrap();
        let s2 = repo
            .upsert_session(&new_session(date(2), SessionState::Closed))
            .await
            .unwrap();

        let reopened = repo.reopen_session(&s2.id).await.unwrap();
        assert_eq!(reopened.state, SessionState::Open);

        let s1_after = repo.get_by_id(&s1.id).await.unwrap().unwrap();
        assert_eq!(s1_after.state, SessionState::Closed);

        // Exactly one open session
        let open: Vec<_> = repo
            .list_sessions(None, None)
            .await
            .unwrap()
            .into_iter()
            .filter(|s| s.state == SessionState::Open)
            .collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, s2.id);
    }

    #[tokio::test]
    async fn test_reopen_sequences_keep_at_most_one_open() {
        let db = test_db().await;
        let repo = db.sessions();

        let mut ids = Vec::new();
        for d in [1, 2, 3] {
            let s = repo
                .upsert_session(&new_session(date(d), SessionState::Closed))
                .await
                .unwrap();
            ids.push(s.id);
        }

        // Bounce "open" around in an arbitrary order; the invariant must
        // hold at every observation point
        for target in [&ids[0], &ids[2], &ids[1], &ids[0], &ids[0]] {
            repo.reopen_session(target).await.unwrap();

            let open_count = repo
                .list_sessions(None, None)
                .await
                .unwrap()
                .iter()
                .filter(|s| s.state == SessionState::Open)
                .count();
            assert_eq!(open_count, 1);

            let open = repo.find_open().await.unwrap().unwrap();
            assert_eq!(&open.id, target);
        }
    }

    #[tokio::test]
    async fn test_reopen_unknown_id_rolls_back() {
        let db = test_db().await;
        let repo = db.sessions();

        let s1 = repo
            .upsert_session(&new_session(date(1), SessionState::Open))
            .await
            .unwrap();

        let err = repo.reopen_session("no-such-session").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The rollback left s1 untouched
        let s1_after = repo.get_by_id(&s1.id).await.unwrap().unwrap();
        assert_eq!(s1_after.state, SessionState::Open);
    }

    #[tokio::test]
    async fn test_list_sessions_range_and_order() {
        let db = test_db().await;
        let repo = db.sessions();

        for d in [1, 2, 3] {
            repo.upsert_session(&new_session(date(d), SessionState::Closed))
                .await
                .unwrap();
        }

        let all = repo.list_sessions(None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].business_date, date(3));
        assert_eq!(all[2].business_date, date(1));

        let ranged = repo
            .list_sessions(Some(date(2)), Some(date(3)))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let from_only = repo.list_sessions(Some(date(3)), None).await.unwrap();
        assert_eq!(from_only.len(), 1);
    }

    #[tokio::test]
    async fn test_find_open() {
        let db = test_db().await;
        let repo = db.sessions();

        assert!(repo.find_open().await.unwrap().is_none());

        let s = repo
            .upsert_session(&new_session(date(1), SessionState::Open))
            .await
            .unwrap();

        let open = repo.find_open().await.unwrap().unwrap();
        assert_eq!(open.id, s.id);
    }
}
