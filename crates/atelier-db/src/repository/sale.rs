//! # Sale Repository
//!
//! The revenue projection of committed tickets. A sale row is the sibling
//! of an Income movement: same amount, same appointment link, written at
//! the same commit, but stored independently (see the desk layer's commit
//! for the resulting atomicity gap and how it is surfaced).
//!
//! Like the movement ledger, this collection is append-only: rows are
//! written once and never mutated.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use atelier_core::validation::{validate_amount_cents, validate_required_id};
use atelier_core::{PaymentMethod, SaleRecord};

/// Column list shared by every sale SELECT.
const SALE_COLUMNS: &str =
    "id, linked_appointment_id, customer_id, amount_cents, payment_method, occurred_at, staff_id";

/// Input for recording a completed sale.
#[derive(Debug, Clone)]
pub struct NewSaleRecord {
    pub linked_appointment_id: Option<String>,
    pub customer_id: String,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub occurred_at: DateTime<Utc>,
    pub staff_id: Option<String>,
}

/// Repository for sale record operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Appends a sale record.
    ///
    /// ## Validation (before any write)
    /// - `customer_id` must be present (walk-ins use the designated
    ///   counter-sale identity, resolved by the desk layer)
    /// - `amount_cents` must be ≥ 0
    ///
    /// This operation succeeds or fails independently of the movement
    /// ledger; it never looks at sessions.
    pub async fn record_sale(&self, new: &NewSaleRecord) -> DbResult<SaleRecord> {
        validate_required_id("customer_id", &new.customer_id)?;
        validate_amount_cents("amount", new.amount_cents)?;

        let sale = SaleRecord {
            id: Uuid::new_v4().to_string(),
            linked_appointment_id: new.linked_appointment_id.clone(),
            customer_id: new.customer_id.clone(),
            amount_cents: new.amount_cents,
            payment_method: new.payment_method,
            occurred_at: new.occurred_at,
            staff_id: new.staff_id.clone(),
        };

        debug!(
            customer_id = %sale.customer_id,
            amount = sale.amount_cents,
            appointment = ?sale.linked_appointment_id,
            "Recording sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sale_records (
                id, linked_appointment_id, customer_id,
                amount_cents, payment_method, occurred_at, staff_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.linked_appointment_id)
        .bind(&sale.customer_id)
        .bind(sale.amount_cents)
        .bind(sale.payment_method)
        .bind(sale.occurred_at)
        .bind(&sale.staff_id)
        .execute(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sale records newest first.
    ///
    /// ## Usage
    /// Admin/backfill tooling and the appointment history view.
    pub async fn list_sales(&self, limit: i64) -> DbResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sale_records
            ORDER BY occurred_at DESC, id DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn walk_in_sale() -> NewSaleRecord {
        NewSaleRecord {
            linked_appointment_id: None,
            customer_id: "cust-walk-in".to_string(),
            amount_cents: 2500,
            payment_method: PaymentMethod::Cash,
            occurred_at: Utc::now(),
            staff_id: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let db = test_db().await;
        let repo = db.sales();

        let sale = repo.record_sale(&walk_in_sale()).await.unwrap();
        assert_eq!(sale.amount_cents, 2500);

        let listed = repo.list_sales(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, sale.id);
    }

    #[tokio::test]
    async fn test_requires_customer() {
        let db = test_db().await;
        let repo = db.sales();

        let mut missing_customer = walk_in_sale();
        missing_customer.customer_id = "".to_string();

        let err = repo.record_sale(&missing_customer).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.list_sales(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requires_non_negative_amount() {
        let db = test_db().await;
        let repo = db.sales();

        let mut negative = walk_in_sale();
        negative.amount_cents = -2500;

        let err = repo.record_sale(&negative).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_appointment_link_round_trips() {
        let db = test_db().await;
        let repo = db.sales();

        let mut appointment_sale = walk_in_sale();
        appointment_sale.linked_appointment_id = Some("7".to_string());
        appointment_sale.customer_id = "cust-ana".to_string();

        let sale = repo.record_sale(&appointment_sale).await.unwrap();
        assert_eq!(sale.linked_appointment_id.as_deref(), Some("7"));

        let listed = repo.list_sales(10).await.unwrap();
        assert_eq!(listed[0].linked_appointment_id.as_deref(), Some("7"));
        assert_eq!(listed[0].customer_id, "cust-ana");
    }
}
