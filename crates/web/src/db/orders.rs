//! Order repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use order_desk_core::{CustomerId, OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::order::OrderDraft;
use crate::models::{Order, StatusCounts};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    customer_name: String,
    product_id: ProductId,
    product_name: String,
    status: OrderStatus,
    note: Option<String>,
    date_created: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            product_id: row.product_id,
            product_name: row.product_name,
            status: row.status,
            note: row.note,
            date_created: row.date_created,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatusCountsRow {
    total: i64,
    delivered: i64,
    pending: i64,
    shipped: i64,
}

impl From<StatusCountsRow> for StatusCounts {
    fn from(row: StatusCountsRow) -> Self {
        let count = |n: i64| usize::try_from(n).unwrap_or_default();
        Self {
            total: count(row.total),
            delivered: count(row.delivered),
            pending: count(row.pending),
            shipped: count(row.shipped),
        }
    }
}

const ORDER_SELECT: &str = r"
    SELECT o.id, o.customer_id, c.name AS customer_name,
           o.product_id, p.name AS product_name,
           o.status, o.note, o.date_created
    FROM crm.order o
    JOIN crm.customer c ON c.id = o.customer_id
    JOIN crm.product p ON p.id = o.product_id
";

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recently placed orders across all customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} ORDER BY o.date_created DESC, o.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE o.customer_id = $1 ORDER BY o.date_created DESC, o.id DESC"
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Totals over every order in the system.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let row = sqlx::query_as::<_, StatusCountsRow>(
            r"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'delivered') AS delivered,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'shipped') AS shipped
            FROM crm.order
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    /// Insert one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (for example a
    /// dangling customer or product reference).
    pub async fn create(&self, draft: &OrderDraft) -> Result<OrderId, RepositoryError> {
        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO crm.order (customer_id, product_id, status, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(draft.customer_id)
        .bind(draft.product_id)
        .bind(draft.status)
        .bind(draft.note.as_deref())
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(order_id = %id, customer_id = %draft.customer_id, "order created");
        Ok(id)
    }

    /// Overwrite an order's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE crm.order
            SET customer_id = $2, product_id = $3, status = $4, note = $5
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(draft.customer_id)
        .bind(draft.product_id)
        .bind(draft.status)
        .bind(draft.note.as_deref())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM crm.order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(order_id = %id, "order deleted");
        Ok(())
    }
}
