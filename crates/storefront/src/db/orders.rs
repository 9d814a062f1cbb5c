//! Order repository for database operations.
//!
//! One row per checkout attempt. Rows are created `pending` by the checkout
//! route and flipped to `paid` by the payment webhook; nothing in this flow
//! ever deletes them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::Row;
use sqlx::postgres::PgRow;

use sevenfold_core::{OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::order::{CheckoutDetails, Order};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a `pending` order for a freshly created checkout session.
    ///
    /// Address fields start empty; the webhook fills them in. Called exactly
    /// once per checkout attempt, after the provider has confirmed the
    /// session - so a provider session without a row cannot occur, while a
    /// row without a provider session would require the insert racing a
    /// provider failure, which the call order rules out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session id already has a
    /// row, `RepositoryError::Database` for other database errors.
    pub async fn insert_pending(
        &self,
        external_session_id: &str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO orders (external_session_id)
            VALUES ($1)
            RETURNING id, external_session_id, customer_name, address_line,
                      city, state, postal_code, country, status,
                      created_at, updated_at
            ",
        )
        .bind(external_session_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!(
                    "order already exists for session {external_session_id}"
                ))
            }
            _ => RepositoryError::Database(e),
        })?;

        order_from_row(&row)
    }

    /// Transition an order to `paid`, filling in customer/shipping details.
    ///
    /// Update-by-unique-key is the sole idempotency mechanism here: the
    /// filter matches zero or one row, replays re-assert the same terminal
    /// state, and zero rows matched is a no-op, not a failure. Do not add an
    /// "already processed" guard on top - it could only desync from the
    /// filter.
    ///
    /// Returns the number of rows affected (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid(
        &self,
        external_session_id: &str,
        details: &CheckoutDetails,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET customer_name = $2,
                address_line = $3,
                city = $4,
                state = $5,
                postal_code = $6,
                country = $7,
                status = $8,
                updated_at = now()
            WHERE external_session_id = $1
            ",
        )
        .bind(external_session_id)
        .bind(&details.customer_name)
        .bind(&details.address_line)
        .bind(&details.city)
        .bind(&details.state)
        .bind(&details.postal_code)
        .bind(&details.country)
        .bind(OrderStatus::Paid.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Look up an order by its checkout-session id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn find_by_session(
        &self,
        external_session_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, external_session_id, customer_name, address_line,
                   city, state, postal_code, country, status,
                   created_at, updated_at
            FROM orders
            WHERE external_session_id = $1
            ",
        )
        .bind(external_session_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(order_from_row).transpose()
    }
}

/// Decode an order row, validating the stored status.
fn order_from_row(row: &PgRow) -> Result<Order, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status.parse::<OrderStatus>().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
    })?;

    let id: i64 = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Order {
        id: OrderId::new(id),
        external_session_id: row.try_get("external_session_id")?,
        customer_name: row.try_get("customer_name")?,
        address_line: row.try_get("address_line")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        postal_code: row.try_get("postal_code")?,
        country: row.try_get("country")?,
        status,
        created_at,
        updated_at,
    })
}
