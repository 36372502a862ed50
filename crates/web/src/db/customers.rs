//! Customer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use order_desk_core::{CustomerId, Email, UserId};

use super::RepositoryError;
use crate::models::Customer;
use crate::models::customer::CustomerUpdate;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    user_id: UserId,
    name: String,
    phone: Option<String>,
    email: Option<Email>,
    profile_pic: String,
    date_created: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            profile_pic: row.profile_pic,
            date_created: row.date_created,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "id, user_id, name, phone, email, profile_pic, date_created";

/// Repository for customer profiles.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All customers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM crm.customer ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM crm.customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// The profile linked to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_id(&self, user_id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM crm.customer WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Save profile changes and return the updated customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn update(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            UPDATE crm.customer
            SET name = $2,
                phone = $3,
                email = $4,
                profile_pic = COALESCE($5, profile_pic)
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.phone.as_deref())
        .bind(update.email.as_ref())
        .bind(update.profile_pic.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::from).ok_or(RepositoryError::NotFound)
    }
}

/// Insert the customer profile for a freshly created user.
pub(crate) async fn insert_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
    name: &str,
    email: Option<&Email>,
) -> Result<Customer, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
        r"
        INSERT INTO crm.customer (user_id, name, email)
        VALUES ($1, $2, $3)
        RETURNING {CUSTOMER_COLUMNS}
        "
    ))
    .bind(user_id)
    .bind(name)
    .bind(email)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::conflict_or_database(e, "customer profile"))?;

    Ok(row.into())
}
