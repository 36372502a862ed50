//! Product catalogue repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use order_desk_core::{Price, ProductCategory, ProductId};

use super::RepositoryError;
use crate::models::Product;
use crate::models::product::NewProduct;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Price,
    category: ProductCategory,
    description: Option<String>,
    in_stock: bool,
    date_created: DateTime<Utc>,
    tags: Vec<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            description: row.description,
            in_stock: row.in_stock,
            date_created: row.date_created,
            tags: row.tags,
        }
    }
}

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.price, p.category, p.description, p.in_stock, p.date_created,
           COALESCE(
               ARRAY_AGG(t.name ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL),
               ARRAY[]::VARCHAR[]
           ) AS tags
    FROM crm.product p
    LEFT JOIN crm.product_tag pt ON pt.product_id = p.id
    LEFT JOIN crm.tag t ON t.id = pt.tag_id
";

/// Repository for products and their tags.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products with their tags, in catalogue order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} GROUP BY p.id ORDER BY p.id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM crm.product WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert a product unless one with the same name exists, attaching its tags.
    ///
    /// Returns `true` if the product was created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create_if_missing(&self, product: &NewProduct<'_>) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM crm.product WHERE name = $1")
                .bind(product.name)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let product_id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO crm.product (name, price, category, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product.name)
        .bind(product.price)
        .bind(product.category)
        .bind(product.description)
        .fetch_one(&mut *tx)
        .await?;

        for tag in product.tags {
            sqlx::query(
                r"
                WITH tag AS (
                    INSERT INTO crm.tag (name) VALUES ($2)
                    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                )
                INSERT INTO crm.product_tag (product_id, tag_id)
                SELECT $1, id FROM tag
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(product_id)
            .bind(*tag)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
