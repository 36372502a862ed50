//! Demo data for a fresh database.

use sqlx::PgPool;

use order_desk_core::{Price, ProductCategory};
use order_desk_web::db::ProductRepository;
use order_desk_web::models::product::NewProduct;

use super::CliError;

/// The demo catalogue: name, price in cents, category, description, tags.
const DEMO_PRODUCTS: &[(&str, i64, ProductCategory, Option<&str>, &[&str])] = &[
    (
        "Ball",
        2_499,
        ProductCategory::OutDoor,
        Some("Regulation size football"),
        &["Sports"],
    ),
    (
        "BBQ Grill",
        18_000,
        ProductCategory::OutDoor,
        None,
        &["Kitchen", "Summer"],
    ),
    (
        "Yoga Mat",
        3_500,
        ProductCategory::Indoor,
        Some("Non-slip, 6 mm"),
        &["Sports"],
    ),
    (
        "Office Chair",
        12_999,
        ProductCategory::Indoor,
        Some("Adjustable height and lumbar support"),
        &["Office"],
    ),
    (
        "Desk Lamp",
        2_950,
        ProductCategory::Indoor,
        None,
        &["Office", "Lighting"],
    ),
    (
        "Garden Hose",
        4_200,
        ProductCategory::OutDoor,
        Some("15 m, with spray nozzle"),
        &["Garden", "Summer"],
    ),
];

/// Insert the demo products that are not in the catalogue yet.
///
/// # Errors
///
/// Returns an error if a database write fails.
pub async fn products(pool: &PgPool) -> Result<(), CliError> {
    let repo = ProductRepository::new(pool);
    let mut inserted = 0usize;

    for &(name, cents, category, description, tags) in DEMO_PRODUCTS {
        let product = NewProduct {
            name,
            price: Price::from_cents(cents),
            category,
            description,
            tags,
        };
        if repo.create_if_missing(&product).await? {
            inserted += 1;
        } else {
            tracing::debug!(name, "product already present");
        }
    }

    tracing::info!(
        inserted,
        skipped = DEMO_PRODUCTS.len() - inserted,
        "Seeded demo products"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_demo_products_have_unique_names() {
        let names: HashSet<_> = DEMO_PRODUCTS.iter().map(|p| p.0).collect();
        assert_eq!(names.len(), DEMO_PRODUCTS.len());
    }

    #[test]
    fn test_demo_prices_are_positive() {
        assert!(DEMO_PRODUCTS.iter().all(|p| p.1 > 0));
    }
}
