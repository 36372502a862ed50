//! Product catalogue types.

use chrono::{DateTime, Utc};

use order_desk_core::{Price, ProductCategory, ProductId};

/// A product that can be ordered.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub in_stock: bool,
    pub date_created: DateTime<Utc>,
    /// Tag names, alphabetical.
    pub tags: Vec<String>,
}

impl Product {
    #[must_use]
    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// A new catalogue entry (used by seeding).
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub price: Price,
    pub category: ProductCategory,
    pub description: Option<&'a str>,
    pub tags: &'a [&'a str],
}
