//! Order forms: the full single-order form and the per-customer formset.

use serde::Deserialize;

use order_desk_core::{CustomerId, OrderStatus, ProductId};

use super::{FormErrors, INVALID_CHOICE, REQUIRED, non_blank, too_long};
use crate::models::order::OrderDraft;
use crate::models::{Customer, Order, Product};

pub const NOTE_MAX_LENGTH: usize = 1000;

/// Number of rows offered by the create-order formset.
pub const FORMSET_ROWS: usize = 10;

/// Single order form (customer, product, status, note).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub customer: String,
    pub product: String,
    pub status: String,
    pub note: String,
}

impl OrderForm {
    /// A blank form with the default status selected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            status: OrderStatus::default().value().to_string(),
            ..Self::default()
        }
    }

    /// Prefill from an existing order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            customer: order.customer_id.to_string(),
            product: order.product_id.to_string(),
            status: order.status.value().to_string(),
            note: order.note.clone().unwrap_or_default(),
        }
    }

    /// Validate against the customers and products that currently exist.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(
        &self,
        customers: &[Customer],
        products: &[Product],
    ) -> Result<OrderDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let customer_id = choice(&self.customer, |id: CustomerId| {
            customers.iter().any(|c| c.id == id)
        })
        .map_err(|message| errors.add("customer", message))
        .ok();

        let product_id = choice(&self.product, |id: ProductId| {
            products.iter().any(|p| p.id == id)
        })
        .map_err(|message| errors.add("product", message))
        .ok();

        let status = choice(&self.status, |_: OrderStatus| true)
            .map_err(|message| errors.add("status", message))
            .ok();

        let note_length = self.note.chars().count();
        if note_length > NOTE_MAX_LENGTH {
            errors.add("note", too_long(NOTE_MAX_LENGTH, note_length));
        }

        match (customer_id, product_id, status) {
            (Some(customer_id), Some(product_id), Some(status)) if errors.is_empty() => {
                Ok(OrderDraft {
                    customer_id,
                    product_id,
                    status,
                    note: non_blank(&self.note).map(String::from),
                })
            }
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn is_customer(&self, id: &CustomerId) -> bool {
        self.customer == id.to_string()
    }

    #[must_use]
    pub fn is_product(&self, id: &ProductId) -> bool {
        self.product == id.to_string()
    }

    #[must_use]
    pub fn is_status(&self, status: &OrderStatus) -> bool {
        self.status == status.value()
    }
}

/// Parse a required select value that must be one of the offered choices.
fn choice<T: std::str::FromStr>(raw: &str, offered: impl Fn(T) -> bool) -> Result<T, &'static str>
where
    T: Copy,
{
    let raw = non_blank(raw).ok_or(REQUIRED)?;
    raw.parse::<T>()
        .ok()
        .filter(|value| offered(*value))
        .ok_or(INVALID_CHOICE)
}

/// One row of the create-order formset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRowForm {
    pub product: String,
    pub status: String,
}

impl OrderRowForm {
    #[must_use]
    pub fn is_product(&self, id: &ProductId) -> bool {
        self.product == id.to_string()
    }

    #[must_use]
    pub fn is_status(&self, status: &OrderStatus) -> bool {
        self.status == status.value()
    }
}

/// Multi-row order entry bound to one customer.
///
/// Fields are named `form-{i}-product` and `form-{i}-status`. Rows that are
/// blank or fail validation are dropped; the rest become one order each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFormSet {
    pub rows: Vec<OrderRowForm>,
}

impl OrderFormSet {
    /// Ten blank rows with the default status preselected.
    #[must_use]
    pub fn blank() -> Self {
        let row = OrderRowForm {
            product: String::new(),
            status: OrderStatus::default().value().to_string(),
        };
        Self {
            rows: vec![row; FORMSET_ROWS],
        }
    }

    /// Bind submitted form pairs.
    ///
    /// `form-TOTAL_FORMS` limits how many rows are read, capped at
    /// [`FORMSET_ROWS`]; unknown keys are ignored.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let total = pairs
            .iter()
            .find(|(key, _)| key == "form-TOTAL_FORMS")
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .map_or(FORMSET_ROWS, |n| n.min(FORMSET_ROWS));

        let mut rows = vec![OrderRowForm::default(); total];
        for (key, value) in pairs {
            let Some((index, field)) = parse_row_key(key) else {
                continue;
            };
            let Some(row) = rows.get_mut(index) else {
                continue;
            };
            match field {
                "product" => row.product.clone_from(value),
                "status" => row.status.clone_from(value),
                _ => {}
            }
        }

        Self { rows }
    }

    /// Orders for every complete, valid row, in row order.
    #[must_use]
    pub fn valid_drafts(&self, customer_id: CustomerId, products: &[Product]) -> Vec<OrderDraft> {
        self.rows
            .iter()
            .filter_map(|row| {
                let product_id = choice(&row.product, |id: ProductId| {
                    products.iter().any(|p| p.id == id)
                })
                .ok()?;
                let status = choice(&row.status, |_: OrderStatus| true).ok()?;
                Some(OrderDraft {
                    customer_id,
                    product_id,
                    status,
                    note: None,
                })
            })
            .collect()
    }
}

/// Split `form-3-product` into `(3, "product")`.
fn parse_row_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("form-")?;
    let (index, field) = rest.split_once('-')?;
    Some((index.parse().ok()?, field))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use order_desk_core::{Price, ProductCategory, UserId};

    use super::*;

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_cents(999),
            category: ProductCategory::Indoor,
            description: None,
            in_stock: true,
            date_created: Utc::now(),
            tags: Vec::new(),
        }
    }

    fn customer(id: i32) -> Customer {
        Customer {
            id: CustomerId::new(id),
            user_id: UserId::new(id),
            name: format!("Customer {id}"),
            phone: None,
            email: None,
            profile_pic: "profile1.png".to_string(),
            date_created: Utc::now(),
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_order_form_valid() {
        let form = OrderForm {
            customer: "1".to_string(),
            product: "2".to_string(),
            status: "Out for delivery".to_string(),
            note: "  leave at door ".to_string(),
        };

        let draft = form.validate(&[customer(1)], &[product(2)]).unwrap();
        assert_eq!(draft.customer_id, CustomerId::new(1));
        assert_eq!(draft.product_id, ProductId::new(2));
        assert_eq!(draft.status, OrderStatus::OutForDelivery);
        assert_eq!(draft.note.as_deref(), Some("leave at door"));
    }

    #[test]
    fn test_order_form_errors() {
        let form = OrderForm {
            customer: String::new(),
            product: "99".to_string(),
            status: "lost".to_string(),
            note: "x".repeat(NOTE_MAX_LENGTH + 1),
        };

        let errors = form.validate(&[customer(1)], &[product(2)]).unwrap_err();
        assert_eq!(errors.field("customer"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("product"), [INVALID_CHOICE.to_string()]);
        assert_eq!(errors.field("status"), [INVALID_CHOICE.to_string()]);
        assert!(errors.has("note"));
    }

    #[test]
    fn test_formset_drops_blank_and_invalid_rows() {
        let formset = OrderFormSet::from_pairs(&pairs(&[
            ("form-TOTAL_FORMS", "10"),
            ("form-0-product", "1"),
            ("form-0-status", "pending"),
            ("form-1-product", ""),
            ("form-1-status", "pending"),
            ("form-2-product", "42"),
            ("form-2-status", "shipped"),
            ("form-3-product", "2"),
            ("form-3-status", "delivered"),
            ("form-4-product", "1"),
            ("form-4-status", ""),
            ("csrfmiddlewaretoken", "ignored"),
        ]));

        let drafts = formset.valid_drafts(CustomerId::new(7), &[product(1), product(2)]);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].product_id, ProductId::new(1));
        assert_eq!(drafts[1].status, OrderStatus::Delivered);
        assert!(drafts.iter().all(|d| d.customer_id == CustomerId::new(7)));
    }

    #[test]
    fn test_formset_row_count_is_capped() {
        let formset = OrderFormSet::from_pairs(&pairs(&[
            ("form-TOTAL_FORMS", "500"),
            ("form-11-product", "1"),
            ("form-11-status", "pending"),
        ]));
        assert_eq!(formset.rows.len(), FORMSET_ROWS);
        assert!(formset.valid_drafts(CustomerId::new(1), &[product(1)]).is_empty());

        assert_eq!(OrderFormSet::blank().rows.len(), FORMSET_ROWS);
    }
}
