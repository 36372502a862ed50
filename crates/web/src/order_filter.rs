//! Filtering a customer's orders from query-string parameters.
//!
//! Recognised parameters are `start_date` and `end_date` (inclusive,
//! `YYYY-MM-DD`, compared against the order's creation date), `product`
//! (product id) and `status`. Anything blank, unparseable or unknown is
//! ignored, and the input order of the orders is preserved.

use chrono::NaiveDate;

use order_desk_core::{OrderStatus, ProductId};

use crate::models::Order;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw filter values as submitted, echoed back into the filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilterParams {
    pub start_date: String,
    pub end_date: String,
    pub product: String,
    pub status: String,
}

impl OrderFilterParams {
    /// Bind from query pairs; the first occurrence of a key wins.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_default()
        };

        Self {
            start_date: first("start_date"),
            end_date: first("end_date"),
            product: first("product"),
            status: first("status"),
        }
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

/// Parsed filter; `None` criteria match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product: Option<ProductId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub fn from_params(params: &OrderFilterParams) -> Self {
        Self {
            start_date: parse_date(&params.start_date),
            end_date: parse_date(&params.end_date),
            product: params.product.parse().ok(),
            status: params.status.parse().ok(),
        }
    }

    /// Whether a single order passes every active criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        let day = order.date_created_day();
        self.start_date.is_none_or(|start| day >= start)
            && self.end_date.is_none_or(|end| day <= end)
            && self.product.is_none_or(|product| order.product_id == product)
            && self.status.is_none_or(|status| order.status == status)
    }

    /// Keep the matching orders, preserving their order.
    #[must_use]
    pub fn apply(&self, mut orders: Vec<Order>) -> Vec<Order> {
        orders.retain(|order| self.matches(order));
        orders
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
