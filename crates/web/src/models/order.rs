//! Order types.

use chrono::{DateTime, NaiveDate, Utc};

use order_desk_core::{CustomerId, OrderId, OrderStatus, ProductId};

/// An order, joined with the names needed to display it.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl Order {
    /// Calendar date (UTC) the order was placed on.
    #[must_use]
    pub fn date_created_day(&self) -> NaiveDate {
        self.date_created.date_naive()
    }

    /// Creation date for display, e.g. `Mar 5, 2024`.
    #[must_use]
    pub fn date_display(&self) -> String {
        self.date_created.format("%b %-d, %Y").to_string()
    }

    #[must_use]
    pub fn note_display(&self) -> &str {
        self.note.as_deref().unwrap_or_default()
    }
}

/// Fields written when creating or updating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// Order totals shown on the dashboard and the customer page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub delivered: usize,
    pub pending: usize,
    pub shipped: usize,
}

impl StatusCounts {
    /// Tally a set of orders.
    #[must_use]
    pub fn tally<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut counts, order| {
            counts.total += 1;
            match order.status {
                OrderStatus::Delivered => counts.delivered += 1,
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Shipped => counts.shipped += 1,
                OrderStatus::OutForDelivery => {}
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i32, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            customer_id: CustomerId::new(1),
            customer_name: "Ada".to_string(),
            product_id: ProductId::new(1),
            product_name: "Ball".to_string(),
            status,
            note: None,
            date_created: Utc::now(),
        }
    }

    #[test]
    fn test_tally_counts_each_status() {
        let orders = vec![
            order(1, OrderStatus::Delivered),
            order(2, OrderStatus::Pending),
            order(3, OrderStatus::Pending),
            order(4, OrderStatus::OutForDelivery),
        ];

        let counts = StatusCounts::tally(&orders);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.delivered, 1);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.shipped, 0);
    }
}
