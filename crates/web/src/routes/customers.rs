//! Customer detail page with the order filter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use order_desk_core::{CustomerId, OrderStatus};

use crate::db::{CustomerRepository, OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AdminOnly, Allowed};
use crate::models::{Customer, Order, Product};
use crate::order_filter::{OrderFilter, OrderFilterParams};
use crate::page::Page;
use crate::state::AppState;

/// Customer detail template.
#[derive(Template, WebTemplate)]
#[template(path = "customer.html")]
pub struct CustomerTemplate {
    pub page: Page,
    pub customer: Customer,
    /// All of the customer's orders, before filtering.
    pub order_count: usize,
    pub orders: Vec<Order>,
    pub params: OrderFilterParams,
    pub products: Vec<Product>,
    pub statuses: &'static [OrderStatus],
}

/// Display one customer and their orders, narrowed by the query string.
#[instrument(skip_all)]
pub async fn show(
    _user: Allowed<AdminOnly>,
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<CustomerId>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let customer = CustomerRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))?;

    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;
    let order_count = orders.len();

    let params = OrderFilterParams::from_pairs(&query);
    let orders = OrderFilter::from_params(&params).apply(orders);
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(CustomerTemplate {
        page,
        customer,
        order_count,
        orders,
        params,
        products,
        statuses: &OrderStatus::ALL,
    })
}
