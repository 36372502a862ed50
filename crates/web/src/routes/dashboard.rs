//! Dashboard pages: the staff overview and the customer's own order list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{CustomerRepository, OrderRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{Allowed, AnyRole, CustomerOnly};
use crate::models::{Customer, Order, StatusCounts};
use crate::page::Page;
use crate::routes::account::current_customer;
use crate::state::AppState;

/// Number of orders shown in the dashboard's "last orders" table.
const RECENT_ORDERS: i64 = 5;

/// Staff dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub total_customers: usize,
    pub counts: StatusCounts,
}

/// Customer's own order page template.
#[derive(Template, WebTemplate)]
#[template(path = "user.html")]
pub struct UserTemplate {
    pub page: Page,
    pub customer: Customer,
    pub orders: Vec<Order>,
    pub counts: StatusCounts,
}

/// Display the dashboard: every customer, the latest orders and totals.
#[instrument(skip_all)]
pub async fn home(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    page: Page,
) -> Result<impl IntoResponse> {
    let customers = CustomerRepository::new(state.pool()).list_all().await?;
    let orders = OrderRepository::new(state.pool());
    let recent = orders.list_recent(RECENT_ORDERS).await?;
    let counts = orders.status_counts().await?;

    Ok(DashboardTemplate {
        page,
        total_customers: customers.len(),
        customers,
        orders: recent,
        counts,
    })
}

/// Display the logged-in customer's orders with per-status totals.
#[instrument(skip_all)]
pub async fn user_page(
    Allowed(user, ..): Allowed<CustomerOnly>,
    State(state): State<AppState>,
    page: Page,
) -> Result<impl IntoResponse> {
    let customer = current_customer(&state, &user).await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;
    let counts = StatusCounts::tally(&orders);

    Ok(UserTemplate {
        page,
        customer,
        orders,
        counts,
    })
}
