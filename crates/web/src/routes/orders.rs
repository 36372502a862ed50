//! Order create/update/delete handlers.
//!
//! Every successful write redirects to the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use order_desk_core::{CustomerId, OrderId, OrderStatus};

use crate::db::{CustomerRepository, OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{FormErrors, OrderForm, OrderFormSet};
use crate::middleware::{AdminOnly, Allowed, AnyRole};
use crate::models::{Customer, Order, Product};
use crate::page::Page;
use crate::state::AppState;

const DASHBOARD_PATH: &str = "/";

/// Formset page for entering several orders for one customer.
#[derive(Template, WebTemplate)]
#[template(path = "order_form.html")]
pub struct OrderFormSetTemplate {
    pub page: Page,
    pub customer: Customer,
    pub formset: OrderFormSet,
    pub products: Vec<Product>,
    pub statuses: &'static [OrderStatus],
}

/// Single order form, used for both editing and free-form creation.
#[derive(Template, WebTemplate)]
#[template(path = "update_form.html")]
pub struct OrderFormTemplate {
    pub page: Page,
    pub heading: &'static str,
    pub action: String,
    pub form: OrderForm,
    pub errors: FormErrors,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub statuses: &'static [OrderStatus],
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "delete.html")]
pub struct DeleteTemplate {
    pub page: Page,
    pub order: Order,
}

async fn load_customer(state: &AppState, id: CustomerId) -> Result<Customer> {
    CustomerRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))
}

async fn load_order(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Render the single order form with fresh choice lists.
async fn order_form_page(
    state: &AppState,
    page: Page,
    heading: &'static str,
    action: String,
    form: OrderForm,
    errors: FormErrors,
) -> Result<Response> {
    let customers = CustomerRepository::new(state.pool()).list_all().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(OrderFormTemplate {
        page,
        heading,
        action,
        form,
        errors,
        customers,
        products,
        statuses: &OrderStatus::ALL,
    }
    .into_response())
}

// =============================================================================
// Formset
// =============================================================================

/// Display ten blank order rows for a customer.
#[instrument(skip_all)]
pub async fn create_page(
    _user: Allowed<AdminOnly>,
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<CustomerId>,
) -> Result<impl IntoResponse> {
    let customer = load_customer(&state, id).await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(OrderFormSetTemplate {
        page,
        customer,
        formset: OrderFormSet::blank(),
        products,
        statuses: &OrderStatus::ALL,
    })
}

/// Create one order per complete row; blank or invalid rows are skipped.
#[instrument(skip_all)]
pub async fn create(
    _user: Allowed<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let customer = load_customer(&state, id).await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    let drafts = OrderFormSet::from_pairs(&pairs).valid_drafts(customer.id, &products);
    let orders = OrderRepository::new(state.pool());
    for draft in &drafts {
        orders.create(draft).await?;
    }
    tracing::info!(customer_id = %customer.id, created = drafts.len(), "orders created");

    Ok(Redirect::to(DASHBOARD_PATH))
}

// =============================================================================
// Single order
// =============================================================================

/// Display the order form prefilled from an existing order.
#[instrument(skip_all)]
pub async fn update_page(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = load_order(&state, id).await?;
    order_form_page(
        &state,
        page,
        "Update order",
        format!("/update_order/{id}/"),
        OrderForm::from_order(&order),
        FormErrors::default(),
    )
    .await
}

/// Save changes to an order, or show the form again with errors.
#[instrument(skip_all)]
pub async fn update(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let order = load_order(&state, id).await?;
    let customers = CustomerRepository::new(state.pool()).list_all().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    match form.validate(&customers, &products) {
        Ok(draft) => {
            OrderRepository::new(state.pool())
                .update(order.id, &draft)
                .await?;
            tracing::info!(order_id = %order.id, status = draft.status.value(), "order updated");
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        Err(errors) => Ok(OrderFormTemplate {
            page,
            heading: "Update order",
            action: format!("/update_order/{id}/"),
            form,
            errors,
            customers,
            products,
            statuses: &OrderStatus::ALL,
        }
        .into_response()),
    }
}

/// Display a blank order form for any customer.
#[instrument(skip_all)]
pub async fn create_any_page(
    _user: Allowed<AdminOnly>,
    State(state): State<AppState>,
    page: Page,
) -> Result<Response> {
    order_form_page(
        &state,
        page,
        "Create order",
        "/create_random_order/".to_string(),
        OrderForm::blank(),
        FormErrors::default(),
    )
    .await
}

/// Create a single order from the full form.
#[instrument(skip_all)]
pub async fn create_any(
    _user: Allowed<AdminOnly>,
    State(state): State<AppState>,
    page: Page,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let customers = CustomerRepository::new(state.pool()).list_all().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    match form.validate(&customers, &products) {
        Ok(draft) => {
            let order_id = OrderRepository::new(state.pool()).create(&draft).await?;
            tracing::info!(%order_id, customer_id = %draft.customer_id, "order created");
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        Err(errors) => Ok(OrderFormTemplate {
            page,
            heading: "Create order",
            action: "/create_random_order/".to_string(),
            form,
            errors,
            customers,
            products,
            statuses: &OrderStatus::ALL,
        }
        .into_response()),
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Ask for confirmation before deleting; nothing changes on GET.
#[instrument(skip_all)]
pub async fn delete_page(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = load_order(&state, id).await?;
    Ok(DeleteTemplate { page, order })
}

/// Delete the order after the confirmation form was posted.
#[instrument(skip_all)]
pub async fn delete(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let order = load_order(&state, id).await?;
    OrderRepository::new(state.pool()).delete(order.id).await?;
    tracing::info!(order_id = %order.id, "order deleted");

    Ok(Redirect::to(DASHBOARD_PATH))
}
