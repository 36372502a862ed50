//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Dashboards (login required)
//! GET       /                          - Admin dashboard (any role)
//! GET       /user/                     - Customer's own orders (customer)
//! GET/POST  /account/                  - Customer profile settings (customer)
//! GET       /products/                 - Product catalogue (any role)
//!
//! # Customers and orders
//! GET       /customer/{id}/            - Customer detail + order filter (admin)
//! GET/POST  /create_order/{id}/        - Ten-row order formset (admin)
//! GET/POST  /update_order/{id}/        - Edit an order (any role)
//! GET/POST  /delete_order/{id}/        - Confirm and delete an order (any role)
//! GET/POST  /create_random_order/      - Order form for any customer (admin)
//!
//! # Auth
//! GET/POST  /register/                 - Sign up (anonymous only)
//! GET/POST  /login/                    - Log in (anonymous only)
//! GET/POST  /logout/                   - Log out
//!
//! # Password reset
//! GET/POST  /password_reset/           - Request a reset link
//! GET       /password_reset_sent/      - "Check your inbox"
//! GET/POST  /reset/{uidb64}/{token}/   - Choose a new password
//! GET       /password_reset_complete/  - Done
//!
//! # Operations
//! GET       /health                    - Liveness
//! GET       /health/ready              - Database readiness
//! ```

pub mod account;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod password_reset;
pub mod products;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::forms::customer::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Multipart overhead allowed on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the application's page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::home))
        .route("/user/", get(dashboard::user_page))
        .route(
            "/account/",
            get(account::settings_page)
                .post(account::update_settings)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES)),
        )
        .route("/products/", get(products::index))
        .route("/customer/{id}/", get(customers::show))
        .merge(order_routes())
        .merge(auth_routes())
        .merge(password_reset_routes())
        .merge(health_routes())
}

/// Order create/update/delete routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create_order/{id}/",
            get(orders::create_page).post(orders::create),
        )
        .route(
            "/update_order/{id}/",
            get(orders::update_page).post(orders::update),
        )
        .route(
            "/delete_order/{id}/",
            get(orders::delete_page).post(orders::delete),
        )
        .route(
            "/create_random_order/",
            get(orders::create_any_page).post(orders::create_any),
        )
}

/// Registration, login and logout.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", get(auth::register_page).post(auth::register))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout))
}

/// Emailed password reset flow.
pub fn password_reset_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/password_reset/",
            get(password_reset::request_page).post(password_reset::request),
        )
        .route("/password_reset_sent/", get(password_reset::sent_page))
        .route(
            "/reset/{uidb64}/{token}/",
            get(password_reset::confirm_page).post(password_reset::confirm),
        )
        .route(
            "/password_reset_complete/",
            get(password_reset::complete_page),
        )
}

/// Liveness and readiness probes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
