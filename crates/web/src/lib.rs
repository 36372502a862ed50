//! Order Desk web application library.
//!
//! The server binary and the router tests both build the application from
//! [`app`]; only the session store differs between them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod order_filter;
pub mod page;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Stylesheets and other assets shipped with the crate.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the application router: pages, health checks, static assets and
/// uploaded media.
///
/// The caller adds the session layer (pages read the session through it)
/// and the outer middleware stack.
pub fn app(state: AppState) -> Router {
    let media_dir = state.config().media_dir.clone();

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/media", ServeDir::new(media_dir))
        .with_state(state)
}
