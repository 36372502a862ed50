//! Product catalogue page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Allowed, AnyRole};
use crate::models::Product;
use crate::page::Page;
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub page: Page,
    pub products: Vec<Product>,
}

/// Display every product with its tags.
#[instrument(skip_all)]
pub async fn index(
    _user: Allowed<AnyRole>,
    State(state): State<AppState>,
    page: Page,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(ProductsTemplate { page, products })
}
