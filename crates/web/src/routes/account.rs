//! Account settings: the logged-in customer's own profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{CustomerForm, FormErrors};
use crate::middleware::{Allowed, CustomerOnly};
use crate::models::{CurrentUser, Customer};
use crate::page::Page;
use crate::services::media::{remove_profile_image, store_profile_image};
use crate::state::AppState;

/// Account settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "account_settings.html")]
pub struct SettingsTemplate {
    pub page: Page,
    pub customer: Customer,
    pub form: CustomerForm,
    pub errors: FormErrors,
    pub saved: bool,
}

/// Load the customer profile belonging to the logged-in user.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user has no profile.
pub(crate) async fn current_customer(state: &AppState, user: &CurrentUser) -> Result<Customer> {
    let customers = CustomerRepository::new(state.pool());
    let customer = match user.customer_id {
        Some(id) => customers.get_by_id(id).await?,
        None => customers.get_by_user_id(user.id).await?,
    };
    customer.ok_or_else(|| AppError::NotFound(format!("customer profile for user {}", user.id)))
}

/// Display the settings form prefilled from the stored profile.
#[instrument(skip_all)]
pub async fn settings_page(
    Allowed(user, ..): Allowed<CustomerOnly>,
    State(state): State<AppState>,
    page: Page,
) -> Result<impl IntoResponse> {
    let customer = current_customer(&state, &user).await?;

    Ok(SettingsTemplate {
        page,
        form: CustomerForm::from_customer(&customer),
        customer,
        errors: FormErrors::default(),
        saved: false,
    })
}

/// Save the profile (and any uploaded picture), then show the form again.
#[instrument(skip_all)]
pub async fn update_settings(
    Allowed(user, ..): Allowed<CustomerOnly>,
    State(state): State<AppState>,
    page: Page,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let customer = current_customer(&state, &user).await?;
    let form = CustomerForm::from_multipart(multipart).await?;

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(SettingsTemplate {
                page,
                customer,
                form,
                errors,
                saved: false,
            });
        }
    };

    let media_dir = &state.config().media_dir;
    let stored_pic = match &valid.image {
        Some((image, extension)) => Some(store_profile_image(media_dir, image, extension).await?),
        None => None,
    };

    let previous_pic = customer.profile_pic;
    let updated = CustomerRepository::new(state.pool())
        .update(customer.id, &valid.into_update(stored_pic.clone()))
        .await;

    let customer = match (updated, stored_pic) {
        (Ok(customer), Some(_)) => {
            remove_profile_image(media_dir, &previous_pic).await;
            customer
        }
        (Ok(customer), None) => customer,
        (Err(e), Some(new_pic)) => {
            remove_profile_image(media_dir, &new_pic).await;
            return Err(e.into());
        }
        (Err(e), None) => return Err(e.into()),
    };
    tracing::info!(customer_id = %customer.id, "profile updated");

    Ok(SettingsTemplate {
        page,
        form: CustomerForm::from_customer(&customer),
        customer,
        errors: FormErrors::default(),
        saved: true,
    })
}
