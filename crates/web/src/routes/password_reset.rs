//! Password reset by emailed link.
//!
//! The request step always ends on the "sent" page, whether or not the
//! address belongs to anyone.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::forms::{FormErrors, PasswordResetRequestForm, SetPasswordForm};
use crate::middleware::RequireAnonymous;
use crate::page::Page;
use crate::services::{AuthError, PasswordResetService};
use crate::state::AppState;

const SENT_PATH: &str = "/password_reset_sent/";
const COMPLETE_PATH: &str = "/password_reset_complete/";

/// "Forgot password" form template.
#[derive(Template, WebTemplate)]
#[template(path = "password_reset.html")]
pub struct RequestTemplate {
    pub page: Page,
    pub form: PasswordResetRequestForm,
    pub errors: FormErrors,
}

#[derive(Template, WebTemplate)]
#[template(path = "password_reset_sent.html")]
pub struct SentTemplate {
    pub page: Page,
}

/// New password form, or the invalid-link notice when `valid_link` is false.
#[derive(Template, WebTemplate)]
#[template(path = "password_reset_confirm.html")]
pub struct ConfirmTemplate {
    pub page: Page,
    pub valid_link: bool,
    pub errors: FormErrors,
}

#[derive(Template, WebTemplate)]
#[template(path = "password_reset_complete.html")]
pub struct CompleteTemplate {
    pub page: Page,
}

fn service(state: &AppState) -> PasswordResetService<'_> {
    PasswordResetService::new(state.pool(), state.config(), state.email())
}

/// Display the email form.
#[instrument(skip_all)]
pub async fn request_page(_anonymous: RequireAnonymous, page: Page) -> impl IntoResponse {
    RequestTemplate {
        page,
        form: PasswordResetRequestForm::default(),
        errors: FormErrors::default(),
    }
}

/// Send reset links for the address, then show the "sent" page.
#[instrument(skip_all)]
pub async fn request(
    _anonymous: RequireAnonymous,
    State(state): State<AppState>,
    page: Page,
    Form(form): Form<PasswordResetRequestForm>,
) -> Result<Response> {
    let email = match form.validate() {
        Ok(email) => email,
        Err(errors) => return Ok(RequestTemplate { page, form, errors }.into_response()),
    };

    let sent = service(&state).request(&email).await?;
    tracing::info!(links = sent, "password reset requested");

    Ok(Redirect::to(SENT_PATH).into_response())
}

#[instrument(skip_all)]
pub async fn sent_page(page: Page) -> impl IntoResponse {
    SentTemplate { page }
}

/// Display the new-password form if the link checks out.
#[instrument(skip_all)]
pub async fn confirm_page(
    State(state): State<AppState>,
    page: Page,
    Path((uidb64, token)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let valid_link = match service(&state).verify(&uidb64, &token).await {
        Ok(_) => true,
        Err(AuthError::InvalidResetLink) => false,
        Err(e) => return Err(e.into()),
    };

    Ok(ConfirmTemplate {
        page,
        valid_link,
        errors: FormErrors::default(),
    })
}

/// Set the new password and burn the link.
#[instrument(skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    page: Page,
    Path((uidb64, token)): Path<(String, String)>,
    Form(form): Form<SetPasswordForm>,
) -> Result<Response> {
    let service = service(&state);
    let target = match service.verify(&uidb64, &token).await {
        Ok(target) => target,
        Err(AuthError::InvalidResetLink) => {
            return Ok(ConfirmTemplate {
                page,
                valid_link: false,
                errors: FormErrors::default(),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let password = match form.validate(&target.user.username) {
        Ok(password) => password,
        Err(errors) => {
            return Ok(ConfirmTemplate {
                page,
                valid_link: true,
                errors,
            }
            .into_response());
        }
    };

    match service.complete(&target, &password).await {
        Ok(()) => Ok(Redirect::to(COMPLETE_PATH).into_response()),
        // Used up by a concurrent submission.
        Err(AuthError::InvalidResetLink) => Ok(ConfirmTemplate {
            page,
            valid_link: false,
            errors: FormErrors::default(),
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip_all)]
pub async fn complete_page(page: Page) -> impl IntoResponse {
    CompleteTemplate { page }
}
