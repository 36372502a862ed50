//! Registration, login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::user::USERNAME_TAKEN;
use crate::forms::{CreateUserForm, FormErrors, LoginForm};
use crate::middleware::auth::{ACCOUNT_PATH, LOGIN_PATH};
use crate::middleware::flash::{self, FlashLevel};
use crate::middleware::{RequireAnonymous, clear_current_user, set_current_user};
use crate::page::Page;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Shown (as a flash message) for any failed login.
pub const LOGIN_FAILED: &str = "username or password is incorrect!";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: Page,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub form: CreateUserForm,
    pub errors: FormErrors,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(_anonymous: RequireAnonymous, page: Page) -> impl IntoResponse {
    LoginTemplate { page }
}

/// Check credentials and start a session.
#[instrument(skip_all)]
pub async fn login(
    _anonymous: RequireAnonymous,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .login(form.username.trim(), &form.password)
        .await
    {
        Ok(user) => {
            set_current_user(&session, &user).await?;
            set_sentry_user(&user.id, &user.username);
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to(ACCOUNT_PATH))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("login failed");
            flash::push(&session, FlashLevel::Info, LOGIN_FAILED).await?;
            Ok(Redirect::to(LOGIN_PATH))
        }
        Err(e) => Err(e.into()),
    }
}

/// Drop the session and return to the login page.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration form.
#[instrument(skip_all)]
pub async fn register_page(_anonymous: RequireAnonymous, page: Page) -> impl IntoResponse {
    RegisterTemplate {
        page,
        form: CreateUserForm::default(),
        errors: FormErrors::default(),
    }
}

/// Create the user (and their customer profile), then send them to log in.
#[instrument(skip_all)]
pub async fn register(
    _anonymous: RequireAnonymous,
    State(state): State<AppState>,
    session: Session,
    page: Page,
    Form(form): Form<CreateUserForm>,
) -> Result<Response> {
    let mut outcome = form.validate();

    let username = form.username.trim();
    if !username.is_empty()
        && UserRepository::new(state.pool())
            .username_exists(username)
            .await?
    {
        let mut errors = outcome.err().unwrap_or_default();
        errors.add("username", USERNAME_TAKEN);
        outcome = Err(errors);
    }

    let registration = match outcome {
        Ok(registration) => registration,
        Err(errors) => return Ok(register_form(page, form, errors)),
    };

    match AuthService::new(state.pool()).register(&registration).await {
        Ok((user, _customer)) => {
            flash::push(
                &session,
                FlashLevel::Success,
                format!("Account was created for {}.", user.username),
            )
            .await?;
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(AuthError::UserAlreadyExists) => {
            let mut errors = FormErrors::default();
            errors.add("username", USERNAME_TAKEN);
            Ok(register_form(page, form, errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// Re-render the registration form without echoing the passwords.
fn register_form(page: Page, form: CreateUserForm, errors: FormErrors) -> Response {
    RegisterTemplate {
        page,
        form: CreateUserForm {
            password1: String::new(),
            password2: String::new(),
            ..form
        },
        errors,
    }
    .into_response()
}
