//! Authentication and role extractors.
//!
//! Handlers declare who may reach them through their argument types:
//!
//! - [`RequireAuth`] - any logged-in user
//! - [`Allowed<R>`] - logged-in user holding at least one role of the set `R`
//! - [`RequireAnonymous`] - only visitors who are not logged in
//!
//! Unauthenticated requests are redirected to the login page.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use order_desk_core::Role;

use crate::models::CurrentUser;
use crate::models::session::keys;

/// Body of the response for users lacking the required role.
pub const FORBIDDEN_MESSAGE: &str = "You are not authorized to view this page";

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login/";

/// Where authenticated users are sent from login/registration pages.
pub const ACCOUNT_PATH: &str = "/account/";

/// Error returned when a request does not satisfy an access extractor.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in.
    RedirectToLogin,
    /// Logged in but belongs elsewhere (a logged-in user on the login page).
    Redirect(&'static str),
    /// Logged in without any of the required roles.
    Forbidden,
    /// The session layer is not installed.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Redirect(path) => Redirect::to(path).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    Ok(session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten())
}

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await.ok().flatten()))
    }
}

/// A fixed set of roles that may access a route.
pub trait RoleSet: Send + Sync + 'static {
    /// Roles admitted; membership in any one suffices.
    const ROLES: &'static [Role];
}

/// Customers and admins.
pub struct AnyRole;

impl RoleSet for AnyRole {
    const ROLES: &'static [Role] = &[Role::Customer, Role::Admin];
}

/// Customers only.
pub struct CustomerOnly;

impl RoleSet for CustomerOnly {
    const ROLES: &'static [Role] = &[Role::Customer];
}

/// Admins only.
pub struct AdminOnly;

impl RoleSet for AdminOnly {
    const ROLES: &'static [Role] = &[Role::Admin];
}

/// Extractor that requires a logged-in user holding one of the roles in `R`.
///
/// Users without a matching role get `403` with [`FORBIDDEN_MESSAGE`].
///
/// # Example
///
/// ```rust,ignore
/// async fn customer_detail(Allowed(user, ..): Allowed<AdminOnly>) -> impl IntoResponse {
///     format!("Welcome back, {}", user.username)
/// }
/// ```
pub struct Allowed<R: RoleSet>(pub CurrentUser, pub PhantomData<R>);

impl<R: RoleSet> Allowed<R> {
    /// The authenticated user.
    #[must_use]
    pub fn into_user(self) -> CurrentUser {
        self.0
    }
}

impl<S, R> FromRequestParts<S> for Allowed<R>
where
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.has_any_role(R::ROLES) {
            tracing::debug!(user_id = %user.id, path = %parts.uri.path(), "role check failed");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user, PhantomData))
    }
}

/// Extractor for pages only anonymous visitors should see (login, register).
///
/// Logged-in users are redirected to their account page.
pub struct RequireAnonymous;

impl<S> FromRequestParts<S> for RequireAnonymous
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts).await? {
            Some(_) => Err(AuthRejection::Redirect(ACCOUNT_PATH)),
            None => Ok(Self),
        }
    }
}

/// Store the logged-in user, rotating the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Log out: drop all session data and the session record.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_rejection_has_message() {
        let response = AuthRejection::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_login_rejection_redirects() {
        let response = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").map(|v| v.to_str().ok()),
            Some(Some(LOGIN_PATH))
        );
    }

    #[test]
    fn test_role_sets() {
        assert!(AnyRole::ROLES.contains(&Role::Customer));
        assert!(AnyRole::ROLES.contains(&Role::Admin));
        assert_eq!(CustomerOnly::ROLES, &[Role::Customer]);
        assert_eq!(AdminOnly::ROLES, &[Role::Admin]);
    }
}
