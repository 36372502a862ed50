//! In-process router tests.
//!
//! The database pool connects lazily and none of these requests reach it:
//! each is decided by the access extractors or needs no data.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionManagerLayer, SessionStore};
use url::Url;

use order_desk_core::{CustomerId, Role, UserId};
use order_desk_web::config::AppConfig;
use order_desk_web::middleware::session::{SESSION_COOKIE_NAME, configure};
use order_desk_web::models::CurrentUser;
use order_desk_web::models::session::keys;
use order_desk_web::state::AppState;

struct TestApp {
    router: Router,
    store: MemoryStore,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/order_desk_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: Url::parse("http://localhost:8000/").unwrap(),
            session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6k"),
            media_dir: PathBuf::from("media"),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/order_desk_test")
            .unwrap();
        let state = AppState::new(config, pool).unwrap();

        let store = MemoryStore::default();
        let router = order_desk_web::app(state)
            .layer(configure(SessionManagerLayer::new(store.clone()), false));

        Self { router, store }
    }

    /// Store a logged-in session and return its cookie header value.
    async fn login_as(&self, roles: Vec<Role>) -> String {
        let user = CurrentUser {
            id: UserId::new(7),
            username: "ada".to_string(),
            roles,
            customer_id: Some(CustomerId::new(3)),
        };
        let record = Record {
            id: Id::default(),
            data: HashMap::from([(
                keys::CURRENT_USER.to_string(),
                serde_json::to_value(&user).unwrap(),
            )]),
            expiry_date: OffsetDateTime::now_utc() + Duration::hours(1),
        };
        self.store.save(&record).await.unwrap();

        format!("{SESSION_COOKIE_NAME}={}", record.id)
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post(&self, uri: &str, cookie: Option<&str>, form: &str) -> axum::response::Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(form.to_owned())).unwrap())
            .await
            .unwrap()
    }
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn role_gated_pages_redirect_anonymous_visitors_to_login() {
    let app = TestApp::new();

    for uri in [
        "/",
        "/user/",
        "/account/",
        "/products/",
        "/customer/1/",
        "/create_order/1/",
        "/update_order/1/",
        "/delete_order/1/",
        "/create_random_order/",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login/", "{uri}");
    }
}

#[tokio::test]
async fn anonymous_delete_post_redirects_to_login() {
    let app = TestApp::new();
    let response = app.post("/delete_order/1/", None, "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn customer_cannot_open_customer_detail() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Customer]).await;

    let response = app.get("/customer/1/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_text(response).await,
        "You are not authorized to view this page"
    );
}

#[tokio::test]
async fn customer_cannot_open_order_formset() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Customer]).await;

    let response = app.get("/create_order/1/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_cannot_create_order_for_any_customer() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Customer]).await;

    let response = app.get("/create_random_order/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post(
            "/create_random_order/",
            Some(&cookie),
            "customer=1&product=1&status=pending",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_text(response).await,
        "You are not authorized to view this page"
    );
}

#[tokio::test]
async fn admin_without_customer_role_cannot_open_user_page() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Admin]).await;

    let response = app.get("/user/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logged_in_users_are_sent_away_from_login_and_register() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Customer]).await;

    for uri in ["/login/", "/register/", "/password_reset/"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/account/", "{uri}");
    }
}

#[tokio::test]
async fn login_page_renders_for_anonymous_visitors() {
    let app = TestApp::new();
    let response = app.get("/login/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"username\""));
    assert!(body.contains("/password_reset/"));
}

#[tokio::test]
async fn register_page_renders_empty_form() {
    let app = TestApp::new();
    let response = app.get("/register/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"password1\""));
    assert!(body.contains("name=\"password2\""));
}

#[tokio::test]
async fn malformed_reset_link_shows_invalid_page() {
    let app = TestApp::new();
    let response = app.get("/reset/!!/not-a-token/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Link invalid"));
}

#[tokio::test]
async fn invalid_reset_request_rerenders_with_error() {
    let app = TestApp::new();
    let response = app.post("/password_reset/", None, "email=nope").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Enter a valid email address.")
    );
}

#[tokio::test]
async fn logout_redirects_to_login() {
    let app = TestApp::new();
    let cookie = app.login_as(vec![Role::Customer]).await;

    let response = app.get("/logout/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/");
}
