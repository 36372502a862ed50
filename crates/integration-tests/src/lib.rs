//! Integration tests for Order Desk.
//!
//! Every test gets a fresh database from `#[sqlx::test]` with the web
//! crate's migrations applied, and drives the real router in-process.
//!
//! # Running Tests
//!
//! ```bash
//! export DATABASE_URL=postgres://localhost/order_desk
//! cargo test -p order-desk-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use url::Url;

use order_desk_core::{Price, ProductCategory, ProductId, Role};
use order_desk_web::config::AppConfig;
use order_desk_web::db::{ProductRepository, RoleGroupRepository};
use order_desk_web::forms::user::Registration;
use order_desk_web::middleware::session::configure;
use order_desk_web::models::product::NewProduct;
use order_desk_web::models::{Customer, User};
use order_desk_web::services::AuthService;
use order_desk_web::state::AppState;

/// Password that satisfies every signup rule.
pub const PASSWORD: &str = "correct-horse-battery";

/// Configuration pointing at nothing external.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 8000,
        base_url: Url::parse("http://localhost:8000/").unwrap(),
        session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6k"),
        media_dir: std::env::temp_dir().join("order-desk-test-media"),
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The application router over a test database, with in-memory sessions.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let state = AppState::new(test_config(), pool).unwrap();
        let router = order_desk_web::app(state).layer(configure(
            SessionManagerLayer::new(MemoryStore::default()),
            false,
        ));
        Self { router }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> Response {
        self.post(uri, cookie, "application/x-www-form-urlencoded", form.to_owned())
            .await
    }

    /// POST text fields as `multipart/form-data`.
    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        self.post_upload(uri, cookie, fields, None).await
    }

    /// POST text fields plus an optional file part `(field, file name, bytes)`.
    pub async fn post_upload(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response {
        const BOUNDARY: &str = "order-desk-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.post(
            uri,
            cookie,
            &format!("multipart/form-data; boundary={BOUNDARY}"),
            body,
        )
        .await
    }

    async fn post(
        &self,
        uri: &str,
        cookie: Option<&str>,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(body.into()).unwrap()).await
    }

    /// Log in through the form and return the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login/",
                None,
                &format!("username={username}&password={password}"),
            )
            .await;
        assert_eq!(location(&response), "/account/", "login failed for {username}");
        session_cookie(&response).expect("login did not set a session cookie")
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// `name=value` of the session cookie set by a response, if any.
#[must_use]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("od_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Create both role groups, as `od-cli groups init` does.
pub async fn init_groups(pool: &PgPool) {
    let groups = RoleGroupRepository::new(pool);
    groups.ensure(Role::Customer).await.unwrap();
    groups.ensure(Role::Admin).await.unwrap();
}

/// Register a user through the normal path and grant any extra roles.
pub async fn create_user(pool: &PgPool, username: &str, extra_roles: &[Role]) -> (User, Customer) {
    let registration = Registration {
        username: username.to_owned(),
        email: None,
        password: PASSWORD.to_owned(),
    };
    let (user, customer) = AuthService::new(pool)
        .register(&registration)
        .await
        .unwrap();

    let groups = RoleGroupRepository::new(pool);
    for role in extra_roles {
        groups.grant(user.id, *role).await.unwrap();
    }
    (user, customer)
}

/// Insert a product and return its id.
pub async fn create_product(pool: &PgPool, name: &str) -> ProductId {
    let product = NewProduct {
        name,
        price: Price::from_cents(1_000),
        category: ProductCategory::Indoor,
        description: None,
        tags: &[],
    };
    ProductRepository::new(pool)
        .create_if_missing(&product)
        .await
        .unwrap();

    sqlx::query_scalar("SELECT id FROM crm.product WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Count rows in a `crm` table.
pub async fn count(pool: &PgPool, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM crm.{table}");
    sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Log lines written while a [`capture_logs`] guard is alive.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// How many captured lines contain `message`.
    #[must_use]
    pub fn count(&self, message: &str) -> usize {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(message))
            .count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Send this thread's `info` events to a [`LogCapture`] until the guard drops.
///
/// `#[sqlx::test]` runs on a current-thread runtime, so the whole request is
/// captured.
#[must_use]
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}
