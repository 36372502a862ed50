//! Order pages against a real database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::NaiveDate;
use sqlx::PgPool;

use order_desk_core::{CustomerId, OrderId, OrderStatus, ProductId, Role};
use order_desk_integration_tests::{
    PASSWORD, TestApp, body_text, count, create_product, create_user, init_groups, location,
};
use order_desk_web::db::OrderRepository;
use order_desk_web::models::order::OrderDraft;
use order_desk_web::order_filter::{OrderFilter, OrderFilterParams};

struct Fixture {
    app: TestApp,
    admin_cookie: String,
    bob: CustomerId,
    product: ProductId,
}

async fn setup(pool: &PgPool) -> Fixture {
    init_groups(pool).await;
    create_user(pool, "admin", &[Role::Admin]).await;
    let (_, bob) = create_user(pool, "bob", &[]).await;
    let product = create_product(pool, "Ball").await;

    let app = TestApp::new(pool.clone());
    let admin_cookie = app.login("admin", PASSWORD).await;

    Fixture {
        app,
        admin_cookie,
        bob: bob.id,
        product,
    }
}

async fn place_order(pool: &PgPool, customer_id: CustomerId, product_id: ProductId) -> OrderId {
    OrderRepository::new(pool)
        .create(&OrderDraft {
            customer_id,
            product_id,
            status: OrderStatus::Pending,
            note: None,
        })
        .await
        .unwrap()
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn delete_needs_a_posted_confirmation(pool: PgPool) {
    let fx = setup(&pool).await;
    let order_id = place_order(&pool, fx.bob, fx.product).await;
    let uri = format!("/delete_order/{order_id}/");

    let response = fx.app.get(&uri, Some(&fx.admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Are you sure"));
    assert_eq!(count(&pool, "order").await, 1);

    let response = fx.app.post_form(&uri, Some(&fx.admin_cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(count(&pool, "order").await, 0);

    let response = fx.app.post_form(&uri, Some(&fx.admin_cookie), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn formset_creates_one_order_per_valid_row(pool: PgPool) {
    let fx = setup(&pool).await;
    let form = format!(
        "form-TOTAL_FORMS=10\
         &form-0-product={p}&form-0-status=pending\
         &form-1-product=&form-1-status=pending\
         &form-2-product=999999&form-2-status=pending\
         &form-3-product={p}&form-3-status=delivered\
         &form-4-product={p}&form-4-status=lost",
        p = fx.product
    );

    let response = fx
        .app
        .post_form(
            &format!("/create_order/{}/", fx.bob),
            Some(&fx.admin_cookie),
            &form,
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let orders = OrderRepository::new(&pool)
        .list_for_customer(fx.bob)
        .await
        .unwrap();
    let mut statuses: Vec<_> = orders.iter().map(|o| o.status).collect();
    statuses.sort_by_key(|s| s.value());
    assert_eq!(statuses, vec![OrderStatus::Delivered, OrderStatus::Pending]);
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn formset_for_unknown_customer_is_not_found(pool: PgPool) {
    let fx = setup(&pool).await;

    let response = fx
        .app
        .get("/create_order/999999/", Some(&fx.admin_cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn update_saves_valid_changes(pool: PgPool) {
    let fx = setup(&pool).await;
    let order_id = place_order(&pool, fx.bob, fx.product).await;

    let response = fx
        .app
        .post_form(
            &format!("/update_order/{order_id}/"),
            Some(&fx.admin_cookie),
            &format!(
                "customer={}&product={}&status=delivered&note=left+at+door",
                fx.bob, fx.product
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let order = OrderRepository::new(&pool)
        .get_by_id(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.note.as_deref(), Some("left at door"));
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn update_with_errors_rerenders_and_keeps_order(pool: PgPool) {
    let fx = setup(&pool).await;
    let order_id = place_order(&pool, fx.bob, fx.product).await;

    let response = fx
        .app
        .post_form(
            &format!("/update_order/{order_id}/"),
            Some(&fx.admin_cookie),
            &format!("customer=&product={}&status=delivered", fx.product),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));

    let order = OrderRepository::new(&pool)
        .get_by_id(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn create_random_order_inserts_one(pool: PgPool) {
    let fx = setup(&pool).await;

    let response = fx
        .app
        .post_form(
            "/create_random_order/",
            Some(&fx.admin_cookie),
            &format!("customer={}&product={}&status=shipped&note=", fx.bob, fx.product),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(count(&pool, "order").await, 1);
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn date_filter_is_inclusive(pool: PgPool) {
    let fx = setup(&pool).await;
    for day in ["2024-01-01", "2024-02-15", "2024-03-30"] {
        let id = place_order(&pool, fx.bob, fx.product).await;
        sqlx::query("UPDATE crm.order SET date_created = $2::date WHERE id = $1")
            .bind(id)
            .bind(day)
            .execute(&pool)
            .await
            .unwrap();
    }

    let orders = OrderRepository::new(&pool)
        .list_for_customer(fx.bob)
        .await
        .unwrap();
    let params = OrderFilterParams {
        start_date: "2024-02-15".to_string(),
        end_date: "2024-03-30".to_string(),
        ..OrderFilterParams::default()
    };
    let filtered = OrderFilter::from_params(&params).apply(orders);

    let start = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(
        filtered
            .iter()
            .all(|o| (start..=end).contains(&o.date_created_day()))
    );

    let response = fx
        .app
        .get(
            &format!(
                "/customer/{}/?start_date=2024-02-15&end_date=2024-03-30",
                fx.bob
            ),
            Some(&fx.admin_cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("value=\"2024-02-15\""));
    assert!(body.contains("<p class=\"big-number\">3</p>"));
}

#[sqlx::test(migrator = "order_desk_web::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn dashboard_lists_customers_and_counts(pool: PgPool) {
    let fx = setup(&pool).await;
    place_order(&pool, fx.bob, fx.product).await;

    let response = fx.app.get("/", Some(&fx.admin_cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Customers: 2"));
    assert!(body.contains("bob"));
    assert!(body.contains("Ball"));
}
