//! End-to-end order lifecycle tests against a running admin panel.
//!
//! These tests require:
//! - A running `PostgreSQL` with migrations applied (`DATABASE_URL` set)
//! - The admin server running (cargo run -p dar-decor-admin)
//!
//! Each test inserts its own order straight into the database, then drives
//! the lifecycle through the admin HTTP surface.

use dar_decor_integration_tests::admin_base_url;
use reqwest::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a pending order with one line; returns its internal id.
async fn insert_order(pool: &PgPool) -> i32 {
    let reference: String = {
        // Unique enough for a test run, and in the reference alphabet.
        let raw = Uuid::new_v4().simple().to_string().to_uppercase();
        let code: String = raw
            .chars()
            .filter(|c| "23456789ABCDEFGHJKMNPQRSTUVWXYZ".contains(*c))
            .take(8)
            .collect();
        format!("DD-{code:2>8}")
    };

    let (order_id,): (i32,) = sqlx::query_as(
        r"
        INSERT INTO orders (order_number, idempotency_key, customer_name,
                            customer_email, customer_phone, wilaya, commune,
                            address, total)
        VALUES ($1, $2, 'Test Customer', 'test@example.dz', '0550000000',
                'Alger', 'Hydra', '1 rue du Test', 5000)
        RETURNING id
        ",
    )
    .bind(&reference)
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await
    .expect("Failed to insert order");

    sqlx::query(
        r"
        INSERT INTO order_items (order_id, product_id, product_name, quantity,
                                 price, size, frame)
        VALUES ($1, 1, 'Test Print', 2, 2500, 'M', 'NONE')
        ",
    )
    .bind(order_id)
    .execute(pool)
    .await
    .expect("Failed to insert order item");

    order_id
}

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url).await.expect("Failed to connect")
}

async fn post_status(client: &reqwest::Client, order_id: i32, status: &str) -> StatusCode {
    let base_url = admin_base_url();
    client
        .post(format!("{base_url}/orders/{order_id}/status"))
        .form(&[("status", status)])
        .send()
        .await
        .expect("Failed to post status")
        .status()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_happy_path_walk_then_terminal_rejection() {
    let pool = test_pool().await;
    let order_id = insert_order(&pool).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");

    // Skipping straight to delivered is rejected, not applied.
    assert_eq!(
        post_status(&client, order_id, "delivered").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );

    // The declared walk succeeds step by step.
    for status in ["processing", "shipped", "delivered"] {
        assert_eq!(
            post_status(&client, order_id, status).await,
            StatusCode::SEE_OTHER,
            "transition to {status} should redirect"
        );
    }

    // Delivered is terminal; one more attempt fails loudly.
    assert_eq!(
        post_status(&client, order_id, "delivered").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        post_status(&client, order_id, "cancelled").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_cancel_from_pending() {
    let pool = test_pool().await;
    let order_id = insert_order(&pool).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");

    assert_eq!(
        post_status(&client, order_id, "cancelled").await,
        StatusCode::SEE_OTHER
    );
    // And nothing leaves cancelled.
    assert_eq!(
        post_status(&client, order_id, "processing").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_status_change_visible_in_list_immediately() {
    let pool = test_pool().await;
    let order_id = insert_order(&pool).await;
    let base_url = admin_base_url();

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");

    // Warm the cached list, then transition, then re-read.
    let _ = client
        .get(format!("{base_url}/orders?status=processing"))
        .send()
        .await
        .expect("Failed to list");

    assert_eq!(
        post_status(&client, order_id, "processing").await,
        StatusCode::SEE_OTHER
    );

    let body = client
        .get(format!("{base_url}/orders?status=processing"))
        .send()
        .await
        .expect("Failed to list")
        .text()
        .await
        .expect("Failed to read response");
    assert!(
        body.contains(&format!("/orders/{order_id}")),
        "transition should invalidate the cached list"
    );
}
