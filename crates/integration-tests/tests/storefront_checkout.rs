//! End-to-end checkout tests against a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` with migrations + catalog seed applied
//! - The storefront server running (cargo run -p dar-decor-storefront)
//!
//! They drive the same HTMX endpoints the browser does, with a cookie jar
//! standing in for the browser session.

use dar_decor_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;

/// Add one seeded product to the cart, in a given variant.
async fn add_to_cart(client: &reqwest::Client, slug: &str, size: &str, frame: &str, qty: u32) {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[
            ("slug", slug),
            ("size", size),
            ("frame", frame),
            ("quantity", &qty.to_string()),
        ])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_merges_same_variant_and_counts_units() {
    let client = session_client();
    let base_url = storefront_base_url();

    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 2).await;
    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 3).await;

    // The badge counts units, merged into one line.
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count");
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains('5'), "expected 5 units, got: {body}");

    // One line on the cart page, not two.
    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart page");
    let body = resp.text().await.expect("Failed to read response");
    assert_eq!(body.matches("Sahara Dunes").count(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_quantity_zero_removes_line() {
    let client = session_client();
    let base_url = storefront_base_url();

    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 2).await;

    let resp = client
        .post(format!("{base_url}/cart/update"))
        .form(&[
            ("product_id", "1"),
            ("size", "30x40"),
            ("frame", "NONE"),
            ("quantity", "0"),
        ])
        .send()
        .await
        .expect("Failed to update cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("cart is empty"), "got: {body}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_remove_product_drops_every_variant() {
    let client = session_client();
    let base_url = storefront_base_url();

    // Same product in two variants, plus another product.
    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 1).await;
    add_to_cart(&client, "sahara-dunes", "60x90", "Wood", 1).await;
    add_to_cart(&client, "casbah-doors", "40x60", "NONE", 1).await;

    let resp = client
        .post(format!("{base_url}/cart/remove-product"))
        .form(&[("product_id", "1")])
        .send()
        .await
        .expect("Failed to remove product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");

    // Both Sahara Dunes variants are gone; the other product stays.
    assert!(!body.contains("Sahara Dunes"), "got: {body}");
    assert!(body.contains("Casbah Doors"), "got: {body}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_blocked_on_empty_cart() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/checkout/begin"))
        .send()
        .await
        .expect("Failed to begin checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("cart is empty"), "got: {body}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_invalid_email_keeps_details_step_with_field_error() {
    let client = session_client();
    let base_url = storefront_base_url();

    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 1).await;

    let resp = client
        .post(format!("{base_url}/checkout/begin"))
        .send()
        .await
        .expect("Failed to begin checkout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/checkout/details"))
        .form(&[
            ("name", "Amel B."),
            ("phone", "0550123456"),
            ("email", "not-an-email"),
            ("wilaya", "Alger"),
            ("commune", "Hydra"),
            ("address", "12 rue des Freres"),
            ("delivery_method", "home"),
        ])
        .send()
        .await
        .expect("Failed to submit details");
    let body = resp.text().await.expect("Failed to read response");

    // Still on the details form, with exactly the email complaint.
    assert!(body.contains("Delivery details"), "got: {body}");
    assert!(body.contains("valid email"), "got: {body}");
    assert!(!body.contains("Name is required"), "got: {body}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_full_checkout_creates_retrievable_order() {
    let client = session_client();
    let base_url = storefront_base_url();

    // Two items, two lines.
    add_to_cart(&client, "sahara-dunes", "30x40", "NONE", 1).await;
    add_to_cart(&client, "casbah-doors", "40x60", "NONE", 1).await;

    let resp = client
        .post(format!("{base_url}/checkout/begin"))
        .send()
        .await
        .expect("Failed to begin checkout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/checkout/details"))
        .form(&[
            ("name", "Amel B."),
            ("phone", "0550123456"),
            ("email", "amel@example.dz"),
            ("wilaya", "Alger"),
            ("commune", "Hydra"),
            ("address", "12 rue des Freres"),
            ("delivery_method", "home"),
        ])
        .send()
        .await
        .expect("Failed to submit details");
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Confirm your order"), "got: {body}");

    let resp = client
        .post(format!("{base_url}/checkout/confirm"))
        .send()
        .await
        .expect("Failed to confirm");
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Your reference is"), "got: {body}");

    // Pull the DD-XXXXXXXX reference out of the success fragment.
    let reference = body
        .split("DD-")
        .nth(1)
        .map(|rest| format!("DD-{}", &rest[..8]))
        .expect("success fragment contains a reference");

    // The reference resolves immediately, with both lines.
    let resp = client
        .get(format!("{base_url}/orders/{reference}"))
        .send()
        .await
        .expect("Failed to look up order");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Sahara Dunes"), "got: {body}");
    assert!(body.contains("Casbah Doors"), "got: {body}");

    // The cart was cleared exactly once, on success.
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get count");
    let count_body = resp.text().await.expect("Failed to read response");
    assert!(!count_body.contains('('), "cart should be empty: {count_body}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_order_reference_is_not_found() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/orders/DD-23456789"))
        .send()
        .await
        .expect("Failed to look up order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
