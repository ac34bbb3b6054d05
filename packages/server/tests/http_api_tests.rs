//! HTTP surface tests: routing, authentication and error mapping.

mod common;

use axum::http::StatusCode;
use common::ApiClient;
use estate_core::common::UserId;
use estate_core::kernel::test_dependencies::{InMemoryViewCache, MockGeocoder};
use estate_core::kernel::TestDependencies;
use serde_json::json;

const SELLER: UserId = UserId::new(1);
const BUYER: UserId = UserId::new(2);

fn offer_body(address: &str) -> serde_json::Value {
    json!({
        "offer_type_id": 1,
        "purchase_type_id": 1,
        "renovation_id": 1,
        "house_type_id": 1,
        "price": 3_500_000,
        "area": 33.0,
        "floor": 5,
        "rooms": 1,
        "ceiling_height": 2.7,
        "address": address,
        "description": "Sunny <i>studio</i>"
    })
}

async fn create_published(client: &ApiClient, address: &str) -> i64 {
    let created = client
        .post("/offers", Some(SELLER), Some(offer_body(address)))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.get("id").as_i64().unwrap();

    let published = client
        .post(&format!("/offers/{}/publish", id), Some(SELLER), None)
        .await;
    assert_eq!(published.status, StatusCode::OK);
    id
}

#[tokio::test]
async fn test_health() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);

    let response = client.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("status"), json!("healthy"));
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);

    let response = client.post("/offers", None, Some(offer_body("Arbat 1"))).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.get("error"), json!("Authentication required"));
}

#[tokio::test]
async fn test_offer_flow_over_http() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);
    let id = create_published(&client, "Arbat 1").await;

    // Anonymous buyers see it, escaped, without private stats
    let listed = client.get("/offers", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.get("0.id"), json!(id));
    assert_eq!(listed.get("0.description"), json!("Sunny &lt;i&gt;studio&lt;/i&gt;"));
    assert!(listed.get("0.stats.views_count").is_null());

    let liked = client
        .post(&format!("/offers/{}/like", id), Some(BUYER), None)
        .await;
    assert_eq!(liked.status, StatusCode::OK);
    assert_eq!(liked.body, json!({ "is_active": true, "total": 1 }));

    let mine = client.get("/me/likes", Some(BUYER)).await;
    assert_eq!(mine.get("0.id"), json!(id));

    let owner_view = client.get(&format!("/offers/{}", id), Some(SELLER)).await;
    assert_eq!(owner_view.status, StatusCode::OK);
    assert_eq!(owner_view.get("stats.views_count"), json!(1));
    assert_eq!(owner_view.get("stats.likes_count"), json!(1));
}

#[tokio::test]
async fn test_filter_from_query_string() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);
    create_published(&client, "Arbat 1").await;
    let second = create_published(&client, "Tverskaya 7").await;

    let response = client.get("/offers?address=tver&min_rooms=1", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.get("0.id"), json!(second));
}

#[tokio::test]
async fn test_error_statuses() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);
    let id = create_published(&client, "Arbat 1").await;

    let missing = client.get("/offers/999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let foreign = client
        .put(&format!("/offers/{}", id), Some(BUYER), json!({ "price": 1 }))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let tariff = client
        .post(
            &format!("/offers/{}/promotion", id),
            Some(SELLER),
            Some(json!({ "tariff": "decade" })),
        )
        .await;
    assert_eq!(tariff.status, StatusCode::UNPROCESSABLE_ENTITY);

    let no_address = client
        .post("/offers", Some(SELLER), Some(json!({ "price": 10 })))
        .await;
    assert_eq!(no_address.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upstream_and_transient_statuses() {
    let deps = TestDependencies::new().mock_geocoder(MockGeocoder::failing());
    let client = ApiClient::new(&deps);
    let response = client
        .post("/offers", Some(SELLER), Some(offer_body("Nowhere 0")))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    let deps = TestDependencies::new().mock_view_cache(InMemoryViewCache::failing());
    let client = ApiClient::new(&deps);
    let id = create_published(&client, "Arbat 1").await;
    let response = client.get(&format!("/offers/{}", id), None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.get("error"), json!("Temporary failure, please retry"));
}

#[tokio::test]
async fn test_promotion_over_http() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);
    let id = create_published(&client, "Arbat 1").await;

    let purchase = client
        .post(
            &format!("/offers/{}/promotion", id),
            Some(SELLER),
            Some(json!({ "tariff": "month" })),
        )
        .await;
    assert_eq!(purchase.status, StatusCode::OK);
    let payment_id = purchase.get("payment_id").as_i64().unwrap();
    deps.payments
        .mark_paid(estate_core::common::PaymentId::new(payment_id));

    let confirmed = client
        .post(
            &format!("/offers/{}/promotion/{}/confirm", id, payment_id),
            Some(SELLER),
            None,
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.get("is_promoted"), json!(true));
}

#[tokio::test]
async fn test_images_and_delete() {
    let deps = TestDependencies::new();
    let client = ApiClient::new(&deps);
    let id = create_published(&client, "Arbat 1").await;

    let image = client
        .post(
            &format!("/offers/{}/images", id),
            Some(SELLER),
            Some(json!({ "image_key": "kitchen.jpg" })),
        )
        .await;
    assert_eq!(image.status, StatusCode::CREATED);
    assert_eq!(image.get("url"), json!("/images/kitchen.jpg"));
    let image_id = image.get("id").as_i64().unwrap();

    let removed = client
        .delete(&format!("/offers/images/{}", image_id), Some(SELLER))
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(deps.file_storage.deleted(), vec!["kitchen.jpg".to_string()]);

    let deleted = client.delete(&format!("/offers/{}", id), Some(SELLER)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = client.get(&format!("/offers/{}", id), Some(SELLER)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
