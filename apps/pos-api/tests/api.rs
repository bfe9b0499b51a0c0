//! End-to-end tests through the axum router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use atlas_api::{app, AppState};
use atlas_db::{Database, DbConfig, FsProofStore};

const ADMIN: (&str, &str) = ("1", "Admin");
const STAFF: (&str, &str) = ("2", "Staff");

struct TestApp {
    router: Router,
    _proofs: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let proofs = tempfile::tempdir().unwrap();
    let store = FsProofStore::new(proofs.path().join("payment_proofs"), "uploads/payment_proofs");
    TestApp {
        router: app(AppState::new(db, Arc::new(store))),
        _proofs: proofs,
    }
}

impl TestApp {
    async fn send_raw(&self, method: Method, uri: &str, operator: Option<(&str, &str)>, body: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = operator {
            builder = builder.header("x-operator-id", id).header("x-operator-role", role);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(&self, method: Method, uri: &str, operator: Option<(&str, &str)>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, text) = self.send_raw(method, uri, operator, body.map(|b| b.to_string())).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    /// Product 50000 with 10% off and 5 in stock; charges 5% / 10%.
    async fn seed_scenario(&self) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/master/products",
                Some(ADMIN),
                Some(json!({ "name": "Whey Protein", "price": 50000, "discountBps": 1000, "stock": 5 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, _) = self
            .send(
                Method::PUT,
                "/api/master/settings",
                Some(ADMIN),
                Some(json!({ "settings": { "service_charge_percent": 5, "tax_percent": "10" } })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["id"].as_i64().unwrap()
    }

    async fn stock_of(&self, product_id: i64) -> i64 {
        let (_, body) = self.send(Method::GET, "/api/pos/products", Some(STAFF), None).await;
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == product_id)
            .map(|p| p["stock"].as_i64().unwrap())
            .unwrap()
    }
}

fn order(product_id: i64, payment_amount: i64) -> Value {
    json!({
        "items": [{ "productId": product_id, "quantity": 2 }],
        "paymentMethod": "cash",
        "paymentAmount": payment_amount
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_short_payment_then_successful_commit() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    let (status, body) = app
        .send(Method::POST, "/api/pos/orders", Some(STAFF), Some(order(product_id, 100_000)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_AMOUNT");
    assert_eq!(app.stock_of(product_id).await, 5);

    let (status, body) = app
        .send(Method::POST, "/api/pos/orders", Some(STAFF), Some(order(product_id, 110_000)))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["subtotal"], 90_000);
    assert_eq!(data["serviceChargeAmount"], 4_500);
    assert_eq!(data["taxAmount"], 9_450);
    assert_eq!(data["totalAmount"], 103_950);
    assert_eq!(data["changeAmount"], 6_050);
    assert_eq!(data["status"], "completed");
    let code = data["code"].as_str().unwrap();
    assert!(code.starts_with("TRX") && code.ends_with("0001"), "{code}");
    assert_eq!(data["items"][0]["productName"], "Whey Protein");
    assert_eq!(data["items"][0]["lineSubtotal"], 90_000);

    assert_eq!(app.stock_of(product_id).await, 3);

    let order_id = data["id"].as_i64().unwrap();
    let (status, body) = app
        .send(Method::GET, &format!("/api/pos/orders/{order_id}"), Some(STAFF), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], code);
}

#[tokio::test]
async fn test_snake_case_order_body_is_accepted() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    let body = json!({
        "items": [{ "product_id": product_id, "qty": 1 }],
        "payment_method": "QRIS",
        "payment_amount": 60000,
        "discount_amount": 0
    });
    let (status, body) = app.send(Method::POST, "/api/pos/orders", Some(STAFF), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["paymentMethod"], "qris");
    assert_eq!(app.stock_of(product_id).await, 4);
}

#[tokio::test]
async fn test_order_rejections() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    let (status, body) = app
        .send(Method::POST, "/api/pos/orders", None, Some(order(product_id, 110_000)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let empty = json!({ "items": [], "paymentMethod": "cash", "paymentAmount": 1000 });
    let (status, body) = app.send(Method::POST, "/api/pos/orders", Some(STAFF), Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let too_many = json!({
        "items": [{ "productId": product_id, "quantity": 6 }],
        "paymentMethod": "cash",
        "paymentAmount": 1000000
    });
    let (status, body) = app.send(Method::POST, "/api/pos/orders", Some(STAFF), Some(too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let unknown = json!({
        "items": [{ "productId": 999, "quantity": 1 }],
        "paymentMethod": "cash",
        "paymentAmount": 1000000
    });
    let (status, body) = app.send(Method::POST, "/api/pos/orders", Some(STAFF), Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let bad_method = json!({
        "items": [{ "productId": product_id, "quantity": 1 }],
        "paymentMethod": "cheque",
        "paymentAmount": 1000000
    });
    let (status, body) = app.send(Method::POST, "/api/pos/orders", Some(STAFF), Some(bad_method)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, text) = app
        .send_raw(Method::POST, "/api/pos/orders", Some(STAFF), Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert_eq!(app.stock_of(product_id).await, 5);
}

#[tokio::test]
async fn test_hold_list_recall() {
    let app = test_app().await;
    let payload = r#"{"items":[{"productId":7,"qty":2}],"note":"  spaced  "}"#;

    let body = format!(r#"{{"label":"Table 4","payload":{payload}}}"#);
    let (status, text) = app
        .send_raw(Method::POST, "/api/pos/held-carts", Some(STAFF), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{text}");
    let held: Value = serde_json::from_str(&text).unwrap();
    let id = held["data"]["id"].as_i64().unwrap();
    assert_eq!(held["data"]["label"], "Table 4");

    let (status, body) = app.send(Method::GET, "/api/pos/held-carts", Some(STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(body["data"][0].get("payload").is_none());

    let uri = format!("/api/pos/held-carts/{id}/recall");
    let (status, text) = app.send_raw(Method::POST, &uri, Some(STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains(payload), "{text}");

    let (status, body) = app.send(Method::POST, &uri, Some(STAFF), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = app.send(Method::GET, "/api/pos/held-carts", Some(STAFF), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_hold_accepts_legacy_names_and_rejects_missing_fields() {
    let app = test_app().await;

    let legacy = json!({ "hold_name": "Bar", "transaction_data": [1, 2, 3] });
    let (status, _) = app.send(Method::POST, "/api/pos/held-carts", Some(STAFF), Some(legacy)).await;
    assert_eq!(status, StatusCode::CREATED);

    for body in [json!({ "label": "No payload" }), json!({ "payload": {} }), json!({ "label": " ", "payload": {} })] {
        let (status, body) = app.send(Method::POST, "/api/pos/held-carts", Some(STAFF), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_void_restores_stock_for_admin_only() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    let (_, body) = app
        .send(Method::POST, "/api/pos/orders", Some(STAFF), Some(order(product_id, 110_000)))
        .await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/pos/orders/{order_id}/void");

    let (status, body) = app.send(Method::POST, &uri, Some(STAFF), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = app.send(Method::POST, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "voided");
    assert_eq!(app.stock_of(product_id).await, 5);

    let (status, body) = app.send(Method::POST, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(app.stock_of(product_id).await, 5);
}

#[tokio::test]
async fn test_master_data_requires_admin_and_archives() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/master/categories",
            Some(STAFF),
            Some(json!({ "name": "Drinks" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/master/categories",
            Some(ADMIN),
            Some(json!({ "name": "Drinks" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .send(
            Method::POST,
            "/api/master/products",
            Some(ADMIN),
            Some(json!({ "categoryId": category_id, "name": "Isotonic", "price": 8000, "stock": 10 })),
        )
        .await;
    let product_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .send(Method::GET, &format!("/api/pos/products?categoryId={category_id}&search=iso"), Some(STAFF), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/master/products/{product_id}"),
            Some(ADMIN),
            Some(json!({ "price": 9000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 9000);
    assert_eq!(body["data"]["stock"], 10);

    // Still referenced by the product.
    let (status, body) = app
        .send(Method::DELETE, &format!("/api/master/categories/{category_id}"), Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "deactivated");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/master/products/{product_id}"), Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "deleted");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/master/products/{product_id}"), Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_settings_map() {
    let app = test_app().await;

    let (status, body) = app.send(Method::GET, "/api/master/settings", Some(STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tax_percent"]["value"], "0");

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/master/settings",
            Some(STAFF),
            Some(json!({ "settings": { "tax_percent": 11 } })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/master/settings",
            Some(ADMIN),
            Some(json!({ "settings": { "tax_percent": 11 } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tax_percent"]["value"], "11");
    assert!(body["data"]["tax_percent"]["description"].is_string());
}

fn order_with_proof(product_id: i64, base64_len: usize) -> Value {
    json!({
        "items": [{ "productId": product_id, "quantity": 2 }],
        "paymentMethod": "transfer",
        "paymentAmount": 110_000,
        "paymentProof": format!("data:image/png;base64,{}", "A".repeat(base64_len))
    })
}

#[tokio::test]
async fn test_multi_megabyte_proof_commits() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    // 3 MiB of base64 (2.25 MiB decoded) is past axum's 2 MB default
    let (status, body) = app
        .send(
            Method::POST,
            "/api/pos/orders",
            Some(STAFF),
            Some(order_with_proof(product_id, 3 * 1024 * 1024)),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let proof = body["data"]["paymentProof"].as_str().unwrap();
    assert!(proof.starts_with("uploads/payment_proofs/proof_"), "{proof}");
    assert!(proof.ends_with(".png"), "{proof}");
    assert_eq!(app.stock_of(product_id).await, 3);
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let app = test_app().await;
    let product_id = app.seed_scenario().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/pos/orders",
            Some(STAFF),
            Some(order_with_proof(product_id, 9 * 1024 * 1024)),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.stock_of(product_id).await, 5);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/pos/held-carts",
            Some(STAFF),
            Some(json!({ "label": "Big", "payload": order_with_proof(product_id, 9 * 1024 * 1024) })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}
