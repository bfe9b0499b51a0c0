//! Concurrent commits against a file-backed database.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use atlas_core::{CoreError, Money, PaymentMethod};
use atlas_db::{CartLine, CheckoutError, CheckoutRequest, Database, DbConfig, FsProofStore, NewProduct};

async fn file_db(dir: &tempfile::TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("atlas.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(30));
    Database::new(config).await.unwrap()
}

fn one_of(product_id: i64) -> CheckoutRequest {
    CheckoutRequest {
        items: vec![CartLine::new(product_id, 1)],
        payment_method: PaymentMethod::Cash,
        payment_amount: Money::from_minor(100_000),
        discount_amount: Money::zero(),
        payment_proof: None,
        notes: None,
        operator_id: 1,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let product = db
        .products()
        .insert(NewProduct {
            category_id: None,
            name: "Whey Protein".to_string(),
            description: None,
            price: 50_000,
            discount_bps: 0,
            stock: 5,
            image: None,
        })
        .await
        .unwrap();

    let checkout = db.checkout(Arc::new(FsProofStore::new(dir.path().join("proofs"), "proofs")));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let checkout = checkout.clone();
        let product_id = product.id;
        handles.push(tokio::spawn(async move { checkout.commit(one_of(product_id)).await }));
    }

    let mut codes = HashSet::new();
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(receipt) => {
                assert!(codes.insert(receipt.order.code.clone()), "duplicate code {}", receipt.order.code);
            }
            Err(CheckoutError::Core(CoreError::InsufficientStock { .. })) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(codes.len(), 5);
    assert_eq!(rejected, 5);

    let remaining = db.products().get_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(remaining.stock, 0);
    assert_eq!(db.orders().count().await.unwrap(), 5);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_recall_hands_out_cart_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let payload = serde_json::value::RawValue::from_string(r#"{"items":[]}"#.to_string()).unwrap();
    let held = db.parked_carts().hold("Table 4", &payload, 1).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let repo = db.parked_carts();
        handles.push(tokio::spawn(async move { repo.recall(held.id).await }));
    }

    let mut recalled = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            recalled += 1;
        }
    }
    assert_eq!(recalled, 1);

    db.close().await;
}
