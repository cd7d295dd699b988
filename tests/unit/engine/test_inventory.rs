// Inventory engine: atomicity, inverse operations, guard behaviour

use crate::common;
use stock_service::api::InventoryEngine;
use stock_service::core::errors::ServiceError;
use stock_service::core::models::TransactionType;
use stock_service::engine::inventory::{InventoryGuards, SqlInventoryEngine};

#[tokio::test]
async fn test_sale_decrements_and_logs() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 10).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    engine.record_sale(id, 3).await.expect("record sale");

    assert_eq!(common::product_quantity(&pool, id).await, Some(7));
    assert_eq!(common::transaction_count(&pool, id).await, 1);
    let record = common::last_transaction(&pool, id).await.expect("audit record");
    assert_eq!(record.product_id, id);
    assert_eq!(record.transaction_type, TransactionType::Sale);
    assert_eq!(record.quantity_changed, 3);
}

#[tokio::test]
async fn test_purchase_increments_and_logs() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 10).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    engine.record_purchase(id, 5).await.expect("record purchase");

    assert_eq!(common::product_quantity(&pool, id).await, Some(15));
    let record = common::last_transaction(&pool, id).await.expect("audit record");
    assert_eq!(record.transaction_type, TransactionType::Purchase);
    assert_eq!(record.quantity_changed, 5);
}

#[tokio::test]
async fn test_purchase_then_sale_is_identity_on_quantity() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 10).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    engine.record_purchase(id, 4).await.expect("purchase");
    engine.record_sale(id, 4).await.expect("sale");

    assert_eq!(common::product_quantity(&pool, id).await, Some(10));
    // Both sides of the round trip still land in the audit log
    assert_eq!(common::transaction_count(&pool, id).await, 2);
}

#[tokio::test]
async fn test_zero_row_update_still_logs_by_default() {
    let (pool, _dir) = common::test_pool().await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    // Unknown product id: the update matches nothing, the log row still lands
    engine.record_sale(999, 2).await.expect("legacy zero-row path");

    assert_eq!(common::product_quantity(&pool, 999).await, None);
    assert_eq!(common::transaction_count(&pool, 999).await, 1);
}

#[tokio::test]
async fn test_require_known_product_guard() {
    let (pool, _dir) = common::test_pool().await;
    let guards = InventoryGuards {
        require_known_product: true,
        ..Default::default()
    };
    let engine = SqlInventoryEngine::new(pool.clone(), guards);

    match engine.record_sale(999, 2).await {
        Err(ServiceError::NotFound(what)) => assert_eq!(what, "Product"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert_eq!(common::transaction_count(&pool, 999).await, 0);
}

#[tokio::test]
async fn test_stock_floor_guard_rejects_oversell() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 5).await;
    let guards = InventoryGuards {
        enforce_stock_floor: true,
        ..Default::default()
    };
    let engine = SqlInventoryEngine::new(pool.clone(), guards);

    match engine.record_sale(id, 8).await {
        Err(ServiceError::ValidationFailure(_)) => (),
        other => panic!("Expected ValidationFailure, got {:?}", other),
    }
    // Rolled back: neither table changed
    assert_eq!(common::product_quantity(&pool, id).await, Some(5));
    assert_eq!(common::transaction_count(&pool, id).await, 0);
}

#[tokio::test]
async fn test_stock_floor_guard_allows_selling_to_zero() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 5).await;
    let guards = InventoryGuards {
        enforce_stock_floor: true,
        ..Default::default()
    };
    let engine = SqlInventoryEngine::new(pool.clone(), guards);

    engine.record_sale(id, 5).await.expect("sell entire stock");

    assert_eq!(common::product_quantity(&pool, id).await, Some(0));
    assert_eq!(common::transaction_count(&pool, id).await, 1);
}

#[tokio::test]
async fn test_floor_guard_alone_keeps_legacy_path_for_unknown_product() {
    let (pool, _dir) = common::test_pool().await;
    let guards = InventoryGuards {
        enforce_stock_floor: true,
        ..Default::default()
    };
    let engine = SqlInventoryEngine::new(pool.clone(), guards);

    // Without require_known_product the missing-id case stays a no-op update
    engine.record_sale(999, 2).await.expect("legacy path");
    assert_eq!(common::transaction_count(&pool, 999).await, 1);
}

#[tokio::test]
async fn test_floor_guard_does_not_apply_to_purchases() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 0).await;
    let guards = InventoryGuards {
        enforce_stock_floor: true,
        ..Default::default()
    };
    let engine = SqlInventoryEngine::new(pool.clone(), guards);

    engine.record_purchase(id, 3).await.expect("purchase");
    assert_eq!(common::product_quantity(&pool, id).await, Some(3));
}

#[tokio::test]
async fn test_failed_insert_rolls_back_quantity_update() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 10).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    // Make the log insert fail after the update has succeeded
    sqlx::query("DROP TABLE transactions")
        .execute(&pool)
        .await
        .expect("drop transactions table");

    match engine.record_sale(id, 3).await {
        Err(ServiceError::StorageFailure(_)) => (),
        other => panic!("Expected StorageFailure, got {:?}", other),
    }

    // The quantity update must not survive the failed insert
    assert_eq!(common::product_quantity(&pool, id).await, Some(10));
}

#[tokio::test]
async fn test_check_violating_insert_rolls_back() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 10).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    // Bypassing the boundary validation: the schema CHECK on
    // quantity_changed rejects the insert after the update ran
    match engine.record_sale(id, -5).await {
        Err(ServiceError::StorageFailure(_)) => (),
        other => panic!("Expected StorageFailure, got {:?}", other),
    }

    assert_eq!(common::product_quantity(&pool, id).await, Some(10));
    assert_eq!(common::transaction_count(&pool, id).await, 0);
}

#[tokio::test]
async fn test_transaction_log_preserves_insertion_order() {
    let (pool, _dir) = common::test_pool().await;
    let id = common::seed_product(&pool, "Widget", 100).await;
    let engine = SqlInventoryEngine::new(pool.clone(), InventoryGuards::default());

    engine.record_sale(id, 1).await.expect("first");
    engine.record_purchase(id, 2).await.expect("second");
    engine.record_sale(id, 3).await.expect("third");

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT transaction_type, quantity_changed FROM transactions
         WHERE product_id = ?1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await
    .expect("read log");

    assert_eq!(
        rows,
        vec![
            ("sale".to_string(), 1),
            ("purchase".to_string(), 2),
            ("sale".to_string(), 3),
        ]
    );
}
