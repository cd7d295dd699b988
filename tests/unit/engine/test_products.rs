// Product repository CRUD

use crate::common;
use stock_service::api::ProductStore;
use stock_service::engine::products::DbProductStore;

#[tokio::test]
async fn test_create_then_list() {
    let (pool, _dir) = common::test_pool().await;
    let store = DbProductStore::new(pool);

    let id = store.create("Widget", 10).await.expect("create");
    assert!(id > 0);

    let products = store.list().await.expect("list");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
    assert_eq!(products[0].name, "Widget");
    assert_eq!(products[0].quantity, 10);
}

#[tokio::test]
async fn test_list_empty() {
    let (pool, _dir) = common::test_pool().await;
    let store = DbProductStore::new(pool);

    let products = store.list().await.expect("list");
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_update_changes_row() {
    let (pool, _dir) = common::test_pool().await;
    let store = DbProductStore::new(pool.clone());
    let id = store.create("Widget", 10).await.expect("create");

    let rows = store.update(id, "Gadget", 4).await.expect("update");
    assert_eq!(rows, 1);

    let products = store.list().await.expect("list");
    assert_eq!(products[0].name, "Gadget");
    assert_eq!(products[0].quantity, 4);
}

#[tokio::test]
async fn test_update_missing_id_matches_zero_rows() {
    let (pool, _dir) = common::test_pool().await;
    let store = DbProductStore::new(pool);

    let rows = store.update(999, "Ghost", 1).await.expect("update");
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (pool, _dir) = common::test_pool().await;
    let store = DbProductStore::new(pool);
    let id = store.create("Widget", 10).await.expect("create");

    let first = store.delete(id).await.expect("first delete");
    assert_eq!(first, 1);

    let second = store.delete(id).await.expect("second delete");
    assert_eq!(second, 0);

    let products = store.list().await.expect("list");
    assert!(products.is_empty());
}
