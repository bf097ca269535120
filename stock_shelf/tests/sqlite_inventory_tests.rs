use shelf_common::{Session, SortKey};
use std::sync::Arc;
use stock_shelf::{
    ImagePayload, InventorySync, LocalObjectStore, ShelfError, SqliteStore, ViewState,
};
use tempfile::TempDir;

// Test fixtures

fn open_sync(dir: &TempDir) -> InventorySync {
    let store = SqliteStore::open(&dir.path().join("data").join("inventory.db")).unwrap();
    let objects = LocalObjectStore::new(&dir.path().join("images")).unwrap();
    InventorySync::new(Arc::new(store), Arc::new(objects), Session::local())
}

fn summary(items: &[shelf_common::InventoryItem]) -> Vec<(String, i64)> {
    items
        .iter()
        .map(|item| (item.name.clone(), item.quantity))
        .collect()
}

// Full flow against a SQLite file

#[tokio::test]
async fn test_add_increment_decrement_remove() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir);
    assert!(sync.refresh().await.unwrap().is_empty());

    sync.add_item("apples", 3, None).await.unwrap();
    sync.add_item("bananas", 1, None).await.unwrap();
    sync.add_item("apples", 2, None).await.unwrap();

    let view = ViewState::new("", SortKey::NameAsc);
    assert_eq!(
        summary(&sync.display(&view).await),
        vec![("apples".to_string(), 5), ("bananas".to_string(), 1)]
    );

    sync.decrement_item("apples").await.unwrap();
    let items = sync.decrement_item("bananas").await.unwrap();
    assert_eq!(summary(&items), vec![("apples".to_string(), 4)]);

    let items = sync.remove_all("apples").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_inventory_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let sync = open_sync(&dir);
        sync.add_item("Widget", 7, None).await.unwrap();
    }

    let sync = open_sync(&dir);
    assert!(sync.items().await.is_empty());
    let items = sync.refresh().await.unwrap();
    assert_eq!(summary(&items), vec![("Widget".to_string(), 7)]);
}

#[tokio::test]
async fn test_photo_is_written_and_kept_on_increment() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir);

    let photo = ImagePayload::from_file_name(vec![0xFF, 0xD8, 0xFF], "widget.jpg");
    sync.add_item("Widget", 1, Some(&photo)).await.unwrap();

    let url = sync.lookup_image("Widget").await.unwrap().unwrap();
    let path = urlencoding::decode(url.strip_prefix("file://").unwrap()).unwrap();
    assert_eq!(std::fs::read(&*path).unwrap(), vec![0xFF, 0xD8, 0xFF]);

    let items = sync.add_item("Widget", 1, None).await.unwrap();
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].image_url.as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn test_projection_over_synced_list() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir);
    sync.add_item("Red Widget", 4, None).await.unwrap();
    sync.add_item("blue widget", 9, None).await.unwrap();
    sync.add_item("Sprocket", 2, None).await.unwrap();

    let view = ViewState::new("WIDGET", SortKey::QuantityDesc);
    assert_eq!(
        summary(&sync.display(&view).await),
        vec![("blue widget".to_string(), 9), ("Red Widget".to_string(), 4)]
    );

    let view = ViewState::new("", SortKey::NameDesc);
    let names: Vec<String> = sync
        .display(&view)
        .await
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["Sprocket", "Red Widget", "blue widget"]);

    // projecting does not reorder the synchronizer's own list
    assert_eq!(sync.items().await.len(), 3);
}

#[tokio::test]
async fn test_invalid_quantity_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir);

    let err = sync.add_item("Widget", 0, None).await.unwrap_err();
    assert!(matches!(err, ShelfError::InvalidItem(_)));
    assert!(sync.refresh().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_items_are_ignored() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir);
    sync.add_item("Widget", 1, None).await.unwrap();

    let items = sync.decrement_item("Gadget").await.unwrap();
    assert_eq!(items.len(), 1);
    let items = sync.remove_all("Gadget").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(sync.lookup_image("Gadget").await.unwrap(), None);
}
