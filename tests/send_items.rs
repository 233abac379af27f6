mod common;

use std::sync::Arc;

use common::{item, user, FakeBackend};
use vp_admin::catalog::barcodes::{add_barcode, AddBarcode};
use vp_admin::catalog::labels::load_reference_data;
use vp_admin::catalog::model::ExtItemResponse;
use vp_admin::catalog::price_levels::{PriceLevelError, PriceLevels, INVALID_PRICE_LEVEL};
use vp_admin::send::{send_items, send_state, Level, SendState};
use vp_admin::table::items::{item_table, ItemTable};

const HO_TOKEN: &str = "123e4567-e89b-12d3-a456-426614174000";

async fn setup() -> (FakeBackend, ItemTable) {
    let backend = FakeBackend::new();
    backend
        .with_state(|s| s.items = vec![item(1, "Cola", "111"), item(2, "Chips", "222")])
        .await;
    let shared = Arc::new(backend.clone());
    let table = item_table(shared.clone(), shared, user("u-1", "1", None), HO_TOKEN);
    table.refresh().await;
    (backend, table)
}

#[tokio::test]
async fn sent_items_report_and_refresh() {
    let (backend, table) = setup().await;
    let selected = vec![table.cache().get(&1).await.unwrap()];
    assert_eq!(send_state(&selected[0]), SendState::NotSent);

    let notes = send_items(&backend, &table, HO_TOKEN, &selected).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].item_id, 1);
    assert_eq!(notes[0].level, Level::Success);
    assert_eq!(notes[0].to_string(), "[ok] item 1: Cola sent");

    let posted = backend.with_state(|s| s.posted.clone()).await;
    assert_eq!(posted[0].public_key, HO_TOKEN);
    assert_eq!(posted[0].ext_items[0].sd_item_id, None);
    assert!(posted[0].ext_items[0].created_date.is_some());

    // the grid picks up the new send status without a manual refresh
    let cola = table.cache().get(&1).await.unwrap();
    assert_eq!(send_state(&cola), SendState::Sent);
    assert_eq!(send_state(&table.cache().get(&2).await.unwrap()), SendState::NotSent);
}

#[tokio::test]
async fn empty_selection_posts_nothing() {
    let (backend, table) = setup().await;
    let notes = send_items(&backend, &table, HO_TOKEN, &[]).await.unwrap();
    assert!(notes.is_empty());
    assert!(!backend.calls().await.contains(&"PostItems".to_string()));
}

#[tokio::test]
async fn catalog_failures_become_error_notifications() {
    let (backend, table) = setup().await;
    backend
        .with_state(|s| {
            s.post_responses.push_back(vec![
                ExtItemResponse {
                    ext_item_id: 1,
                    status: "Successed".into(),
                    message: "Updated".into(),
                    ..Default::default()
                },
                ExtItemResponse {
                    ext_item_id: 2,
                    status: "Failed".into(),
                    message: "Tax code missing".into(),
                    ..Default::default()
                },
            ])
        })
        .await;

    let rows = table.rows().await;
    let notes = send_items(&backend, &table, HO_TOKEN, &rows).await.unwrap();
    let levels: Vec<Level> = notes.iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![Level::Success, Level::Error]);
    assert_eq!(notes[1].message, "Tax code missing");

    let calls = backend.calls().await;
    let post = calls.iter().position(|c| c == "PostItems").unwrap();
    assert!(calls[post..].iter().any(|c| c == "GetVpItems"));
}

#[tokio::test]
async fn barcodes_are_checked_before_posting() {
    let backend = FakeBackend::new();
    backend
        .with_state(|s| {
            s.barcodes.insert("555".into());
        })
        .await;

    assert_eq!(add_barcode(&backend, HO_TOKEN, 7, "  ").await.unwrap(), AddBarcode::Empty);
    assert_eq!(add_barcode(&backend, HO_TOKEN, 7, "555").await.unwrap(), AddBarcode::Duplicate);
    assert_eq!(add_barcode(&backend, HO_TOKEN, 7, " 556 ").await.unwrap(), AddBarcode::Added);

    let stored = backend.with_state(|s| s.item_barcodes.clone()).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].barcode, "556");
    assert_eq!(stored[0].item_id, 7);
    assert_eq!(add_barcode(&backend, HO_TOKEN, 8, "556").await.unwrap(), AddBarcode::Duplicate);
}

#[tokio::test]
async fn price_levels_reject_blank_input() {
    let backend = FakeBackend::new();
    let levels = PriceLevels::new(&backend, HO_TOKEN, 7);

    let err = levels.create(0, 3.0).await.unwrap_err();
    assert!(matches!(err, PriceLevelError::Invalid));
    assert_eq!(err.to_string(), INVALID_PRICE_LEVEL);
    assert!(matches!(levels.create(2, 0.0).await, Err(PriceLevelError::Invalid)));
    assert!(!backend.calls().await.contains(&"CreateItemPriceLevel".to_string()));

    levels.create(2, 3.5).await.unwrap();
    assert!(levels.update(2, 4.0).await.unwrap());
    let listed = levels.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].price, 4.0);

    assert!(levels.delete(2).await.unwrap());
    assert!(levels.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn reference_data_becomes_labels() {
    let backend = FakeBackend::new();
    let data = load_reference_data(&backend, HO_TOKEN).await.unwrap();
    assert_eq!(data.departments[0].label, "Drinks");
    assert_eq!(data.departments[0].value, "1");
    assert_eq!(data.categories_for("1")[0].label, "Soda");
    assert!(data.categories_for("2").is_empty());
    assert_eq!(data.brands[0].value, "Acme");
    assert_eq!(data.price_levels[0].label, "Wholesale");
}
