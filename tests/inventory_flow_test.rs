use dining_ops::db;
use dining_ops::domain::{Actor, DomainError, InventoryAction, Role};
use dining_ops::infrastructure::SeaOrmDiningUnitRepository;
use dining_ops::services::inventory_service::{
    self, ItemChanges, ItemFilter, LogFilter, Movement, NewItem, TransferRequest,
};
use dining_ops::services::unit_service;
use sea_orm::DatabaseConnection;

struct Fixture {
    db: DatabaseConnection,
    west: i32,
    north: i32,
}

async fn setup() -> Fixture {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let repo = SeaOrmDiningUnitRepository::new(db.clone());
    let admin = admin();
    let west = unit_service::create_unit(&repo, &admin, "West Dining Hall", "wdh")
        .await
        .unwrap();
    let north = unit_service::create_unit(&repo, &admin, "North Commons", "ncm")
        .await
        .unwrap();
    assert_eq!(west.code, "WDH");
    Fixture {
        db,
        west: west.id,
        north: north.id,
    }
}

fn admin() -> Actor {
    Actor::new("root", Role::Admin, None)
}

fn movement(unit: i32, sku: &str, quantity: f64) -> Movement {
    Movement {
        dining_unit_id: unit,
        sku: sku.to_string(),
        quantity,
        unit_price: None,
        date: Some("2026-09-15".to_string()),
        notes: None,
    }
}

async fn stock(fx: &Fixture, unit: i32, sku: &str, qty: f64, price: f64) -> i32 {
    inventory_service::create_item(
        &fx.db,
        &admin(),
        NewItem {
            sku: sku.to_string(),
            name: format!("Item {}", sku),
            category: Some("Dry Goods".to_string()),
            uom: Some("case".to_string()),
            qty_on_hand: qty,
            unit_price: price,
            dining_unit_id: unit,
            reorder_level: 5.0,
        },
    )
    .await
    .expect("Failed to create item")
    .id
}

#[tokio::test]
async fn test_check_in_and_out_adjust_on_hand() {
    let fx = setup().await;
    let cook = Actor::new("wdh.cook", Role::Staff, Some(fx.west));
    stock(&fx, fx.west, "RICE-50", 10.0, 30.0).await;

    let mut receive = movement(fx.west, "RICE-50", 4.0);
    receive.unit_price = Some(32.5);
    let item = inventory_service::check_in(&fx.db, &cook, receive).await.unwrap();
    assert_eq!(item.qty_on_hand, 14.0);
    assert_eq!(item.unit_price, 32.5);

    let item = inventory_service::check_out(&fx.db, &cook, movement(fx.west, "RICE-50", 9.0))
        .await
        .unwrap();
    assert_eq!(item.qty_on_hand, 5.0);

    let err = inventory_service::check_out(&fx.db, &cook, movement(fx.west, "RICE-50", 6.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let err = inventory_service::check_in(&fx.db, &cook, movement(fx.west, "NOPE", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let err = inventory_service::check_in(&fx.db, &cook, movement(fx.west, "RICE-50", 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // Opening quantity, check-in and check-out
    let logs = inventory_service::list_logs(&fx.db, &cook, LogFilter::default())
        .await
        .unwrap();
    assert_eq!(logs.len(), 3);

    let low = inventory_service::low_stock(&fx.db, &cook, None).await.unwrap();
    assert_eq!(low.len(), 1);
}

#[tokio::test]
async fn test_check_out_down_to_exactly_zero() {
    let fx = setup().await;
    let cook = Actor::new("wdh.cook", Role::Staff, Some(fx.west));
    stock(&fx, fx.west, "BUTTER", 4.0, 2.5).await;

    let item = inventory_service::check_out(&fx.db, &cook, movement(fx.west, "BUTTER", 4.0))
        .await
        .unwrap();
    assert_eq!(item.qty_on_hand, 0.0);

    inventory_service::check_in(&fx.db, &cook, movement(fx.west, "BUTTER", 1.0))
        .await
        .unwrap();
    let err = inventory_service::check_out(&fx.db, &cook, movement(fx.west, "BUTTER", 1.001))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let item = inventory_service::find_by_sku(&fx.db, &cook, fx.west, "BUTTER")
        .await
        .unwrap();
    assert_eq!(item.qty_on_hand, 1.0);
}

#[tokio::test]
async fn test_duplicate_sku_is_a_conflict_per_unit() {
    let fx = setup().await;
    stock(&fx, fx.west, "MILK-1G", 0.0, 3.89).await;
    // Same SKU in another unit is fine
    stock(&fx, fx.north, "MILK-1G", 0.0, 3.89).await;

    let err = inventory_service::create_item(
        &fx.db,
        &admin(),
        NewItem {
            sku: "MILK-1G".to_string(),
            name: "Whole Milk".to_string(),
            category: None,
            uom: None,
            qty_on_hand: 0.0,
            unit_price: 3.89,
            dining_unit_id: fx.west,
            reorder_level: 0.0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_waste_and_transfer() {
    let fx = setup().await;
    let manager = Actor::new("wdh.manager", Role::Manager, Some(fx.west));
    stock(&fx, fx.west, "EGG-LG", 10.0, 38.5).await;

    inventory_service::record_waste(&fx.db, &manager, movement(fx.west, "EGG-LG", 1.0))
        .await
        .unwrap();

    let outcome = inventory_service::transfer(
        &fx.db,
        &manager,
        TransferRequest {
            from_unit_id: fx.west,
            to_unit_id: fx.north,
            sku: "EGG-LG".to_string(),
            quantity: 3.0,
            date: Some("2026-09-16".to_string()),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.source.qty_on_hand, 6.0);
    assert_eq!(outcome.target.qty_on_hand, 3.0);
    assert_eq!(outcome.target.unit_price, 38.5);
    assert_eq!(outcome.target.dining_unit_id, fx.north);

    let transfers = inventory_service::list_logs(
        &fx.db,
        &manager,
        LogFilter {
            action: Some(InventoryAction::Transfer),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].target_unit_id, Some(fx.north));

    // A manager cannot pull stock out of someone else's unit
    let err = inventory_service::transfer(
        &fx.db,
        &manager,
        TransferRequest {
            from_unit_id: fx.north,
            to_unit_id: fx.west,
            sku: "EGG-LG".to_string(),
            quantity: 1.0,
            date: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = inventory_service::transfer(
        &fx.db,
        &manager,
        TransferRequest {
            from_unit_id: fx.west,
            to_unit_id: fx.west,
            sku: "EGG-LG".to_string(),
            quantity: 1.0,
            date: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // The receiving unit sees the transfer in its own history
    let north_cook = Actor::new("ncm.cook", Role::Staff, Some(fx.north));
    let received = inventory_service::list_logs(
        &fx.db,
        &north_cook,
        LogFilter {
            action: Some(InventoryAction::Transfer),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].dining_unit_id, fx.west);

    let value = inventory_service::inventory_value(&fx.db, fx.west).await.unwrap();
    assert_eq!(value, 6.0 * 38.5);
}

#[tokio::test]
async fn test_edit_and_delete_keep_history() {
    let fx = setup().await;
    let manager = Actor::new("wdh.manager", Role::Manager, Some(fx.west));
    let id = stock(&fx, fx.west, "OIL-CAN", 8.0, 21.0).await;

    let staff = Actor::new("wdh.cook", Role::Staff, Some(fx.west));
    let err = inventory_service::edit_item(&fx.db, &staff, id, ItemChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let edited = inventory_service::edit_item(
        &fx.db,
        &manager,
        id,
        ItemChanges {
            qty_on_hand: Some(7.0),
            notes: Some("Recount".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.qty_on_hand, 7.0);
    assert_eq!(edited.category.as_deref(), Some("Dry Goods"));

    let cleared = inventory_service::edit_item(
        &fx.db,
        &manager,
        id,
        serde_json::from_value(serde_json::json!({ "category": null })).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(cleared.category, None);

    inventory_service::delete_item(&fx.db, &manager, id).await.unwrap();
    let err = inventory_service::get_item(&fx.db, &manager, id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let logs = inventory_service::list_logs(
        &fx.db,
        &manager,
        LogFilter {
            sku: Some("OIL-CAN".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    // Opening stock, two edits and the delete
    assert_eq!(logs.len(), 4);
    assert!(logs.iter().all(|l| l.inventory_id.is_none()));
    assert!(logs.iter().any(|l| l.action == "edit" && l.quantity == -1.0));
}

#[tokio::test]
async fn test_listing_is_scoped_to_the_actor() {
    let fx = setup().await;
    stock(&fx, fx.west, "FLOUR", 2.0, 18.0).await;
    stock(&fx, fx.north, "SUGAR", 2.0, 22.0).await;

    let west_cook = Actor::new("wdh.cook", Role::Staff, Some(fx.west));
    let items = inventory_service::list_items(&fx.db, &west_cook, ItemFilter::default())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].sku, "FLOUR");

    let accounting = Actor::new("ap", Role::Accounting, None);
    let items = inventory_service::list_items(&fx.db, &accounting, ItemFilter::default())
        .await
        .unwrap();
    assert_eq!(items.len(), 2);

    let found = inventory_service::find_by_sku(&fx.db, &accounting, fx.north, "SUGAR")
        .await
        .unwrap();
    assert_eq!(found.unit_price, 22.0);
}
