use crate::auth::hash_password;
use crate::models::{dining_unit, inventory_item, temp_agency, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// Demo dining units, accounts, an agency and a starter stock list.
/// Safe to run repeatedly: existing rows are left alone.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Dining units
    for (name, code) in [
        ("West Dining Hall", "WDH"),
        ("North Commons", "NCM"),
        ("Campus Catering", "CAT"),
    ] {
        let unit = dining_unit::ActiveModel {
            name: Set(name.to_owned()),
            code: Set(code.to_owned()),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        dining_unit::Entity::insert(unit)
            .on_conflict(OnConflict::column(dining_unit::Column::Code).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    let west = dining_unit::Entity::find()
        .filter(dining_unit::Column::Code.eq("WDH"))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("seeded unit WDH".to_owned()))?;
    let north = dining_unit::Entity::find()
        .filter(dining_unit::Column::Code.eq("NCM"))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("seeded unit NCM".to_owned()))?;

    // 2. Users, one per role
    let accounts = [
        ("admin", "admin123", "admin", None),
        ("accounting", "accounting123", "accounting", None),
        ("wdh.manager", "manager123", "manager", Some(west.id)),
        ("wdh.cook", "staff123", "staff", Some(west.id)),
        ("ncm.manager", "manager123", "manager", Some(north.id)),
    ];
    for (username, password, role, unit_id) in accounts {
        let password_hash = hash_password(password).map_err(DbErr::Custom)?;
        let account = user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            role: Set(role.to_owned()),
            dining_unit_id: Set(unit_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        user::Entity::insert(account)
            .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 3. Temp agency
    let agency = temp_agency::ActiveModel {
        name: Set("Campus Staffing Partners".to_owned()),
        contact_email: Set(Some("timesheets@campusstaffing.example".to_owned())),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    temp_agency::Entity::insert(agency)
        .on_conflict(OnConflict::column(temp_agency::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    // 4. Starter stock for West Dining Hall
    let items = [
        ("BEEF-80", "Ground Beef 80/20", "Protein", "lb", 120.0, 4.35, 40.0),
        ("BEAN-KID", "Kidney Beans #10 Can", "Dry Goods", "can", 24.0, 6.10, 6.0),
        ("TOM-DICED", "Diced Tomatoes #10 Can", "Dry Goods", "can", 30.0, 5.25, 8.0),
        ("MILK-1G", "Whole Milk 1 gal", "Dairy", "gal", 18.0, 3.89, 12.0),
        ("EGG-LG", "Large Eggs 15 dz", "Dairy", "case", 4.0, 38.50, 2.0),
    ];
    for (sku, name, category, uom, qty, price, reorder) in items {
        let item = inventory_item::ActiveModel {
            sku: Set(sku.to_owned()),
            name: Set(name.to_owned()),
            category: Set(Some(category.to_owned())),
            uom: Set(uom.to_owned()),
            qty_on_hand: Set(qty),
            unit_price: Set(price),
            dining_unit_id: Set(west.id),
            reorder_level: Set(reorder),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        inventory_item::Entity::insert(item)
            .on_conflict(
                OnConflict::columns([
                    inventory_item::Column::Sku,
                    inventory_item::Column::DiningUnitId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    tracing::info!("Demo data ready: units WDH, NCM, CAT; users admin, accounting, wdh.manager, wdh.cook, ncm.manager");
    Ok(())
}
