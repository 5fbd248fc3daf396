use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create dining_units table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS dining_units (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            code TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'staff',
            dining_unit_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;

    // Create inventory table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT NOT NULL,
            name TEXT NOT NULL,
            category TEXT,
            uom TEXT NOT NULL DEFAULT 'each',
            qty_on_hand REAL NOT NULL DEFAULT 0,
            unit_price REAL NOT NULL DEFAULT 0,
            dining_unit_id INTEGER NOT NULL,
            reorder_level REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (sku, dining_unit_id),
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create inventory_logs table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            inventory_id INTEGER,
            sku TEXT NOT NULL,
            item_name TEXT NOT NULL,
            action TEXT NOT NULL, -- 'checkin', 'checkout', 'waste', 'transfer', 'edit', 'delete'
            quantity REAL NOT NULL,
            unit_price REAL NOT NULL DEFAULT 0,
            dining_unit_id INTEGER NOT NULL,
            target_unit_id INTEGER,
            log_date TEXT NOT NULL,
            performed_by TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id),
            FOREIGN KEY (target_unit_id) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_inventory_logs_unit_date ON inventory_logs (dining_unit_id, log_date)",
    )
    .await?;

    // Create invoice_logs table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS invoice_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vendor TEXT NOT NULL,
            invoice_number TEXT NOT NULL,
            invoice_date TEXT NOT NULL,
            invoice_total REAL NOT NULL,
            allocations TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'Submitted',
            attachments TEXT NOT NULL DEFAULT '[]',
            dining_unit_id INTEGER NOT NULL,
            submitted_by TEXT NOT NULL,
            processed_by TEXT,
            processed_at TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (vendor, invoice_number),
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    // Create deposit_transmittals table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS deposit_transmittals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference TEXT NOT NULL UNIQUE,
            dining_unit_id INTEGER NOT NULL,
            deposit_date TEXT NOT NULL,
            currency_amount REAL NOT NULL DEFAULT 0,
            coin_amount REAL NOT NULL DEFAULT 0,
            check_amount REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL,
            bag_number TEXT,
            prepared_by TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Submitted',
            verified_by TEXT,
            verified_at TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    // Create recipes table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            yield REAL NOT NULL,
            dining_unit_id INTEGER,
            items TEXT NOT NULL DEFAULT '[]',
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create production_logs table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS production_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER,
            recipe_name TEXT NOT NULL,
            servings_prepared REAL NOT NULL,
            dining_unit_id INTEGER NOT NULL,
            production_date TEXT NOT NULL,
            prepared_by TEXT NOT NULL,
            total_cost REAL NOT NULL DEFAULT 0,
            inventory_deducted INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE SET NULL,
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    // Create inventory_snapshots table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unit INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            type TEXT NOT NULL, -- 'beginning', 'ending'
            amount REAL NOT NULL,
            captured_by TEXT NOT NULL,
            captured_at TEXT NOT NULL,
            UNIQUE (unit, month, year, type),
            FOREIGN KEY (unit) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    // Create eom_reports table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS eom_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dining_unit_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            beginning_inventory REAL NOT NULL,
            purchases REAL NOT NULL,
            transfers_in REAL NOT NULL,
            transfers_out REAL NOT NULL,
            ending_inventory REAL NOT NULL,
            waste REAL NOT NULL,
            cogs REAL NOT NULL,
            servings REAL NOT NULL,
            plate_cost REAL,
            generated_by TEXT NOT NULL,
            generated_at TEXT NOT NULL,
            UNIQUE (dining_unit_id, month, year),
            FOREIGN KEY (dining_unit_id) REFERENCES dining_units(id)
        )
        "#,
    )
    .await?;

    // Create temp_agencies table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS temp_agencies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            contact_email TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create temp_time_entries table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS temp_time_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unit_id INTEGER NOT NULL,
            agency_id INTEGER NOT NULL,
            worker_name TEXT NOT NULL,
            work_date TEXT NOT NULL,
            hours_worked REAL NOT NULL,
            hourly_rate REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            submitted_by TEXT NOT NULL,
            reviewed_by TEXT,
            reviewed_at TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (unit_id) REFERENCES dining_units(id),
            FOREIGN KEY (agency_id) REFERENCES temp_agencies(id)
        )
        "#,
    )
    .await?;

    tracing::debug!("Schema migrations applied");

    Ok(())
}
