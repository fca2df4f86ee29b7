//! Demo schema for trying the editor against an empty SQLite file

use sqlx::sqlite::SqlitePool;

pub async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(80) NOT NULL,
            email VARCHAR(120) NOT NULL,
            biography TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            is_active BOOLEAN DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL,
            description TEXT,
            price REAL NOT NULL,
            stock INTEGER DEFAULT 0,
            category CHAR(12)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No primary key: list and edit pages report it instead of failing
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            happened_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            message TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    seed_sample_data(pool).await?;

    Ok(())
}

async fn seed_sample_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count.0 > 0 {
        return Ok(());
    }

    let first_names = [
        "Alice", "Bob", "Charlie", "Diana", "Evan", "Fiona", "George", "Hannah", "Isaac", "Julia",
    ];
    let last_names = [
        "Johnson", "Smith", "Brown", "Prince", "Davis", "Wilson", "Taylor", "Anderson",
    ];

    // 95 users spans four list pages at the default page size
    for index in 0..95 {
        let first = first_names[index % first_names.len()];
        let last = last_names[index % last_names.len()];
        let email = format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), index);
        let biography = format!(
            "{} {} joined as member number {} and has written a fairly long biography.",
            first,
            last,
            index + 1
        );
        sqlx::query("INSERT INTO users (name, email, biography, is_active) VALUES (?, ?, ?, ?)")
            .bind(format!("{} {}", first, last))
            .bind(email)
            .bind(biography)
            .bind(index % 5 != 0)
            .execute(pool)
            .await?;
    }

    let categories = ["Electronics", "Furniture", "Stationery", "Kitchen"];
    let product_types = ["Laptop", "Chair", "Notebook", "Kettle", "Monitor", "Desk"];

    // Exactly two pages worth, so the list shows a trailing empty page
    for index in 0..60 {
        let product_type = product_types[index % product_types.len()];
        let category = categories[index % categories.len()];
        let price = 5.99 + (index as f64 * 12.5);

        sqlx::query(
            "INSERT INTO products (name, description, price, stock, category) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(format!("{} {}", product_type, index + 1))
        .bind(format!("A <{}> for everyday use & more", product_type.to_lowercase()))
        .bind(price)
        .bind(((index * 7 + 5) % 500) as i64)
        .bind(category)
        .execute(pool)
        .await?;
    }

    sqlx::query("INSERT INTO audit_log (message) VALUES ('demo data seeded')")
        .execute(pool)
        .await?;

    tracing::info!("Demo data seeded: 95 users, 60 products, 1 audit_log row");
    Ok(())
}
