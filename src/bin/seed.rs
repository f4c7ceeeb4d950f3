use rust_decimal::Decimal;

use axum_fastfood_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_catalog(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Burgers", vec![("Classic Burger", "5.00", 40), ("Double Cheeseburger", "7.50", 25)]),
        ("Pizza", vec![("Margherita", "8.00", 15), ("Pepperoni", "9.50", 15)]),
        ("Drinks", vec![("Cola", "1.50", 100), ("Fresh Lemonade", "3.50", 60)]),
    ];

    for (category_name, foods) in categories {
        let category_id = ensure_category(pool, category_name).await?;
        for (name, price, count) in foods {
            ensure_food(pool, category_id, name, price.parse::<Decimal>()?, count).await?;
        }
        println!("Seeded category {category_name}");
    }
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<i32> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM category WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as("INSERT INTO category (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn ensure_food(
    pool: &sqlx::PgPool,
    category_id: i32,
    name: &str,
    price: Decimal,
    count: i32,
) -> anyhow::Result<()> {
    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM food WHERE name = $1 AND category_id = $2")
            .bind(name)
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO food (name, category_id, price, count_food) VALUES ($1, $2, $3, $4)",
    )
    .bind(name)
    .bind(category_id)
    .bind(price)
    .bind(count)
    .execute(pool)
    .await?;
    Ok(())
}
