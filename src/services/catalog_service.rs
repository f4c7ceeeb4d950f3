use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{Category, Food},
};

pub async fn list_categories(pool: &DbPool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn get_category(pool: &DbPool, id: i32) -> AppResult<Category> {
    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    category.ok_or(AppError::NotFound)
}

/// Foods in a category. The category is looked up first so a missing
/// category reads as `NotFound` rather than an empty list.
pub async fn list_foods_by_category(pool: &DbPool, category_id: i32) -> AppResult<Vec<Food>> {
    get_category(pool, category_id).await?;

    let foods = sqlx::query_as::<_, Food>(
        "SELECT id, name, category_id, img_url, price, count_food
         FROM food WHERE category_id = $1 ORDER BY id",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(foods)
}
