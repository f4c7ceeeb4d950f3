use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::{
    db::DbPool,
    dto::orders::{CancelOutcome, OrderItemInput},
    error::{AppError, AppResult},
    models::{Order, OrderStatus, OrderStatusFilter},
};

/// Authoritative unit price for a food item, read on the caller's
/// transaction connection so the order never mixes prices the transaction
/// cannot see consistently. Client-submitted prices are never consulted.
pub async fn resolve_unit_price(conn: &mut PgConnection, food_id: i32) -> AppResult<Decimal> {
    let row: Option<(Decimal,)> = sqlx::query_as("SELECT price FROM food WHERE id = $1")
        .bind(food_id)
        .fetch_optional(conn)
        .await?;
    row.map(|(price,)| price).ok_or(AppError::NotFound)
}

/// Create an order as one atomic unit: header row, one detail row per
/// item, and the total computed from catalog prices resolved inside the
/// same transaction. Any failure drops the transaction, which rolls the
/// whole order back; no partial header, details, or total is ever visible.
pub async fn create_order(
    pool: &DbPool,
    user_id: i32,
    items: &[OrderItemInput],
) -> AppResult<i32> {
    if items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    if items.iter().any(|item| item.count < 1) {
        return Err(AppError::BadRequest("Item count must be positive".into()));
    }

    let mut tx = pool.begin().await?;

    let (order_id,): (i32,) = sqlx::query_as(
        "INSERT INTO orders (user_id, status, created_at, total_amount)
         VALUES ($1, 'active', now(), 0)
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut running_total = Decimal::ZERO;
    for item in items {
        let price = resolve_unit_price(&mut *tx, item.food_id).await?;
        running_total += price * Decimal::from(item.count);

        sqlx::query("INSERT INTO order_detail (order_id, food_id, count) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(item.food_id)
            .bind(item.count)
            .execute(&mut *tx)
            .await?;
    }

    // Set exactly once; the committed total stays the sole source of truth
    // since detail rows do not snapshot prices.
    sqlx::query("UPDATE orders SET total_amount = $1 WHERE id = $2")
        .bind(running_total)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(order_id)
}

/// Owner-initiated `active -> canceled` transition. The update only fires
/// while the order is still active and inside the cancel window, so a
/// second call, a late call, or a call racing the sweeper leaves the row
/// untouched. An ineligible own order is a no-op, not an error; callers
/// get the resulting status back and assert on that.
pub async fn cancel_order(
    pool: &DbPool,
    user_id: i32,
    order_id: i32,
    cancel_window_mins: i32,
) -> AppResult<CancelOutcome> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'canceled'
         WHERE id = $1 AND user_id = $2 AND status = 'active'
           AND created_at > now() - make_interval(mins => $3)",
    )
    .bind(order_id)
    .bind(user_id)
    .bind(cancel_window_mins)
    .execute(pool)
    .await?;

    let row: Option<(i32, String)> =
        sqlx::query_as("SELECT user_id, status FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(pool)
            .await?;

    let (owner_id, status) = row.ok_or(AppError::NotFound)?;
    if owner_id != user_id {
        return Err(AppError::Unauthorized);
    }
    let status: OrderStatus = status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;

    Ok(CancelOutcome {
        canceled: result.rows_affected() > 0,
        status,
    })
}

/// Sweeper-side `active -> completed` transition: one conditional bulk
/// UPDATE over every active order older than the completion window. The
/// window predicate is the exact complement of the cancel predicate when
/// both windows are equal, so no instant exists where a row satisfies
/// both transitions. Repeat runs match zero rows.
pub async fn auto_complete_stale(pool: &DbPool, complete_window_mins: i32) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'completed', delivered_at = now()
         WHERE status = 'active'
           AND created_at <= now() - make_interval(mins => $1)",
    )
    .bind(complete_window_mins)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Orders owned by the user, optionally narrowed to one status, newest
/// first.
pub async fn list_orders_by_status(
    pool: &DbPool,
    user_id: i32,
    filter: OrderStatusFilter,
) -> AppResult<Vec<Order>> {
    let orders = match filter {
        OrderStatusFilter::All => {
            sqlx::query_as::<_, Order>(
                "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        OrderStatusFilter::Active | OrderStatusFilter::Completed => {
            let status = if filter == OrderStatusFilter::Active {
                OrderStatus::Active
            } else {
                OrderStatus::Completed
            };
            sqlx::query_as::<_, Order>(
                "SELECT * FROM orders WHERE user_id = $1 AND status = $2
                 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
    };
    Ok(orders)
}
