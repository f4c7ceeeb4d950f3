use rand::{Rng, rngs::OsRng};

use crate::{
    db::DbPool,
    error::AppResult,
};

/// Draw a fresh 6-digit code from the OS entropy source. The draw has to
/// stay unguessable within the code's short validity window, so this is
/// never a counter or a seeded PRNG.
pub fn generate_code() -> i32 {
    let mut rng = OsRng;
    rng.gen_range(100_000..=999_999)
}

/// Persist a fresh code for the user and return it for delivery. The row
/// starts unspent and carries the single authoritative expiry timestamp,
/// computed on the database clock. Rows are append-only: earlier codes for
/// the same user stay in place and simply stop validating.
pub async fn issue_code(pool: &DbPool, user_id: i32, ttl_secs: i64) -> AppResult<i32> {
    let code = generate_code();
    sqlx::query(
        "INSERT INTO confirm (user_id, code, is_passed, created_at, expires_at)
         VALUES ($1, $2, FALSE, now(), now() + make_interval(secs => $3))",
    )
    .bind(user_id)
    .bind(code)
    .bind(ttl_secs as f64)
    .execute(pool)
    .await?;
    Ok(code)
}

/// True iff the user holds this exact code unspent and unexpired.
pub async fn validate_code(pool: &DbPool, user_id: i32, code: i32) -> AppResult<bool> {
    let (valid,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (
             SELECT 1 FROM confirm
             WHERE user_id = $1 AND code = $2
               AND is_passed = FALSE AND expires_at > now()
         )",
    )
    .bind(user_id)
    .bind(code)
    .fetch_one(pool)
    .await?;
    Ok(valid)
}

/// By-code-alone lookup used by the confirmation endpoint, where the caller
/// is not authenticated yet. Same validity predicate as `validate_code`;
/// prefers the newest issuance when a code value collides.
pub async fn find_user_by_code(pool: &DbPool, code: i32) -> AppResult<Option<i32>> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT user_id FROM confirm
         WHERE code = $1 AND is_passed = FALSE AND expires_at > now()
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(user_id,)| user_id))
}

/// Spend every unspent code the user holds. Safe to call repeatedly.
pub async fn mark_passed(pool: &DbPool, user_id: i32) -> AppResult<()> {
    sqlx::query("UPDATE confirm SET is_passed = TRUE WHERE user_id = $1 AND is_passed = FALSE")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Sweep-side expiry: spend every code whose expiry has passed. One bulk
/// conditional UPDATE; repeat runs match zero rows.
pub async fn expire_stale(pool: &DbPool) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE confirm SET is_passed = TRUE WHERE is_passed = FALSE AND expires_at <= now()",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
