use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};

use crate::{db::DbPool, error::AppError};

/// Identity resolved from the `Authorization: Bearer <token>` header by a
/// `users.token` lookup. The token is an opaque string minted at login;
/// handlers never see or parse it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    DbPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?
            .trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let pool = DbPool::from_ref(state);
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, email FROM users WHERE token = $1")
                .bind(token)
                .fetch_optional(&pool)
                .await?;

        let (user_id, email) = row.ok_or(AppError::Unauthorized)?;
        Ok(AuthUser { user_id, email })
    }
}
