use uuid::Uuid;

use crate::{
    dto::auth::{
        ConfirmRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
        ResendCodeRequest, ResetPasswordRequest,
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    services::confirmation_service,
    state::AppState,
};

/// Create the user inactive, then issue and email a confirmation code.
/// The code row is persisted before delivery is attempted, so a delivery
/// failure surfaces to the caller while the code itself survives.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<()>> {
    let RegisterRequest { email, password } = payload;

    let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let (user_id,): (i32,) = sqlx::query_as(
        "INSERT INTO users (email, password, is_active) VALUES ($1, $2, FALSE) RETURNING id",
    )
    .bind(email.as_str())
    .bind(password.as_str())
    .fetch_one(&state.pool)
    .await?;

    issue_and_send(state, user_id, &email).await?;

    tracing::info!(user_id, "user registered, confirmation code issued");
    Ok(ApiResponse::message("Code sent to email"))
}

/// Activate the account named by a valid, unspent, unexpired code. The
/// lookup is by code alone since the caller is not authenticated yet.
pub async fn confirm_account(
    state: &AppState,
    payload: ConfirmRequest,
) -> AppResult<ApiResponse<()>> {
    let user_id = confirmation_service::find_user_by_code(&state.pool, payload.code)
        .await?
        .ok_or(AppError::Unauthorized)?;

    confirmation_service::mark_passed(&state.pool, user_id).await?;
    sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id, "account confirmed");
    Ok(ApiResponse::message("Account verified"))
}

/// Verify credentials against an activated account and mint a fresh
/// opaque bearer token, overwriting any previous one.
pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT id FROM users WHERE email = $1 AND password = $2 AND is_active = TRUE",
    )
    .bind(email.as_str())
    .bind(password.as_str())
    .fetch_optional(&state.pool)
    .await?;
    let (user_id,) = row.ok_or(AppError::Unauthorized)?;

    let token = Uuid::new_v4().to_string();
    sqlx::query("UPDATE users SET token = $1, is_logged_in = TRUE WHERE id = $2")
        .bind(token.as_str())
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id, "user logged in");
    Ok(ApiResponse::success("Login successful", LoginResponse { token }))
}

/// Revoke the session: the token is the sole credential, so clearing it
/// ends every bearer of it.
pub async fn logout_user(state: &AppState, user_id: i32) -> AppResult<ApiResponse<()>> {
    sqlx::query("UPDATE users SET token = NULL, is_logged_in = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id, "user logged out");
    Ok(ApiResponse::message("Logout successful"))
}

/// Issue and email a fresh confirmation code for an existing account.
/// Earlier codes stay in the store and simply stop validating.
pub async fn resend_code(
    state: &AppState,
    payload: ResendCodeRequest,
) -> AppResult<ApiResponse<()>> {
    let user_id = find_user_by_email(state, &payload.email).await?;
    issue_and_send(state, user_id, &payload.email).await?;
    Ok(ApiResponse::message("New code sent to email"))
}

/// Start a password reset by issuing and emailing a code, same lifecycle
/// as the registration code.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let user_id = find_user_by_email(state, &payload.email).await?;
    issue_and_send(state, user_id, &payload.email).await?;
    Ok(ApiResponse::message("Reset code sent to email"))
}

/// Set a new password, gated on a valid, unspent, unexpired code for the
/// account. The code is spent in the same call.
pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let user_id = find_user_by_email(state, &payload.email).await?;

    let valid = confirmation_service::validate_code(&state.pool, user_id, payload.code).await?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(payload.password.as_str())
        .bind(user_id)
        .execute(&state.pool)
        .await?;
    confirmation_service::mark_passed(&state.pool, user_id).await?;

    tracing::info!(user_id, "password reset");
    Ok(ApiResponse::message("Password reset successful"))
}

async fn find_user_by_email(state: &AppState, email: &str) -> AppResult<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.pool)
        .await?;
    row.map(|(id,)| id).ok_or(AppError::NotFound)
}

async fn issue_and_send(state: &AppState, user_id: i32, email: &str) -> AppResult<()> {
    let code =
        confirmation_service::issue_code(&state.pool, user_id, state.config.confirm_code_ttl_secs)
            .await?;
    state.mailer.send_confirmation_code(email, code).await
}
