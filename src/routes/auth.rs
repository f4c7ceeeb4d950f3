use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::auth::{
        ConfirmRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
        ResendCodeRequest, ResetPasswordRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/resend-code", post(resend_code))
        .route("/confirm", post(confirm))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created, code emailed", body = ApiResponse<String>),
        (status = 400, description = "Email already taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-code",
    request_body = ResendCodeRequest,
    responses(
        (status = 200, description = "New code emailed", body = ApiResponse<String>),
        (status = 404, description = "Unknown email")
    ),
    tag = "Auth"
)]
pub async fn resend_code(
    State(state): State<AppState>,
    Json(payload): Json<ResendCodeRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::resend_code(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/confirm",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Account verified", body = ApiResponse<String>),
        (status = 401, description = "Invalid or expired code")
    ),
    tag = "Auth"
)]
pub async fn confirm(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::confirm_account(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or inactive account")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::logout_user(&state, user.user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code emailed", body = ApiResponse<String>),
        (status = 404, description = "Unknown email")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<String>),
        (status = 401, description = "Invalid or expired code")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}
