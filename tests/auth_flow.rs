use axum_fastfood_api::{
    config::AppConfig,
    db::{DbPool, create_pool},
    dto::auth::{
        ConfirmRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResendCodeRequest,
        ResetPasswordRequest,
    },
    error::AppError,
    jobs::Sweeper,
    mailer::Mailer,
    services::{auth_service, confirmation_service},
    state::AppState,
};

// Integration flow for the account and confirmation-code core:
// register -> confirm -> login -> logout, plus code expiry enforced both
// at validation time and by the sweeper, and the code-gated reset path.
#[tokio::test]
async fn auth_and_confirmation_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let email = "diner@example.com";

    auth_service::register_user(
        &state,
        RegisterRequest {
            email: email.into(),
            password: "hunter2".into(),
        },
    )
    .await?;

    let user_id = user_id_by_email(&state.pool, email).await?;
    assert!(!user_is_active(&state.pool, user_id).await?);

    // Registering the same email again is rejected.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: email.into(),
            password: "hunter2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The issued code is in the store; a wrong code does not confirm.
    let code = latest_code(&state.pool, user_id).await?;
    let wrong_code = if code == 100_000 { code + 1 } else { code - 1 };
    let err = auth_service::confirm_account(&state, ConfirmRequest { code: wrong_code })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert!(!user_is_active(&state.pool, user_id).await?);

    // The right code activates the account and spends the code.
    auth_service::confirm_account(&state, ConfirmRequest { code }).await?;
    assert!(user_is_active(&state.pool, user_id).await?);
    assert!(!confirmation_service::validate_code(&state.pool, user_id, code).await?);

    // Spending again is harmless.
    confirmation_service::mark_passed(&state.pool, user_id).await?;

    // Login requires the right credentials; success mints a bearer token.
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: email.into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: email.into(),
            password: "hunter2".into(),
        },
    )
    .await?;
    let token = login.data.expect("login payload").token;
    assert_eq!(stored_token(&state.pool, user_id).await?, Some(token));

    // Logout revokes the token.
    auth_service::logout_user(&state, user_id).await?;
    assert_eq!(stored_token(&state.pool, user_id).await?, None);

    // A resent code that outlives its TTL stops validating, and one
    // sweeper tick durably marks it spent.
    auth_service::resend_code(
        &state,
        ResendCodeRequest { email: email.into() },
    )
    .await?;
    let resent_code = latest_code(&state.pool, user_id).await?;
    assert!(confirmation_service::validate_code(&state.pool, user_id, resent_code).await?);

    expire_codes(&state.pool, user_id).await?;
    assert!(!confirmation_service::validate_code(&state.pool, user_id, resent_code).await?);

    let sweeper = Sweeper::new(state.pool.clone(), &state.config);
    sweeper.tick().await;
    let (unspent,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM confirm WHERE user_id = $1 AND is_passed = FALSE")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(unspent, 0, "sweeper spends expired codes");

    // Password reset only goes through with a valid unspent code.
    auth_service::forgot_password(
        &state,
        ForgotPasswordRequest { email: email.into() },
    )
    .await?;
    let reset_code = latest_code(&state.pool, user_id).await?;

    let err = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: email.into(),
            code: resent_code,
            password: "letmein".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized), "spent code is refused");

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: email.into(),
            code: reset_code,
            password: "letmein".into(),
        },
    )
    .await?;

    auth_service::login_user(
        &state,
        LoginRequest {
            email: email.into(),
            password: "letmein".into(),
        },
    )
    .await?;

    // Unknown emails surface as NotFound on the code-issuing flows.
    let err = auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE order_detail, orders, confirm, food, category, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        smtp_host: "smtp.example.com".into(),
        smtp_port: 587,
        email_sender: None,
        email_password: None,
        cancel_window_mins: 10,
        complete_window_mins: 10,
        confirm_code_ttl_secs: 60,
        sweep_interval_secs: 60,
    };

    Ok(AppState {
        pool,
        mailer: Mailer::disabled(),
        config,
    })
}

async fn user_id_by_email(pool: &DbPool, email: &str) -> anyhow::Result<i32> {
    let (id,): (i32,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn user_is_active(pool: &DbPool, user_id: i32) -> anyhow::Result<bool> {
    let (is_active,): (bool,) = sqlx::query_as("SELECT is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(is_active)
}

async fn stored_token(pool: &DbPool, user_id: i32) -> anyhow::Result<Option<String>> {
    let (token,): (Option<String>,) = sqlx::query_as("SELECT token FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(token)
}

async fn latest_code(pool: &DbPool, user_id: i32) -> anyhow::Result<i32> {
    let (code,): (i32,) = sqlx::query_as(
        "SELECT code FROM confirm WHERE user_id = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(code)
}

async fn expire_codes(pool: &DbPool, user_id: i32) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE confirm SET expires_at = now() - interval '1 second' WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}
