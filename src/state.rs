use axum::extract::FromRef;

use crate::{config::AppConfig, db::DbPool, mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub mailer: Mailer,
    pub config: AppConfig,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
