use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

use crate::{config::AppConfig, db::DbPool, services::confirmation_service, services::order_service};

/// Periodic background task enforcing the time-windowed transitions no
/// single request is responsible for: force-completing stale active
/// orders and expiring stale confirmation codes. Each tick recomputes
/// eligibility from current timestamps, so missed ticks are harmless and
/// there is no persisted checkpoint. Store failures are logged and the
/// next tick retries unconditionally.
pub struct Sweeper {
    pool: DbPool,
    complete_window_mins: i32,
    period: Duration,
}

impl Sweeper {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            pool,
            complete_window_mins: config.complete_window_mins,
            period: Duration::from_secs(config.sweep_interval_secs),
        }
    }

    /// Run for the life of the process. The task holds only the pool and
    /// is dropped with the runtime at shutdown; in-flight ticks are not
    /// flushed.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = self.period.as_secs(), "sweeper started");
            let mut ticker = interval(self.period);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }

    /// One sweep pass. Public so tests can drive a pass synchronously.
    pub async fn tick(&self) {
        match order_service::auto_complete_stale(&self.pool, self.complete_window_mins).await {
            Ok(count) if count > 0 => info!(count, "auto-completed stale orders"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "order auto-complete sweep failed"),
        }

        match confirmation_service::expire_stale(&self.pool).await {
            Ok(count) if count > 0 => info!(count, "expired stale confirmation codes"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "confirmation code expiry sweep failed"),
        }
    }
}
