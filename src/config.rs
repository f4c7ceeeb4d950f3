use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub email_sender: Option<String>,
    pub email_password: Option<String>,
    /// Minutes after creation during which the owner may still cancel.
    pub cancel_window_mins: i32,
    /// Minutes after creation at which the sweeper force-completes an
    /// active order. Must not be shorter than the cancel window.
    pub complete_window_mins: i32,
    pub confirm_code_ttl_secs: i64,
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(587);
        let email_sender = env::var("EMAIL_SENDER").ok().filter(|s| !s.is_empty());
        let email_password = env::var("EMAIL_PASSWORD").ok().filter(|s| !s.is_empty());

        let cancel_window_mins = env::var("ORDER_CANCEL_WINDOW_MINS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(10);
        let complete_window_mins = env::var("ORDER_COMPLETE_WINDOW_MINS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(10);
        let confirm_code_ttl_secs = env::var("CONFIRM_CODE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);
        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let config = Self {
            database_url,
            host,
            port,
            smtp_host,
            smtp_port,
            email_sender,
            email_password,
            cancel_window_mins,
            complete_window_mins,
            confirm_code_ttl_secs,
            sweep_interval_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cancel_window_mins < 1 {
            anyhow::bail!("ORDER_CANCEL_WINDOW_MINS must be at least 1");
        }
        if self.complete_window_mins < self.cancel_window_mins {
            // An order must never be force-completable while its owner may
            // still cancel it.
            anyhow::bail!(
                "ORDER_COMPLETE_WINDOW_MINS ({}) must not be shorter than ORDER_CANCEL_WINDOW_MINS ({})",
                self.complete_window_mins,
                self.cancel_window_mins
            );
        }
        if self.confirm_code_ttl_secs < 1 {
            anyhow::bail!("CONFIRM_CODE_TTL_SECS must be at least 1");
        }
        if self.sweep_interval_secs < 1 {
            anyhow::bail!("SWEEP_INTERVAL_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn email_enabled(&self) -> bool {
        self.email_sender.is_some() && self.email_password.is_some()
    }
}
