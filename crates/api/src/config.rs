use crate::auth::jwt::JwtConfig;

/// Default payment collector page the client is redirected to.
const DEFAULT_PAYMENT_BASE_URL: &str = "http://localhost:5173/pay";

/// Days between generating an invoice from a submission and its due date.
const DEFAULT_INVOICE_NET_DAYS: i64 = 14;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Payment hand-off and confirmation settings.
    pub payment: PaymentConfig,
    /// Seconds between overdue sweeps (default: `3600`).
    pub overdue_sweep_interval_secs: u64,
    /// Net days for invoices generated from submissions (default: `14`).
    pub invoice_net_days: i64,
}

/// External payment collector settings.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Base URL of the payment page; query parameters are appended to it.
    pub base_url: String,
    /// Shared secret for the `x-payment-signature` HMAC on confirmations.
    pub webhook_secret: String,
}

impl PaymentConfig {
    /// # Panics
    ///
    /// Panics if `PAYMENT_WEBHOOK_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PAYMENT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PAYMENT_BASE_URL.into());

        let webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET")
            .expect("PAYMENT_WEBHOOK_SECRET must be set in the environment");
        assert!(
            !webhook_secret.is_empty(),
            "PAYMENT_WEBHOOK_SECRET must not be empty"
        );

        Self {
            base_url,
            webhook_secret,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                     |
    /// |-------------------------------|-----------------------------|
    /// | `HOST`                        | `0.0.0.0`                   |
    /// | `PORT`                        | `3000`                      |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                        |
    /// | `PAYMENT_BASE_URL`            | `http://localhost:5173/pay` |
    /// | `PAYMENT_WEBHOOK_SECRET`      | **required**                |
    /// | `OVERDUE_SWEEP_INTERVAL_SECS` | `3600`                      |
    /// | `INVOICE_NET_DAYS`            | `14`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let overdue_sweep_interval_secs: u64 = std::env::var("OVERDUE_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("OVERDUE_SWEEP_INTERVAL_SECS must be a valid u64");
        assert!(
            overdue_sweep_interval_secs > 0,
            "OVERDUE_SWEEP_INTERVAL_SECS must be positive"
        );

        let invoice_net_days: i64 = std::env::var("INVOICE_NET_DAYS")
            .unwrap_or_else(|_| DEFAULT_INVOICE_NET_DAYS.to_string())
            .parse()
            .expect("INVOICE_NET_DAYS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            payment: PaymentConfig::from_env(),
            overdue_sweep_interval_secs,
            invoice_net_days,
        }
    }
}
