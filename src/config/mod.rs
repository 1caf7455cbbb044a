use serde::Deserialize;
use std::env;

// Top-level configuration container, built once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub reminder: ReminderConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

// Where the JSON document files live
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    pub window_minutes: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub use_tls: bool,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "schedulite=debug,tower_http=info".to_string()),
            },
            store: StoreConfig {
                data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            },
            reminder: ReminderConfig {
                window_minutes: env::var("REMINDER_WINDOW_MINUTES")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .expect("REMINDER_WINDOW_MINUTES must be a valid number"),
                sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("SWEEP_INTERVAL_SECS must be a valid number"),
            },
            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
                smtp_port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .expect("SMTP_PORT must be a valid number"),
                use_tls: env::var("SMTP_TLS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("SMTP_TLS must be true or false"),
                smtp_user: env::var("SMTP_USER").ok(),
                smtp_password: env::var("SMTP_PASSWORD").ok(),
                from_address: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "noreply@schedulite.local".to_string()),
            },
        }
    }
}
