pub mod config;
pub mod controllers;
pub mod middleware;
pub mod models;
pub mod schedule;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::services::mailer::{Mailer, SmtpMailer};
use crate::store::Store;

// Shared state for the whole application: configuration and store handles
// constructed once at startup and passed into handlers and the sweep
pub struct AppState {
    pub store: Store,
    pub mailer: Arc<dyn Mailer>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store = Store::new(&config.store.data_dir);
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::from_config(&config.mail)?);

        Ok(Arc::new(Self {
            store,
            mailer,
            config,
        }))
    }
}
