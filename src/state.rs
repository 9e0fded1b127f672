use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::{
    jwt::JwtKeys,
    password,
    repo::{AccountStore, PgAccountStore},
};
use crate::config::AppConfig;
use crate::notify::gateway::{HttpSmsGateway, SmsGateway, UnconfiguredGateway};
use crate::reminders::repo::{PgReminderStore, ReminderStore};

#[derive(Clone)]
pub struct AppState {
    pub keys: JwtKeys,
    pub accounts: Arc<dyn AccountStore>,
    pub reminders: Arc<dyn ReminderStore>,
    pub sms: Arc<dyn SmsGateway>,
}

impl AppState {
    pub fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        password::warm_up();

        let sms: Arc<dyn SmsGateway> = match config.sms.clone() {
            Some(options) => {
                info!(api_url = %options.api_url, "sms gateway configured");
                Arc::new(HttpSmsGateway::new(options)?)
            }
            None => {
                warn!("SMS_USERNAME/SMS_API_KEY not set; /send_sms will fail");
                Arc::new(UnconfiguredGateway)
            }
        };

        Ok(Self::from_parts(
            &config,
            Arc::new(PgAccountStore::new(db.clone())),
            Arc::new(PgReminderStore::new(db)),
            sms,
        ))
    }

    pub fn from_parts(
        config: &AppConfig,
        accounts: Arc<dyn AccountStore>,
        reminders: Arc<dyn ReminderStore>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            keys: JwtKeys::new(&config.jwt),
            accounts,
            reminders,
            sms,
        }
    }

    /// In-memory stores and a recording SMS gateway; no database needed.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_gateway(Arc::new(crate::testing::FakeGateway::default()))
    }

    #[cfg(test)]
    pub fn fake_with_gateway(sms: Arc<dyn SmsGateway>) -> Self {
        use crate::testing::{test_config, MemoryAccounts, MemoryReminders};

        Self::from_parts(
            &test_config(),
            Arc::new(MemoryAccounts::default()),
            Arc::new(MemoryReminders::default()),
            sms,
        )
    }
}
