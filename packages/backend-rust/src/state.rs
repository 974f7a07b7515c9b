use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::db::Database;
use crate::services::phoneme_api::PhonemeApiClient;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    config: Arc<Config>,
    db: Database,
    phoneme_api: Option<Arc<PhonemeApiClient>>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let phoneme_api = config
            .phoneme_api_url
            .as_deref()
            .map(|url| Arc::new(PhonemeApiClient::new(url)));

        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
            db,
            phoneme_api,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn phoneme_api(&self) -> Option<Arc<PhonemeApiClient>> {
        self.phoneme_api.clone()
    }
}
