use crate::adapters::firebase::auth::{DATABASE_SCOPE, EMAIL_SCOPE, MESSAGING_SCOPE};
use crate::adapters::firebase::messaging::DEFAULT_MESSAGING_ENDPOINT;
use crate::adapters::firebase::{
    FcmGateway, RealtimeDbDirectory, ServiceAccountAuth, ServiceAccountKey,
};
use crate::adapters::{MemoryDirectory, MemoryPushGateway, MemoryRecordStore, SqliteRecordStore};
use crate::config::toml_config::{AppConfig, BackendMode};
use crate::core::notifier::LeaveNotifier;
use crate::domain::ports::{PushGateway, RealtimeDirectory, RecordStore};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// The port implementations chosen once at startup and shared by every call site.
#[derive(Clone)]
pub struct Backend {
    pub mode: BackendMode,
    pub store: Arc<dyn RecordStore>,
    pub push: Arc<dyn PushGateway>,
    pub directory: Arc<dyn RealtimeDirectory>,
}

impl Backend {
    pub fn new(
        mode: BackendMode,
        store: Arc<dyn RecordStore>,
        push: Arc<dyn PushGateway>,
        directory: Arc<dyn RealtimeDirectory>,
    ) -> Self {
        Self {
            mode,
            store,
            push,
            directory,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            BackendMode::InMemory,
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryPushGateway::new()),
            Arc::new(MemoryDirectory::new()),
        )
    }

    /// Builds the backend named by `backend.mode`. A remote backend that
    /// cannot be built is an error; there is no silent in-memory fallback.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.backend_mode() {
            BackendMode::InMemory => {
                tracing::info!("🧪 Using in-memory backend");
                Ok(Self::in_memory())
            }
            BackendMode::Remote => Self::remote(config),
        }
    }

    fn remote(config: &AppConfig) -> Result<Self> {
        let firebase = validate_required_field("firebase", &config.firebase)?;

        let store = SqliteRecordStore::open(&config.database.path)?;
        tracing::info!("🗄️ Opened database at {}", config.database.path);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()?;

        let key = ServiceAccountKey::from_file(&firebase.service_account_path)?;
        tracing::info!("🔑 Loaded service account {}", key.client_email);

        let auth = Arc::new(ServiceAccountAuth::new(
            key,
            &[MESSAGING_SCOPE, DATABASE_SCOPE, EMAIL_SCOPE],
            client.clone(),
        ));

        let endpoint = firebase
            .messaging_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_MESSAGING_ENDPOINT);
        let push = FcmGateway::new(auth.clone(), client.clone(), endpoint);
        let directory = RealtimeDbDirectory::new(auth, client, &firebase.database_url);

        Ok(Self::new(
            BackendMode::Remote,
            Arc::new(store),
            Arc::new(push),
            Arc::new(directory),
        ))
    }

    pub fn notifier(&self) -> LeaveNotifier {
        LeaveNotifier::new(self.directory.clone(), self.push.clone())
    }
}
