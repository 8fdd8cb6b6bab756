pub mod auth;
pub mod config;
pub mod error;
pub mod rest;
pub mod storage;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use anyhow::Result;

use auth::TokenSigner;
use config::ServerConfig;
use storage::Storage;
use tasks::TaskStorage;
use users::UserStorage;

/// Shared application state passed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    pub users: Arc<UserStorage>,
    pub tasks: Arc<TaskStorage>,
    /// Issues and verifies access tokens. The signing key lives at
    /// `{data_dir}/token_key` and must be kept secret.
    pub signer: Arc<TokenSigner>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Open storage under the configured data dir and wire up the context.
    pub async fn init(config: ServerConfig) -> Result<Arc<Self>> {
        let storage = Storage::new_with_slow_query(
            &config.data_dir,
            config.observability.slow_query_threshold_ms,
        )
        .await?;
        let signing_key = auth::get_or_create_signing_key(&config.data_dir)?;
        Ok(Self::with_storage(config, storage, signing_key))
    }

    /// Wire up the context around an already-open storage.
    /// Tests use this with an in-memory database.
    pub fn with_storage(
        config: ServerConfig,
        storage: Storage,
        signing_key: ed25519_dalek::SigningKey,
    ) -> Arc<Self> {
        let pool = storage.pool();
        let signer = TokenSigner::new(signing_key, config.auth.token_ttl_secs);
        Arc::new(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            users: Arc::new(UserStorage::new(pool.clone())),
            tasks: Arc::new(TaskStorage::new(pool)),
            signer: Arc::new(signer),
            started_at: std::time::Instant::now(),
        })
    }
}
