use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AuthService, CredentialHasher, FeedbackService, SeaOrmAccountService,
    SeaOrmAuthService, SeaOrmFeedbackService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub hasher: CredentialHasher,

    pub auth_service: Arc<dyn AuthService>,

    pub account_service: Arc<dyn AccountService>,

    pub feedback_service: Arc<dyn FeedbackService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services around an already-connected store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let hasher = CredentialHasher::new(&config.security)?;

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), hasher.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let account_service = Arc::new(SeaOrmAccountService::new(store.clone()))
            as Arc<dyn AccountService + Send + Sync + 'static>;

        let feedback_service = Arc::new(SeaOrmFeedbackService::new(store.clone()))
            as Arc<dyn FeedbackService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            hasher,
            auth_service,
            account_service,
            feedback_service,
        })
    }
}
