use crate::auth::identity::{GoTrueClient, IdentityProvider};
use crate::config::AppConfig;
use crate::items::repo::{ItemStore, PgItemStore};
use crate::storage::{Storage, StorageClient};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ItemStore>,
    pub storage: Arc<dyn StorageClient>,
    pub identity: Arc<dyn IdentityProvider>,
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

impl AppState {
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;
        let identity =
            Arc::new(GoTrueClient::new(&config.identity)?) as Arc<dyn IdentityProvider>;
        let store = Arc::new(PgItemStore::new(db)) as Arc<dyn ItemStore>;

        Ok(Self::from_parts(Arc::new(config), store, storage, identity))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn ItemStore>,
        storage: Arc<dyn StorageClient>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            store,
            storage,
            identity,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        crate::testing::Fakes::new().state()
    }
}
