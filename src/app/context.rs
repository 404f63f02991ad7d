use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::app::{LinkdropError, Result};
use crate::bridge::HostBridge;
use crate::config::Config;
use crate::metadata::HttpMetadataFetcher;
use crate::share::ShareFlow;
use crate::store::SqliteStore;
use crate::thumbnail::{HttpImageFetcher, ThumbnailResolver};

/// Wires together every component: store, bridge, aggregator, resolver and
/// the extension-side save flow.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub bridge: HostBridge<SqliteStore>,
    pub aggregator: Aggregator,
    pub resolver: ThumbnailResolver<HttpMetadataFetcher, HttpImageFetcher>,
    pub flow: ShareFlow<SqliteStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };
        let store = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self::with_store(config, store))
    }

    pub fn in_memory() -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::with_store(Config::default(), store))
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Self {
        let metadata = Arc::new(HttpMetadataFetcher::new(&config));
        let images = Arc::new(HttpImageFetcher::new(&config));
        let resolver = ThumbnailResolver::new(metadata, images, &config);

        Self {
            bridge: HostBridge::new(store.clone()),
            aggregator: Aggregator::new(),
            resolver,
            flow: ShareFlow::new(store.clone()),
            store,
            config,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| LinkdropError::Config("Could not find data directory".into()))?;
        let linkdrop_dir = data_dir.join("linkdrop");
        std::fs::create_dir_all(&linkdrop_dir)?;
        Ok(linkdrop_dir.join("linkdrop.db"))
    }
}
