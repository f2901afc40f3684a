//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use helperbase_storage::RecordStore;

use crate::auth::AuthConfig;
use crate::cached_store::{ApiCache, CachedStore};
use crate::config::ApiConfig;

/// Application-wide state shared across all routes.
///
/// The cache is built here once per process and reaches handlers only
/// through [`CachedStore`].
#[derive(Clone)]
pub struct AppState {
    /// Record store behind the shared read cache.
    pub store: CachedStore,
    pub auth_config: Arc<AuthConfig>,
    pub api_config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, api_config: ApiConfig, auth_config: AuthConfig) -> Self {
        let cache = Arc::new(ApiCache::new(api_config.cache_config()));
        Self {
            store: CachedStore::new(store, cache),
            auth_config: Arc::new(auth_config),
            api_config: Arc::new(api_config),
            start_time: Instant::now(),
        }
    }

    pub fn cache(&self) -> &Arc<ApiCache> {
        self.store.cache()
    }
}

crate::impl_from_ref!(CachedStore, store);
crate::impl_from_ref!(Arc<AuthConfig>, auth_config);
crate::impl_from_ref!(Arc<ApiConfig>, api_config);
crate::impl_from_ref!(Instant, start_time);
