//! Cached Record Store
//!
//! `CachedStore` wraps the record store with the process-wide
//! [`ApiCache`]. List reads, helper profiles and the dashboard go through
//! `get_or_set`; every mutation invalidates the keys that could now be
//! stale.
//!
//! | Mutation | Invalidated |
//! |----------|-------------|
//! | helper create/update | `helper-*`, `helpers`, `dashboard-metrics` |
//! | helper delete | the above plus `incidents` |
//! | incident create/update/delete | `incidents`, `dashboard-metrics`, `helper-incidents-{id}` |
//! | user create/update/delete | `users` |

use std::sync::Arc;

use chrono::Utc;
use helperbase_core::{
    DashboardMetrics, Helper, HelperId, Incident, IncidentId, User, UserId,
};
use helperbase_storage::{keys, BoundedTtlCache, RecordStore};

use crate::error::{ApiError, ApiResult};

/// Payloads the API keeps in its cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Helpers(Vec<Helper>),
    Helper(Helper),
    Incidents(Vec<Incident>),
    Users(Vec<User>),
    Metrics(DashboardMetrics),
}

/// Cache shared by every request handler.
pub type ApiCache = BoundedTtlCache<CachedValue>;

fn unexpected(key: &str) -> ApiError {
    tracing::error!(key, "Cache entry holds an unexpected payload");
    ApiError::internal_error("Cache entry holds an unexpected payload")
}

/// Record store with read-through caching and write invalidation.
#[derive(Clone)]
pub struct CachedStore {
    store: Arc<dyn RecordStore>,
    cache: Arc<ApiCache>,
}

impl CachedStore {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<ApiCache>) -> Self {
        Self { store, cache }
    }

    /// The uncached store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<ApiCache> {
        &self.cache
    }

    pub async fn health_check(&self) -> ApiResult<bool> {
        Ok(self.store.health_check().await?)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    pub async fn helper_list(&self) -> ApiResult<Vec<Helper>> {
        let value = self
            .cache
            .get_or_set(keys::HELPERS, move || async move {
                Ok::<_, ApiError>(CachedValue::Helpers(self.store.helper_list().await?))
            })
            .await?;
        match value {
            CachedValue::Helpers(helpers) => Ok(helpers),
            _ => Err(unexpected(keys::HELPERS)),
        }
    }

    /// Fetch one helper. A missing helper is a 404 and is not cached.
    pub async fn helper_get(&self, id: HelperId) -> ApiResult<Helper> {
        let key = keys::helper_profile(id);
        let value = self
            .cache
            .get_or_set(&key, move || async move {
                self.store
                    .helper_get(id)
                    .await?
                    .map(CachedValue::Helper)
                    .ok_or_else(|| ApiError::helper_not_found(id))
            })
            .await?;
        match value {
            CachedValue::Helper(helper) => Ok(helper),
            _ => Err(unexpected(&key)),
        }
    }

    /// Fail with 404 unless the helper row exists right now.
    ///
    /// Reads the store directly. Use this before writes that reference a
    /// helper, where a cached profile may outlive the row.
    pub async fn require_helper(&self, id: HelperId) -> ApiResult<()> {
        match self.store.helper_get(id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::helper_not_found(id)),
        }
    }

    pub async fn helper_incidents(&self, id: HelperId) -> ApiResult<Vec<Incident>> {
        let key = keys::helper_incidents(id);
        let value = self
            .cache
            .get_or_set(&key, move || async move {
                Ok::<_, ApiError>(CachedValue::Incidents(
                    self.store.incident_list_by_helper(id).await?,
                ))
            })
            .await?;
        match value {
            CachedValue::Incidents(incidents) => Ok(incidents),
            _ => Err(unexpected(&key)),
        }
    }

    pub async fn helper_create(&self, helper: &Helper) -> ApiResult<()> {
        self.store.helper_insert(helper).await?;
        self.invalidate_helpers();
        Ok(())
    }

    pub async fn helper_update(&self, helper: &Helper) -> ApiResult<()> {
        self.store.helper_update(helper).await?;
        self.invalidate_helpers();
        Ok(())
    }

    /// Delete a helper. The store also drops the helper's incidents.
    pub async fn helper_delete(&self, id: HelperId) -> ApiResult<()> {
        self.store.helper_delete(id).await?;
        self.invalidate_helpers();
        self.cache.delete(keys::INCIDENTS);
        Ok(())
    }

    fn invalidate_helpers(&self) {
        self.cache.invalidate_pattern(keys::HELPER_PATTERN);
        self.cache.delete(keys::HELPERS);
        self.cache.delete(keys::DASHBOARD_METRICS);
    }

    // ========================================================================
    // INCIDENTS
    // ========================================================================

    pub async fn incident_list(&self) -> ApiResult<Vec<Incident>> {
        let value = self
            .cache
            .get_or_set(keys::INCIDENTS, move || async move {
                Ok::<_, ApiError>(CachedValue::Incidents(self.store.incident_list().await?))
            })
            .await?;
        match value {
            CachedValue::Incidents(incidents) => Ok(incidents),
            _ => Err(unexpected(keys::INCIDENTS)),
        }
    }

    pub async fn incident_get(&self, id: IncidentId) -> ApiResult<Incident> {
        self.store
            .incident_get(id)
            .await?
            .ok_or_else(|| ApiError::incident_not_found(id))
    }

    pub async fn incident_create(&self, incident: &Incident) -> ApiResult<()> {
        self.store.incident_insert(incident).await?;
        self.invalidate_incidents(incident.helper_id);
        Ok(())
    }

    /// Update an incident. `previous_helper` is invalidated too when the
    /// incident moved to another helper.
    pub async fn incident_update(
        &self,
        incident: &Incident,
        previous_helper: HelperId,
    ) -> ApiResult<()> {
        self.store.incident_update(incident).await?;
        self.invalidate_incidents(incident.helper_id);
        if previous_helper != incident.helper_id {
            self.cache.delete(&keys::helper_incidents(previous_helper));
        }
        Ok(())
    }

    pub async fn incident_delete(&self, incident: &Incident) -> ApiResult<()> {
        self.store.incident_delete(incident.incident_id).await?;
        self.invalidate_incidents(incident.helper_id);
        Ok(())
    }

    fn invalidate_incidents(&self, helper_id: HelperId) {
        self.cache.delete(keys::INCIDENTS);
        self.cache.delete(keys::DASHBOARD_METRICS);
        self.cache.delete(&keys::helper_incidents(helper_id));
    }

    // ========================================================================
    // USERS
    // ========================================================================

    pub async fn user_list(&self) -> ApiResult<Vec<User>> {
        let value = self
            .cache
            .get_or_set(keys::USERS, move || async move {
                Ok::<_, ApiError>(CachedValue::Users(self.store.user_list().await?))
            })
            .await?;
        match value {
            CachedValue::Users(users) => Ok(users),
            _ => Err(unexpected(keys::USERS)),
        }
    }

    /// Uncached so role changes are seen on the next request.
    pub async fn user_get(&self, id: UserId) -> ApiResult<Option<User>> {
        Ok(self.store.user_get(id).await?)
    }

    /// Uncached so logins always see the current password hash.
    pub async fn user_find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.store.user_find_by_email(email).await?)
    }

    pub async fn user_create(&self, user: &User) -> ApiResult<()> {
        self.store.user_insert(user).await?;
        self.cache.delete(keys::USERS);
        Ok(())
    }

    pub async fn user_update(&self, user: &User) -> ApiResult<()> {
        self.store.user_update(user).await?;
        self.cache.delete(keys::USERS);
        Ok(())
    }

    pub async fn user_delete(&self, id: UserId) -> ApiResult<()> {
        self.store.user_delete(id).await?;
        self.cache.delete(keys::USERS);
        Ok(())
    }

    // ========================================================================
    // DASHBOARD
    // ========================================================================

    pub async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        let value = self
            .cache
            .get_or_set(keys::DASHBOARD_METRICS, move || async move {
                let helpers = self.helper_list().await?;
                let incidents = self.incident_list().await?;
                Ok::<_, ApiError>(CachedValue::Metrics(DashboardMetrics::compute(
                    &helpers,
                    &incidents,
                    Utc::now(),
                )))
            })
            .await?;
        match value {
            CachedValue::Metrics(metrics) => Ok(metrics),
            _ => Err(unexpected(keys::DASHBOARD_METRICS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use helperbase_storage::{CacheConfig, InMemoryRecordStore};
    use helperbase_test_utils::{fixtures, UnavailableRecordStore};

    fn cached(store: Arc<dyn RecordStore>) -> CachedStore {
        CachedStore::new(store, Arc::new(ApiCache::new(CacheConfig::default())))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).expect("valid day")
    }

    #[tokio::test]
    async fn test_helper_list_is_served_from_cache_until_a_write() -> ApiResult<()> {
        let raw = Arc::new(InMemoryRecordStore::new());
        let store = cached(raw.clone());

        store.helper_create(&fixtures::active_helper("Ana")).await?;
        assert_eq!(store.helper_list().await?.len(), 1);

        // A write that bypasses the cached store is not visible yet.
        raw.helper_insert(&fixtures::active_helper("Bea")).await?;
        assert_eq!(store.helper_list().await?.len(), 1);

        store.helper_create(&fixtures::active_helper("Cora")).await?;
        assert_eq!(store.helper_list().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_helper_update_invalidates_profile() -> ApiResult<()> {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let mut helper = fixtures::active_helper("Ana");
        store.helper_create(&helper).await?;
        assert!(store.helper_get(helper.helper_id).await?.is_active());
        assert!(store.cache().has(&keys::helper_profile(helper.helper_id)));

        helper.status = helperbase_core::HelperStatus::Inactive;
        store.helper_update(&helper).await?;
        assert!(!store.cache().has(&keys::helper_profile(helper.helper_id)));
        assert!(!store.helper_get(helper.helper_id).await?.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_helper_is_not_cached() {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let id = HelperId::now_v7();
        let err = store.helper_get(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::HelperNotFound);
        assert!(store.cache().is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_are_not_cached() {
        let raw = Arc::new(UnavailableRecordStore::new());
        let store = cached(raw.clone());

        assert!(store.helper_list().await.is_err());
        assert!(store.helper_list().await.is_err());
        assert_eq!(raw.calls(), 2);
        assert!(store.cache().is_empty());
    }

    #[tokio::test]
    async fn test_incident_writes_invalidate_dashboard_and_helper_incidents() -> ApiResult<()> {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let helper = fixtures::active_helper("Ana");
        store.helper_create(&helper).await?;

        let before = store.dashboard_metrics().await?;
        assert_eq!(before.total_incidents, 0);
        assert!(store.helper_incidents(helper.helper_id).await?.is_empty());

        store
            .incident_create(&fixtures::open_incident(helper.helper_id, day(3)))
            .await?;

        let after = store.dashboard_metrics().await?;
        assert_eq!(after.total_incidents, 1);
        assert_eq!(after.open_incidents, 1);
        assert_eq!(store.helper_incidents(helper.helper_id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_moving_incident_invalidates_both_helpers() -> ApiResult<()> {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let from = fixtures::active_helper("From");
        let to = fixtures::active_helper("To");
        store.helper_create(&from).await?;
        store.helper_create(&to).await?;

        let mut incident = fixtures::open_incident(from.helper_id, day(5));
        store.incident_create(&incident).await?;
        assert_eq!(store.helper_incidents(from.helper_id).await?.len(), 1);
        assert!(store.helper_incidents(to.helper_id).await?.is_empty());

        incident.helper_id = to.helper_id;
        store.incident_update(&incident, from.helper_id).await?;
        assert!(store.helper_incidents(from.helper_id).await?.is_empty());
        assert_eq!(store.helper_incidents(to.helper_id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_helper_delete_drops_incident_list() -> ApiResult<()> {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let helper = fixtures::active_helper("Ana");
        store.helper_create(&helper).await?;
        store
            .incident_create(&fixtures::open_incident(helper.helper_id, day(1)))
            .await?;
        assert_eq!(store.incident_list().await?.len(), 1);

        store.helper_delete(helper.helper_id).await?;
        assert!(store.incident_list().await?.is_empty());
        assert!(store.helper_list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_fetched_across_a_delete_is_not_cached() -> ApiResult<()> {
        let raw = Arc::new(InMemoryRecordStore::new());
        let store = cached(raw.clone());
        let helper = fixtures::active_helper("Ana");
        store.helper_create(&helper).await?;
        let id = helper.helper_id;

        // The read lands before the delete, the cache write after it.
        let key = keys::helper_profile(id);
        let store_ref = &store;
        let raced = store
            .cache()
            .get_or_set(&key, move || async move {
                let row = store_ref.store().helper_get(id).await?;
                store_ref.helper_delete(id).await?;
                row.map(CachedValue::Helper)
                    .ok_or_else(|| ApiError::helper_not_found(id))
            })
            .await?;
        assert!(matches!(raced, CachedValue::Helper(_)));
        assert_eq!(raw.helper_count(), 0);

        let err = store.helper_get(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::HelperNotFound);

        let err = store.require_helper(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::HelperNotFound);
        let err = store
            .incident_create(&fixtures::open_incident(id, day(2)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::HelperNotFound);
        assert_eq!(raw.incident_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_require_helper_ignores_cached_profile() -> ApiResult<()> {
        let raw = Arc::new(InMemoryRecordStore::new());
        let store = cached(raw.clone());
        let helper = fixtures::active_helper("Bea");
        store.helper_create(&helper).await?;
        store.helper_get(helper.helper_id).await?;

        // Removed behind the cache's back; the profile is still cached.
        raw.helper_delete(helper.helper_id).await?;
        assert!(store.cache().has(&keys::helper_profile(helper.helper_id)));

        let err = store.require_helper(helper.helper_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::HelperNotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_writes_invalidate_user_list() -> ApiResult<()> {
        let store = cached(Arc::new(InMemoryRecordStore::new()));
        let admin = fixtures::user("admin@example.org", helperbase_core::Role::Admin, "x$y");
        store.user_create(&admin).await?;
        assert_eq!(store.user_list().await?.len(), 1);

        store.user_delete(admin.user_id).await?;
        assert!(store.user_list().await?.is_empty());
        Ok(())
    }
}
