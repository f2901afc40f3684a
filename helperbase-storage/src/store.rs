//! Record store for the helper, incident and user sheets.
//!
//! Each sheet is an ordered list of rows. Rows are located by scanning for a
//! matching id, the same way the hosted spreadsheet this replaces was read.

use async_trait::async_trait;
use helperbase_core::{
    EntityType, Helper, HelperId, HelperbaseResult, Incident, IncidentId, StorageError, User,
    UserId,
};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Async CRUD over the three sheets.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ========================================================================
    // HELPER OPERATIONS
    // ========================================================================

    /// All helpers in sheet order.
    async fn helper_list(&self) -> HelperbaseResult<Vec<Helper>>;

    async fn helper_get(&self, id: HelperId) -> HelperbaseResult<Option<Helper>>;

    /// Append a helper. Fails with `Duplicate` if the id is taken.
    async fn helper_insert(&self, helper: &Helper) -> HelperbaseResult<()>;

    /// Replace the row with the same id. Fails with `NotFound` if absent.
    async fn helper_update(&self, helper: &Helper) -> HelperbaseResult<()>;

    /// Remove a helper together with every incident filed against them.
    async fn helper_delete(&self, id: HelperId) -> HelperbaseResult<()>;

    // ========================================================================
    // INCIDENT OPERATIONS
    // ========================================================================

    async fn incident_list(&self) -> HelperbaseResult<Vec<Incident>>;

    async fn incident_list_by_helper(&self, helper_id: HelperId) -> HelperbaseResult<Vec<Incident>>;

    async fn incident_get(&self, id: IncidentId) -> HelperbaseResult<Option<Incident>>;

    /// Append an incident. Fails with `NotFound` unless its helper exists.
    async fn incident_insert(&self, incident: &Incident) -> HelperbaseResult<()>;

    /// Replace the incident row. Fails with `NotFound` if the incident or
    /// its helper is absent.
    async fn incident_update(&self, incident: &Incident) -> HelperbaseResult<()>;

    async fn incident_delete(&self, id: IncidentId) -> HelperbaseResult<()>;

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    async fn user_list(&self) -> HelperbaseResult<Vec<User>>;

    async fn user_get(&self, id: UserId) -> HelperbaseResult<Option<User>>;

    /// Case-insensitive lookup by email.
    async fn user_find_by_email(&self, email: &str) -> HelperbaseResult<Option<User>>;

    /// Append a user. Fails with `Duplicate` if the id or email is taken.
    async fn user_insert(&self, user: &User) -> HelperbaseResult<()>;

    async fn user_update(&self, user: &User) -> HelperbaseResult<()>;

    async fn user_delete(&self, id: UserId) -> HelperbaseResult<()>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Whether the backing store can currently be read.
    async fn health_check(&self) -> HelperbaseResult<bool>;
}

/// Row-scan store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    helpers: RwLock<Vec<Helper>>,
    incidents: RwLock<Vec<Incident>>,
    users: RwLock<Vec<User>>,
}

fn read<T>(sheet: &RwLock<Vec<T>>) -> Result<RwLockReadGuard<'_, Vec<T>>, StorageError> {
    sheet.read().map_err(|_| StorageError::LockPoisoned)
}

fn write<T>(sheet: &RwLock<Vec<T>>) -> Result<RwLockWriteGuard<'_, Vec<T>>, StorageError> {
    sheet.write().map_err(|_| StorageError::LockPoisoned)
}

/// An incident row must point at an existing helper row.
fn require_helper(helpers: &[Helper], id: HelperId) -> Result<(), StorageError> {
    if helpers.iter().any(|h| h.helper_id == id) {
        Ok(())
    } else {
        Err(StorageError::NotFound {
            entity_type: EntityType::Helper,
            id: id.as_uuid(),
        })
    }
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored helpers.
    pub fn helper_count(&self) -> usize {
        read(&self.helpers).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Get count of stored incidents.
    pub fn incident_count(&self) -> usize {
        read(&self.incidents).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Get count of stored users.
    pub fn user_count(&self) -> usize {
        read(&self.users).map(|rows| rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn helper_list(&self) -> HelperbaseResult<Vec<Helper>> {
        Ok(read(&self.helpers)?.clone())
    }

    async fn helper_get(&self, id: HelperId) -> HelperbaseResult<Option<Helper>> {
        let rows = read(&self.helpers)?;
        Ok(rows.iter().find(|h| h.helper_id == id).cloned())
    }

    async fn helper_insert(&self, helper: &Helper) -> HelperbaseResult<()> {
        let mut rows = write(&self.helpers)?;
        if rows.iter().any(|h| h.helper_id == helper.helper_id) {
            return Err(StorageError::Duplicate {
                entity_type: EntityType::Helper,
                reason: format!("id {} already exists", helper.helper_id),
            }
            .into());
        }
        rows.push(helper.clone());
        Ok(())
    }

    async fn helper_update(&self, helper: &Helper) -> HelperbaseResult<()> {
        let mut rows = write(&self.helpers)?;
        let row = rows
            .iter_mut()
            .find(|h| h.helper_id == helper.helper_id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::Helper,
                id: helper.helper_id.as_uuid(),
            })?;
        *row = helper.clone();
        Ok(())
    }

    async fn helper_delete(&self, id: HelperId) -> HelperbaseResult<()> {
        // Lock order is helpers then incidents, so no incident can be
        // filed against the helper between the row removal and the cascade.
        let mut helpers = write(&self.helpers)?;
        let index = helpers
            .iter()
            .position(|h| h.helper_id == id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::Helper,
                id: id.as_uuid(),
            })?;
        let mut incidents = write(&self.incidents)?;
        helpers.remove(index);
        let before = incidents.len();
        incidents.retain(|i| i.helper_id != id);
        debug!(helper_id = %id, removed = before - incidents.len(), "Removed incidents of deleted helper");
        Ok(())
    }

    async fn incident_list(&self) -> HelperbaseResult<Vec<Incident>> {
        Ok(read(&self.incidents)?.clone())
    }

    async fn incident_list_by_helper(&self, helper_id: HelperId) -> HelperbaseResult<Vec<Incident>> {
        let rows = read(&self.incidents)?;
        Ok(rows
            .iter()
            .filter(|i| i.helper_id == helper_id)
            .cloned()
            .collect())
    }

    async fn incident_get(&self, id: IncidentId) -> HelperbaseResult<Option<Incident>> {
        let rows = read(&self.incidents)?;
        Ok(rows.iter().find(|i| i.incident_id == id).cloned())
    }

    async fn incident_insert(&self, incident: &Incident) -> HelperbaseResult<()> {
        let helpers = read(&self.helpers)?;
        require_helper(&helpers, incident.helper_id)?;
        let mut rows = write(&self.incidents)?;
        if rows.iter().any(|i| i.incident_id == incident.incident_id) {
            return Err(StorageError::Duplicate {
                entity_type: EntityType::Incident,
                reason: format!("id {} already exists", incident.incident_id),
            }
            .into());
        }
        rows.push(incident.clone());
        Ok(())
    }

    async fn incident_update(&self, incident: &Incident) -> HelperbaseResult<()> {
        let helpers = read(&self.helpers)?;
        require_helper(&helpers, incident.helper_id)?;
        let mut rows = write(&self.incidents)?;
        let row = rows
            .iter_mut()
            .find(|i| i.incident_id == incident.incident_id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::Incident,
                id: incident.incident_id.as_uuid(),
            })?;
        *row = incident.clone();
        Ok(())
    }

    async fn incident_delete(&self, id: IncidentId) -> HelperbaseResult<()> {
        let mut rows = write(&self.incidents)?;
        let index = rows
            .iter()
            .position(|i| i.incident_id == id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::Incident,
                id: id.as_uuid(),
            })?;
        rows.remove(index);
        Ok(())
    }

    async fn user_list(&self) -> HelperbaseResult<Vec<User>> {
        Ok(read(&self.users)?.clone())
    }

    async fn user_get(&self, id: UserId) -> HelperbaseResult<Option<User>> {
        let rows = read(&self.users)?;
        Ok(rows.iter().find(|u| u.user_id == id).cloned())
    }

    async fn user_find_by_email(&self, email: &str) -> HelperbaseResult<Option<User>> {
        let rows = read(&self.users)?;
        Ok(rows.iter().find(|u| u.has_email(email)).cloned())
    }

    async fn user_insert(&self, user: &User) -> HelperbaseResult<()> {
        let mut rows = write(&self.users)?;
        if rows.iter().any(|u| u.user_id == user.user_id) {
            return Err(StorageError::Duplicate {
                entity_type: EntityType::User,
                reason: format!("id {} already exists", user.user_id),
            }
            .into());
        }
        if rows.iter().any(|u| u.has_email(&user.email)) {
            return Err(StorageError::Duplicate {
                entity_type: EntityType::User,
                reason: format!("email {} is already registered", user.email),
            }
            .into());
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn user_update(&self, user: &User) -> HelperbaseResult<()> {
        let mut rows = write(&self.users)?;
        if rows
            .iter()
            .any(|u| u.user_id != user.user_id && u.has_email(&user.email))
        {
            return Err(StorageError::Duplicate {
                entity_type: EntityType::User,
                reason: format!("email {} is already registered", user.email),
            }
            .into());
        }
        let row = rows
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::User,
                id: user.user_id.as_uuid(),
            })?;
        *row = user.clone();
        Ok(())
    }

    async fn user_delete(&self, id: UserId) -> HelperbaseResult<()> {
        let mut rows = write(&self.users)?;
        let index = rows
            .iter()
            .position(|u| u.user_id == id)
            .ok_or(StorageError::NotFound {
                entity_type: EntityType::User,
                id: id.as_uuid(),
            })?;
        rows.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> HelperbaseResult<bool> {
        Ok(read(&self.helpers).is_ok() && read(&self.incidents).is_ok() && read(&self.users).is_ok())
    }
}
