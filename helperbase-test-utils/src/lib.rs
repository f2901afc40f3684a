//! Helperbase Test Utilities
//!
//! Shared test infrastructure for the Helperbase workspace:
//! - Proptest generators for roles, actions and record enums
//! - Fixtures for helpers, incidents and users
//! - A record store that always fails, for error-path tests
//! - Assertions on `HelperbaseResult`

pub use helperbase_core::{
    Action, EntityType, Helper, HelperId, HelperStatus, HelperbaseError, HelperbaseResult,
    Incident, IncidentId, IncidentSeverity, IncidentStatus, Role, StorageError, Timestamp, User,
    UserId,
};
pub use helperbase_storage::{InMemoryRecordStore, RecordStore};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// MOCK STORES
// ============================================================================

/// Record store whose every call fails with `StorageError::Unavailable`.
///
/// Counts calls so tests can check that failures are not cached.
#[derive(Debug, Default)]
pub struct UnavailableRecordStore {
    calls: AtomicUsize,
}

impl UnavailableRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> HelperbaseResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable {
            reason: "sheet backend offline".to_string(),
        }
        .into())
    }
}

#[async_trait]
impl RecordStore for UnavailableRecordStore {
    async fn helper_list(&self) -> HelperbaseResult<Vec<Helper>> {
        self.fail()
    }

    async fn helper_get(&self, _id: HelperId) -> HelperbaseResult<Option<Helper>> {
        self.fail()
    }

    async fn helper_insert(&self, _helper: &Helper) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn helper_update(&self, _helper: &Helper) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn helper_delete(&self, _id: HelperId) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn incident_list(&self) -> HelperbaseResult<Vec<Incident>> {
        self.fail()
    }

    async fn incident_list_by_helper(&self, _helper_id: HelperId) -> HelperbaseResult<Vec<Incident>> {
        self.fail()
    }

    async fn incident_get(&self, _id: IncidentId) -> HelperbaseResult<Option<Incident>> {
        self.fail()
    }

    async fn incident_insert(&self, _incident: &Incident) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn incident_update(&self, _incident: &Incident) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn incident_delete(&self, _id: IncidentId) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn user_list(&self) -> HelperbaseResult<Vec<User>> {
        self.fail()
    }

    async fn user_get(&self, _id: UserId) -> HelperbaseResult<Option<User>> {
        self.fail()
    }

    async fn user_find_by_email(&self, _email: &str) -> HelperbaseResult<Option<User>> {
        self.fail()
    }

    async fn user_insert(&self, _user: &User) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn user_update(&self, _user: &User) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn user_delete(&self, _id: UserId) -> HelperbaseResult<()> {
        self.fail()
    }

    async fn health_check(&self) -> HelperbaseResult<bool> {
        self.fail()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Helperbase types.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_helper_id() -> impl Strategy<Value = HelperId> {
        arb_uuid().prop_map(HelperId::new)
    }

    pub fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Viewer), Just(Role::Staff), Just(Role::Admin)]
    }

    pub fn arb_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    pub fn arb_helper_status() -> impl Strategy<Value = HelperStatus> {
        prop_oneof![
            Just(HelperStatus::Active),
            Just(HelperStatus::Inactive),
            Just(HelperStatus::Terminated),
        ]
    }

    pub fn arb_incident_severity() -> impl Strategy<Value = IncidentSeverity> {
        prop::sample::select(IncidentSeverity::ALL.to_vec())
    }

    pub fn arb_incident_status() -> impl Strategy<Value = IncidentStatus> {
        prop_oneof![
            Just(IncidentStatus::Open),
            Just(IncidentStatus::Investigating),
            Just(IncidentStatus::Resolved),
            Just(IncidentStatus::Closed),
        ]
    }

    /// A short printable string that is never blank.
    pub fn arb_non_blank() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,23}"
    }

    /// An email address in lowercase.
    pub fn arb_email() -> impl Strategy<Value = String> {
        "[a-z]{1,12}@[a-z]{1,10}\\.(org|com)"
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common test scenarios.

    use super::*;
    use chrono::{NaiveDate, Utc};

    /// An active helper with an employer and a start date.
    pub fn active_helper(full_name: &str) -> Helper {
        let now = Utc::now();
        Helper {
            helper_id: HelperId::now_v7(),
            full_name: full_name.to_string(),
            nationality: "Philippines".to_string(),
            passport_number: Some("P7654321".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1991, 3, 14),
            phone: Some("+852 5555 0101".to_string()),
            employer_name: Some("Wong Household".to_string()),
            employment_start: NaiveDate::from_ymd_opt(2023, 6, 1),
            employment_end: None,
            status: HelperStatus::Active,
            notes: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A helper whose contract has ended.
    pub fn terminated_helper(full_name: &str) -> Helper {
        Helper {
            status: HelperStatus::Terminated,
            employment_end: NaiveDate::from_ymd_opt(2024, 2, 29),
            ..active_helper(full_name)
        }
    }

    /// An open incident for `helper_id` on the given day.
    pub fn open_incident(helper_id: HelperId, incident_date: NaiveDate) -> Incident {
        let now = Utc::now();
        Incident {
            incident_id: IncidentId::now_v7(),
            helper_id,
            title: "Unpaid overtime".to_string(),
            description: "Worked two public holidays without compensation".to_string(),
            incident_date,
            severity: IncidentSeverity::Medium,
            status: IncidentStatus::Open,
            reported_by: "staff@example.org".to_string(),
            resolution: None,
            attachments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// A user with the given role and stored password hash.
    pub fn user(email: &str, role: Role, password_hash: &str) -> User {
        let now = Utc::now();
        User {
            user_id: UserId::now_v7(),
            email: email.to_string(),
            name: format!("{} user", role),
            role,
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on `HelperbaseResult` values.

    use super::*;

    /// Assert that a HelperbaseResult is a NotFound storage error for `entity_type`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(
        result: &HelperbaseResult<T>,
        entity_type: EntityType,
    ) {
        match result {
            Err(HelperbaseError::Storage(StorageError::NotFound { entity_type: et, .. })) => {
                assert_eq!(*et, entity_type, "Wrong entity type in NotFound error");
            }
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert that a HelperbaseResult is a Duplicate storage error.
    #[track_caller]
    pub fn assert_duplicate<T: std::fmt::Debug>(result: &HelperbaseResult<T>) {
        match result {
            Err(HelperbaseError::Storage(StorageError::Duplicate { .. })) => {}
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }
}
