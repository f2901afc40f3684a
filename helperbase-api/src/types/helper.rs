//! Helper-related API types

use chrono::NaiveDate;
use helperbase_core::{Helper, HelperId, HelperStatus, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Request to create a new helper record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateHelperRequest {
    pub full_name: String,
    pub nationality: String,
    pub passport_number: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub employer_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_start: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_end: Option<NaiveDate>,
    /// Defaults to `active`
    pub status: Option<HelperStatus>,
    pub notes: Option<String>,
    /// URL of an already-uploaded photo
    pub photo_url: Option<String>,
}

impl CreateHelperRequest {
    /// Check required fields and date ordering.
    pub fn validate(&self) -> ApiResult<()> {
        self.full_name.validate_non_empty("full_name")?;
        self.nationality.validate_non_empty("nationality")?;
        crate::validation::validate_employment_dates(self.employment_start, self.employment_end)
    }

    /// Build the record to insert.
    pub fn into_helper(self, now: Timestamp) -> Helper {
        Helper {
            helper_id: HelperId::now_v7(),
            full_name: self.full_name.trim().to_string(),
            nationality: self.nationality.trim().to_string(),
            passport_number: self.passport_number,
            date_of_birth: self.date_of_birth,
            phone: self.phone,
            employer_name: self.employer_name,
            employment_start: self.employment_start,
            employment_end: self.employment_end,
            status: self.status.unwrap_or_default(),
            notes: self.notes,
            photo_url: self.photo_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing helper. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateHelperRequest {
    pub full_name: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub employer_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_start: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_end: Option<NaiveDate>,
    pub status: Option<HelperStatus>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl HasUpdates for UpdateHelperRequest {
    fn has_any_updates(&self) -> bool {
        self.full_name.is_some()
            || self.nationality.is_some()
            || self.passport_number.is_some()
            || self.date_of_birth.is_some()
            || self.phone.is_some()
            || self.employer_name.is_some()
            || self.employment_start.is_some()
            || self.employment_end.is_some()
            || self.status.is_some()
            || self.notes.is_some()
            || self.photo_url.is_some()
    }
}

impl UpdateHelperRequest {
    /// Apply the provided fields to `helper` and validate the result.
    pub fn apply_to(self, helper: &mut Helper, now: Timestamp) -> ApiResult<()> {
        self.validate_has_updates()?;
        if let Some(full_name) = self.full_name {
            full_name.validate_non_empty("full_name")?;
            helper.full_name = full_name.trim().to_string();
        }
        if let Some(nationality) = self.nationality {
            nationality.validate_non_empty("nationality")?;
            helper.nationality = nationality.trim().to_string();
        }
        if self.passport_number.is_some() {
            helper.passport_number = self.passport_number;
        }
        if self.date_of_birth.is_some() {
            helper.date_of_birth = self.date_of_birth;
        }
        if self.phone.is_some() {
            helper.phone = self.phone;
        }
        if self.employer_name.is_some() {
            helper.employer_name = self.employer_name;
        }
        if self.employment_start.is_some() {
            helper.employment_start = self.employment_start;
        }
        if self.employment_end.is_some() {
            helper.employment_end = self.employment_end;
        }
        if let Some(status) = self.status {
            helper.status = status;
        }
        if self.notes.is_some() {
            helper.notes = self.notes;
        }
        if self.photo_url.is_some() {
            helper.photo_url = self.photo_url;
        }
        crate::validation::validate_employment_dates(helper.employment_start, helper.employment_end)?;
        helper.updated_at = now;
        Ok(())
    }
}

/// Query parameters for listing helpers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListHelpersQuery {
    /// Filter by employment status
    pub status: Option<HelperStatus>,
    /// Case-insensitive match on name, employer or passport number
    pub search: Option<String>,
}

impl ListHelpersQuery {
    pub fn matches(&self, helper: &Helper) -> bool {
        if self.status.is_some_and(|s| s != helper.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let contains = |field: Option<&str>| {
                    field.is_some_and(|v| v.to_lowercase().contains(&needle))
                };
                contains(Some(helper.full_name.as_str()))
                    || contains(helper.employer_name.as_deref())
                    || contains(helper.passport_number.as_deref())
            }
        }
    }
}

/// Response containing a list of helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListHelpersResponse {
    pub helpers: Vec<Helper>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_request() -> CreateHelperRequest {
        CreateHelperRequest {
            full_name: "  Maria Santos ".to_string(),
            nationality: "Philippines".to_string(),
            passport_number: Some("P1234567".to_string()),
            date_of_birth: None,
            phone: None,
            employer_name: Some("Lee Family".to_string()),
            employment_start: NaiveDate::from_ymd_opt(2023, 1, 1),
            employment_end: None,
            status: None,
            notes: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_create_defaults_to_active_and_trims_name() {
        let req = create_request();
        assert!(req.validate().is_ok());
        let helper = req.into_helper(Utc::now());
        assert_eq!(helper.full_name, "Maria Santos");
        assert_eq!(helper.status, HelperStatus::Active);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let req = CreateHelperRequest {
            full_name: "   ".to_string(),
            ..create_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_requires_a_field() {
        let mut helper = create_request().into_helper(Utc::now());
        assert!(UpdateHelperRequest::default()
            .apply_to(&mut helper, Utc::now())
            .is_err());
    }

    #[test]
    fn test_update_rejects_end_before_start() {
        let mut helper = create_request().into_helper(Utc::now());
        let req = UpdateHelperRequest {
            employment_end: NaiveDate::from_ymd_opt(2022, 12, 31),
            ..Default::default()
        };
        assert!(req.apply_to(&mut helper, Utc::now()).is_err());
    }

    #[test]
    fn test_search_matches_employer_case_insensitively() {
        let helper = create_request().into_helper(Utc::now());
        let query = ListHelpersQuery {
            status: None,
            search: Some("lee".to_string()),
        };
        assert!(query.matches(&helper));

        let query = ListHelpersQuery {
            status: Some(HelperStatus::Terminated),
            search: None,
        };
        assert!(!query.matches(&helper));
    }
}
