//! Validation
//!
//! Field validation traits shared by route handlers, plus the step
//! definitions and per-step checks of the helper and incident forms.

use chrono::NaiveDate;
use helperbase_core::{HelperStatus, IncidentSeverity, IncidentStatus, StepProgress, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::types::{FieldError, HelperFormDraft, IncidentFormDraft, StepValidationResponse};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use helperbase_api::validation::ValidateNonEmpty;
///
/// fn create_helper(full_name: &str) -> ApiResult<()> {
///     full_name.validate_non_empty("full_name")?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Returns `ApiError::missing_field` if the value is empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for checking if an update request has any fields set.
pub trait HasUpdates {
    /// Check if any update fields are set.
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::invalid_input(
                "At least one field must be provided for update",
            ));
        }
        Ok(())
    }
}

/// Employment may not end before it starts.
pub fn validate_employment_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ApiResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ApiError::validation_failed(
                "employment_end must not be before employment_start",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// FORM DEFINITIONS
// ============================================================================

/// Steps of the helper form.
pub const HELPER_FORM_STEPS: [&str; 3] = ["personal", "employment", "contact"];

/// Steps of the incident form.
pub const INCIDENT_FORM_STEPS: [&str; 3] = ["details", "classification", "resolution"];

/// Collects field errors for one step.
#[derive(Debug, Default)]
struct StepCheck {
    errors: Vec<FieldError>,
}

impl StepCheck {
    fn required<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v),
            None => {
                self.errors.push(FieldError::new(field, "is required"));
                None
            }
        }
    }

    fn optional<'a>(value: Option<&'a str>) -> Option<&'a str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors
                    .push(FieldError::new(field, "must be a date in YYYY-MM-DD format"));
                None
            }
        }
    }

    fn not_after(&mut self, field: &str, date: NaiveDate, today: NaiveDate) {
        if date > today {
            self.errors
                .push(FieldError::new(field, "must not be in the future"));
        }
    }

    fn parsed<T: std::str::FromStr>(&mut self, field: &str, value: &str, allowed: &str) -> Option<T> {
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.errors
                    .push(FieldError::new(field, format!("must be one of: {}", allowed)));
                None
            }
        }
    }

    fn url(&mut self, field: &str, value: &str) {
        if !(value.starts_with("https://") || value.starts_with("http://")) {
            self.errors
                .push(FieldError::new(field, "must be an http(s) URL"));
        }
    }
}

fn out_of_range(step: usize, total_steps: usize) -> ApiError {
    ValidationError::StepOutOfRange { step, total_steps }.into()
}

fn step_response(steps: &[&str], step: usize, errors: Vec<FieldError>) -> StepValidationResponse {
    let mut progress = StepProgress::at(steps.len(), step);
    let is_first_step = progress.is_first_step();
    let is_last_step = progress.is_last_step();
    let valid = errors.is_empty();
    let next_step = (valid && progress.go_to_next()).then(|| progress.active_step());
    StepValidationResponse {
        step,
        step_name: steps[progress.active_step()].to_string(),
        total_steps: progress.total_steps(),
        is_first_step,
        is_last_step,
        valid,
        next_step,
        errors,
    }
}

// ============================================================================
// HELPER FORM
// ============================================================================

/// Validate one step of the helper form against `draft`.
///
/// Fails only when `step` does not exist; field problems are reported in
/// the response.
pub fn validate_helper_step(
    step: usize,
    draft: &HelperFormDraft,
    today: NaiveDate,
) -> ApiResult<StepValidationResponse> {
    let Some(name) = HELPER_FORM_STEPS.get(step) else {
        return Err(out_of_range(step, HELPER_FORM_STEPS.len()));
    };
    let mut check = StepCheck::default();

    match *name {
        "personal" => {
            check.required("full_name", draft.full_name.as_deref());
            check.required("nationality", draft.nationality.as_deref());
            if let Some(passport) = StepCheck::optional(draft.passport_number.as_deref()) {
                let len = passport.chars().count();
                if !(6..=12).contains(&len) || !passport.chars().all(|c| c.is_ascii_alphanumeric()) {
                    check.errors.push(FieldError::new(
                        "passport_number",
                        "must be 6 to 12 letters or digits",
                    ));
                }
            }
            if let Some(dob) = StepCheck::optional(draft.date_of_birth.as_deref()) {
                if let Some(date) = check.date("date_of_birth", dob) {
                    check.not_after("date_of_birth", date, today);
                }
            }
        }
        "employment" => {
            let start = StepCheck::optional(draft.employment_start.as_deref())
                .and_then(|v| check.date("employment_start", v));
            let end = StepCheck::optional(draft.employment_end.as_deref())
                .and_then(|v| check.date("employment_end", v));
            if let (Some(start), Some(end)) = (start, end) {
                if end < start {
                    check.errors.push(FieldError::new(
                        "employment_end",
                        "must not be before employment_start",
                    ));
                }
            }
            if let Some(status) = StepCheck::optional(draft.status.as_deref()) {
                let status: Option<HelperStatus> =
                    check.parsed("status", status, "active, inactive, terminated");
                if status == Some(HelperStatus::Terminated) && end.is_none() {
                    check.errors.push(FieldError::new(
                        "employment_end",
                        "is required when status is terminated",
                    ));
                }
            }
        }
        _ => {
            if let Some(phone) = StepCheck::optional(draft.phone.as_deref()) {
                let digits = phone.chars().filter(char::is_ascii_digit).count();
                let allowed = phone
                    .chars()
                    .all(|c| c.is_ascii_digit() || " +-()".contains(c));
                if !allowed || digits < 7 {
                    check.errors.push(FieldError::new(
                        "phone",
                        "must contain at least 7 digits and only + - ( ) or spaces",
                    ));
                }
            }
            if let Some(url) = StepCheck::optional(draft.photo_url.as_deref()) {
                check.url("photo_url", url);
            }
        }
    }

    Ok(step_response(&HELPER_FORM_STEPS, step, check.errors))
}

// ============================================================================
// INCIDENT FORM
// ============================================================================

/// Validate one step of the incident form against `draft`.
pub fn validate_incident_step(
    step: usize,
    draft: &IncidentFormDraft,
    today: NaiveDate,
) -> ApiResult<StepValidationResponse> {
    let Some(name) = INCIDENT_FORM_STEPS.get(step) else {
        return Err(out_of_range(step, INCIDENT_FORM_STEPS.len()));
    };
    let mut check = StepCheck::default();

    match *name {
        "details" => {
            if let Some(id) = check.required("helper_id", draft.helper_id.as_deref()) {
                if id.parse::<uuid::Uuid>().is_err() {
                    check.errors.push(FieldError::new("helper_id", "must be a UUID"));
                }
            }
            check.required("title", draft.title.as_deref());
            check.required("description", draft.description.as_deref());
            if let Some(date) = check.required("incident_date", draft.incident_date.as_deref()) {
                if let Some(date) = check.date("incident_date", date) {
                    check.not_after("incident_date", date, today);
                }
            }
        }
        "classification" => {
            if let Some(severity) = check.required("severity", draft.severity.as_deref()) {
                let _: Option<IncidentSeverity> =
                    check.parsed("severity", severity, "low, medium, high, critical");
            }
            if let Some(status) = StepCheck::optional(draft.status.as_deref()) {
                let _: Option<IncidentStatus> = check.parsed(
                    "status",
                    status,
                    "open, investigating, resolved, closed",
                );
            }
        }
        _ => {
            let closed = StepCheck::optional(draft.status.as_deref())
                .and_then(|s| s.parse::<IncidentStatus>().ok())
                .is_some_and(|s| !s.is_open());
            if closed {
                check.required("resolution", draft.resolution.as_deref());
            }
            for url in draft.attachments.iter().flatten() {
                check.url("attachments", url);
            }
        }
    }

    Ok(step_response(&INCIDENT_FORM_STEPS, step, check.errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid day")
    }

    fn fields(response: &StepValidationResponse) -> Vec<&str> {
        response.errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_validate_non_empty_str() {
        assert!("hello".validate_non_empty("test").is_ok());
        assert!("".validate_non_empty("test").is_err());
        assert!("   ".validate_non_empty("test").is_err());
    }

    #[test]
    fn test_validate_non_empty_option() {
        let some_str: Option<&str> = Some("hello");
        let none_str: Option<&str> = None;
        assert!(some_str.validate_non_empty("test").is_ok());
        assert!(none_str.validate_non_empty("test").is_err());
    }

    #[test]
    fn test_employment_dates() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1);
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(validate_employment_dates(jan, feb).is_ok());
        assert!(validate_employment_dates(feb, jan).is_err());
        assert!(validate_employment_dates(None, jan).is_ok());
    }

    #[test]
    fn test_helper_personal_step_reports_missing_fields() -> ApiResult<()> {
        let response = validate_helper_step(0, &HelperFormDraft::default(), today())?;
        assert!(!response.valid);
        assert!(response.is_first_step);
        assert_eq!(response.step_name, "personal");
        assert_eq!(response.next_step, None);
        assert_eq!(fields(&response), vec!["full_name", "nationality"]);
        Ok(())
    }

    #[test]
    fn test_helper_personal_step_valid_moves_on() -> ApiResult<()> {
        let draft = HelperFormDraft {
            full_name: Some("Dewi Lestari".to_string()),
            nationality: Some("Indonesia".to_string()),
            date_of_birth: Some("1994-08-17".to_string()),
            ..Default::default()
        };
        let response = validate_helper_step(0, &draft, today())?;
        assert!(response.valid);
        assert_eq!(response.next_step, Some(1));
        Ok(())
    }

    #[test]
    fn test_future_birth_date_rejected() -> ApiResult<()> {
        let draft = HelperFormDraft {
            full_name: Some("A".to_string()),
            nationality: Some("B".to_string()),
            date_of_birth: Some("2030-01-01".to_string()),
            ..Default::default()
        };
        let response = validate_helper_step(0, &draft, today())?;
        assert_eq!(fields(&response), vec!["date_of_birth"]);
        Ok(())
    }

    #[test]
    fn test_terminated_needs_end_date() -> ApiResult<()> {
        let draft = HelperFormDraft {
            employment_start: Some("2022-01-01".to_string()),
            status: Some("terminated".to_string()),
            ..Default::default()
        };
        let response = validate_helper_step(1, &draft, today())?;
        assert_eq!(fields(&response), vec!["employment_end"]);

        let draft = HelperFormDraft {
            status: Some("retired".to_string()),
            ..Default::default()
        };
        let response = validate_helper_step(1, &draft, today())?;
        assert_eq!(fields(&response), vec!["status"]);
        Ok(())
    }

    #[test]
    fn test_last_step_has_no_next() -> ApiResult<()> {
        let response = validate_helper_step(2, &HelperFormDraft::default(), today())?;
        assert!(response.valid);
        assert!(response.is_last_step);
        assert_eq!(response.next_step, None);
        assert_eq!(response.total_steps, 3);

        let draft = HelperFormDraft {
            phone: Some("12ab".to_string()),
            ..Default::default()
        };
        let response = validate_helper_step(2, &draft, today())?;
        assert_eq!(fields(&response), vec!["phone"]);
        Ok(())
    }

    #[test]
    fn test_step_out_of_range() {
        let err = validate_helper_step(3, &HelperFormDraft::default(), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);
        let err = validate_incident_step(7, &IncidentFormDraft::default(), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);
    }

    #[test]
    fn test_incident_details_step() -> ApiResult<()> {
        let draft = IncidentFormDraft {
            helper_id: Some("not-a-uuid".to_string()),
            title: Some("Injury".to_string()),
            description: Some("Slipped on wet floor".to_string()),
            incident_date: Some("2024-05-31".to_string()),
            ..Default::default()
        };
        let response = validate_incident_step(0, &draft, today())?;
        assert_eq!(fields(&response), vec!["helper_id"]);
        Ok(())
    }

    #[test]
    fn test_incident_classification_requires_severity() -> ApiResult<()> {
        let response = validate_incident_step(1, &IncidentFormDraft::default(), today())?;
        assert_eq!(fields(&response), vec!["severity"]);

        let draft = IncidentFormDraft {
            severity: Some("HIGH".to_string()),
            ..Default::default()
        };
        assert!(validate_incident_step(1, &draft, today())?.valid);
        Ok(())
    }

    #[test]
    fn test_resolved_incident_needs_resolution() -> ApiResult<()> {
        let draft = IncidentFormDraft {
            status: Some("resolved".to_string()),
            attachments: Some(vec!["ftp://x".to_string()]),
            ..Default::default()
        };
        let response = validate_incident_step(2, &draft, today())?;
        assert_eq!(fields(&response), vec!["resolution", "attachments"]);

        let draft = IncidentFormDraft {
            status: Some("investigating".to_string()),
            ..Default::default()
        };
        assert!(validate_incident_step(2, &draft, today())?.valid);
        Ok(())
    }
}
