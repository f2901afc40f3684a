//! Multi-step form API types
//!
//! Drafts carry raw strings so each malformed field can be reported
//! individually instead of failing the whole body.

use serde::{Deserialize, Serialize};

/// Partially filled helper form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct HelperFormDraft {
    pub full_name: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub employer_name: Option<String>,
    /// `YYYY-MM-DD`
    pub employment_start: Option<String>,
    /// `YYYY-MM-DD`
    pub employment_end: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Partially filled incident form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct IncidentFormDraft {
    pub helper_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub incident_date: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub attachments: Option<Vec<String>>,
}

/// One problem with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one form step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StepValidationResponse {
    pub step: usize,
    pub step_name: String,
    pub total_steps: usize,
    pub is_first_step: bool,
    pub is_last_step: bool,
    pub valid: bool,
    /// Step to show next; absent when invalid or on the last step
    pub next_step: Option<usize>,
    pub errors: Vec<FieldError>,
}
