//! Incident-related API types

use chrono::NaiveDate;
use helperbase_core::{
    HelperId, Incident, IncidentId, IncidentSeverity, IncidentStatus, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Request to file a new incident against a helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateIncidentRequest {
    /// Helper the incident concerns (must exist)
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub helper_id: HelperId,
    pub title: String,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub incident_date: NaiveDate,
    /// Defaults to `low`
    pub severity: Option<IncidentSeverity>,
    /// Defaults to `open`
    pub status: Option<IncidentStatus>,
    pub resolution: Option<String>,
    /// URLs of already-uploaded media
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl CreateIncidentRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.title.validate_non_empty("title")?;
        self.description.validate_non_empty("description")?;
        validate_attachments(&self.attachments)
    }

    /// Build the record to insert. `reported_by` is the caller's email.
    pub fn into_incident(self, reported_by: &str, now: Timestamp) -> Incident {
        Incident {
            incident_id: IncidentId::now_v7(),
            helper_id: self.helper_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            incident_date: self.incident_date,
            severity: self.severity.unwrap_or(IncidentSeverity::Low),
            status: self.status.unwrap_or_default(),
            reported_by: reported_by.to_string(),
            resolution: self.resolution,
            attachments: self.attachments,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an incident. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateIncidentRequest {
    /// Move the incident to another helper (must exist)
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub helper_id: Option<HelperId>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub incident_date: Option<NaiveDate>,
    pub severity: Option<IncidentSeverity>,
    pub status: Option<IncidentStatus>,
    pub resolution: Option<String>,
    /// Replaces the attachment list
    pub attachments: Option<Vec<String>>,
}

impl HasUpdates for UpdateIncidentRequest {
    fn has_any_updates(&self) -> bool {
        self.helper_id.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.incident_date.is_some()
            || self.severity.is_some()
            || self.status.is_some()
            || self.resolution.is_some()
            || self.attachments.is_some()
    }
}

impl UpdateIncidentRequest {
    pub fn apply_to(self, incident: &mut Incident, now: Timestamp) -> ApiResult<()> {
        self.validate_has_updates()?;
        if let Some(helper_id) = self.helper_id {
            incident.helper_id = helper_id;
        }
        if let Some(title) = self.title {
            title.validate_non_empty("title")?;
            incident.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            description.validate_non_empty("description")?;
            incident.description = description.trim().to_string();
        }
        if let Some(incident_date) = self.incident_date {
            incident.incident_date = incident_date;
        }
        if let Some(severity) = self.severity {
            incident.severity = severity;
        }
        if let Some(status) = self.status {
            incident.status = status;
        }
        if self.resolution.is_some() {
            incident.resolution = self.resolution;
        }
        if let Some(attachments) = self.attachments {
            validate_attachments(&attachments)?;
            incident.attachments = attachments;
        }
        incident.updated_at = now;
        Ok(())
    }
}

fn validate_attachments(attachments: &[String]) -> ApiResult<()> {
    for url in attachments {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ApiError::invalid_format("attachments", "http(s) URL"));
        }
    }
    Ok(())
}

/// Query parameters for listing incidents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListIncidentsQuery {
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>, format = "uuid"))]
    pub helper_id: Option<HelperId>,
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
}

impl ListIncidentsQuery {
    pub fn matches(&self, incident: &Incident) -> bool {
        self.helper_id.map_or(true, |id| id == incident.helper_id)
            && self.status.map_or(true, |s| s == incident.status)
            && self.severity.map_or(true, |s| s == incident.severity)
    }
}

/// Response containing a list of incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListIncidentsResponse {
    pub incidents: Vec<Incident>,
    pub total: usize,
}
