//! Dashboard aggregates over the helper and incident sheets.

use crate::{Helper, Incident, IncidentSeverity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of incidents listed under `recent_incidents`.
pub const RECENT_INCIDENT_LIMIT: usize = 5;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardMetrics {
    pub total_helpers: usize,
    pub active_helpers: usize,
    pub total_incidents: usize,
    /// Incidents still open or under investigation.
    pub open_incidents: usize,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub incidents_by_severity: BTreeMap<IncidentSeverity, usize>,
    pub recent_incidents: Vec<Incident>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub generated_at: Timestamp,
}

impl DashboardMetrics {
    /// Aggregate the given sheets.
    ///
    /// Every severity appears in `incidents_by_severity`, with zero counts
    /// included. `recent_incidents` is ordered newest first by
    /// `incident_date`, then `created_at`.
    pub fn compute(helpers: &[Helper], incidents: &[Incident], generated_at: Timestamp) -> Self {
        let mut incidents_by_severity: BTreeMap<IncidentSeverity, usize> =
            IncidentSeverity::ALL.iter().map(|s| (*s, 0)).collect();
        for incident in incidents {
            *incidents_by_severity.entry(incident.severity).or_insert(0) += 1;
        }

        let mut recent: Vec<&Incident> = incidents.iter().collect();
        recent.sort_by(|a, b| {
            b.incident_date
                .cmp(&a.incident_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Self {
            total_helpers: helpers.len(),
            active_helpers: helpers.iter().filter(|h| h.is_active()).count(),
            total_incidents: incidents.len(),
            open_incidents: incidents.iter().filter(|i| i.status.is_open()).count(),
            incidents_by_severity,
            recent_incidents: recent
                .into_iter()
                .take(RECENT_INCIDENT_LIMIT)
                .cloned()
                .collect(),
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HelperId, HelperStatus, IncidentId, IncidentStatus};
    use chrono::{Duration, NaiveDate, Utc};

    fn helper(status: HelperStatus) -> Helper {
        let now = Utc::now();
        Helper {
            helper_id: HelperId::now_v7(),
            full_name: "Maria Santos".to_string(),
            nationality: "Philippines".to_string(),
            passport_number: None,
            date_of_birth: None,
            phone: None,
            employer_name: None,
            employment_start: None,
            employment_end: None,
            status,
            notes: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn incident(day: u32, severity: IncidentSeverity, status: IncidentStatus, age_secs: i64) -> Incident {
        let created = Utc::now() - Duration::seconds(age_secs);
        Incident {
            incident_id: IncidentId::now_v7(),
            helper_id: HelperId::nil(),
            title: format!("incident on day {day}"),
            description: String::new(),
            incident_date: NaiveDate::from_ymd_opt(2024, 3, day).expect("valid day"),
            severity,
            status,
            reported_by: "staff@example.com".to_string(),
            resolution: None,
            attachments: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_empty_sheets() {
        let metrics = DashboardMetrics::compute(&[], &[], Utc::now());
        assert_eq!(metrics.total_helpers, 0);
        assert_eq!(metrics.open_incidents, 0);
        assert!(metrics.recent_incidents.is_empty());
        assert_eq!(metrics.incidents_by_severity.len(), IncidentSeverity::ALL.len());
        assert!(metrics.incidents_by_severity.values().all(|count| *count == 0));
    }

    #[test]
    fn test_counts() {
        let helpers = vec![
            helper(HelperStatus::Active),
            helper(HelperStatus::Active),
            helper(HelperStatus::Terminated),
        ];
        let incidents = vec![
            incident(1, IncidentSeverity::High, IncidentStatus::Open, 0),
            incident(2, IncidentSeverity::High, IncidentStatus::Investigating, 0),
            incident(3, IncidentSeverity::Low, IncidentStatus::Closed, 0),
        ];
        let metrics = DashboardMetrics::compute(&helpers, &incidents, Utc::now());
        assert_eq!(metrics.total_helpers, 3);
        assert_eq!(metrics.active_helpers, 2);
        assert_eq!(metrics.total_incidents, 3);
        assert_eq!(metrics.open_incidents, 2);
        assert_eq!(metrics.incidents_by_severity[&IncidentSeverity::High], 2);
        assert_eq!(metrics.incidents_by_severity[&IncidentSeverity::Low], 1);
        assert_eq!(metrics.incidents_by_severity[&IncidentSeverity::Critical], 0);
    }

    #[test]
    fn test_recent_incidents_newest_first_with_created_at_tiebreak() {
        let incidents: Vec<Incident> = vec![
            incident(1, IncidentSeverity::Low, IncidentStatus::Open, 0),
            incident(9, IncidentSeverity::Low, IncidentStatus::Open, 100),
            incident(9, IncidentSeverity::Low, IncidentStatus::Open, 10),
            incident(4, IncidentSeverity::Low, IncidentStatus::Open, 0),
            incident(7, IncidentSeverity::Low, IncidentStatus::Open, 0),
            incident(2, IncidentSeverity::Low, IncidentStatus::Open, 0),
            incident(3, IncidentSeverity::Low, IncidentStatus::Open, 0),
        ];
        let metrics = DashboardMetrics::compute(&[], &incidents, Utc::now());
        assert_eq!(metrics.recent_incidents.len(), RECENT_INCIDENT_LIMIT);
        assert_eq!(metrics.recent_incidents[0].incident_id, incidents[2].incident_id);
        assert_eq!(metrics.recent_incidents[1].incident_id, incidents[1].incident_id);
        let days: Vec<u32> = metrics
            .recent_incidents
            .iter()
            .map(|i| chrono::Datelike::day(&i.incident_date))
            .collect();
        assert_eq!(days, vec![9, 9, 7, 4, 3]);
    }
}
