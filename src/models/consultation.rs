use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a consultation. Stored as TEXT using the legacy labels the
/// dashboard and older clients expect, so `Display`/`FromStr` are the single
/// source of truth for the on-disk strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationStatus {
    Pending,
    Approved,
    InstallationScheduled,
    MaintenanceScheduled,
}

impl ConsultationStatus {
    /// Dashboard label derived from the current status.
    pub fn request_type(self) -> &'static str {
        match self {
            Self::Pending | Self::Approved => "Enquiry",
            Self::InstallationScheduled => "Installation",
            Self::MaintenanceScheduled => "Maintenance",
        }
    }
}

impl std::fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConsultationStatus::Pending => "pending",
            ConsultationStatus::Approved => "approved",
            ConsultationStatus::InstallationScheduled => "Installation Scheduled",
            ConsultationStatus::MaintenanceScheduled => "Maintenance Scheduled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ConsultationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConsultationStatus::Pending),
            "approved" => Ok(ConsultationStatus::Approved),
            "Installation Scheduled" => Ok(ConsultationStatus::InstallationScheduled),
            "Maintenance Scheduled" => Ok(ConsultationStatus::MaintenanceScheduled),
            _ => Err(anyhow::anyhow!("Unknown consultation status: {s}")),
        }
    }
}

/// DB row struct — status is fetched as TEXT and parsed where the workflow
/// needs to reason about it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Consultation {
    pub id: i64,
    pub product_id: i64,
    pub preferred_date: NaiveDate,
    pub postcode: String,
    pub property_type: String,
    pub status: String,
    pub customer_id: i64,
}

// Request/Response DTOs.
// Fields arrive as optional strings so that missing values surface as the
// workflow's own validation errors rather than deserialization rejections.
#[derive(Debug, Deserialize)]
pub struct SubmitConsultationRequest {
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelConsultationRequest {
    #[serde(default)]
    pub consultation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleServiceRequest {
    #[serde(default)]
    pub consultation_id: Option<String>,
    #[serde(default)]
    pub schedule_date: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
}

/// One row of GET /api/consultations.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConsultationSummary {
    pub id: i64,
    pub product_type: String,
    pub date_scheduled: NaiveDate,
    pub status: String,
}

/// Raw dashboard row, ascending by preferred_date.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardRow {
    pub id: i64,
    pub product_type: String,
    pub preferred_date: NaiveDate,
    pub property_type: String,
    pub status: String,
}

/// One consultation as presented on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    pub consultation_id: i64,
    pub product_type: String,
    pub request_type: String,
    pub property_type: String,
    /// Display-formatted as DD/MM/YYYY.
    pub date_scheduled: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user_name: String,
    pub consultations: Vec<DashboardEntry>,
    pub next_consultation: Option<DashboardEntry>,
    pub latest_consultation: Option<DashboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_legacy_strings() {
        for status in [
            ConsultationStatus::Pending,
            ConsultationStatus::Approved,
            ConsultationStatus::InstallationScheduled,
            ConsultationStatus::MaintenanceScheduled,
        ] {
            let text = status.to_string();
            assert_eq!(text.parse::<ConsultationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn scheduled_statuses_keep_their_legacy_capitalisation() {
        assert_eq!(
            ConsultationStatus::InstallationScheduled.to_string(),
            "Installation Scheduled"
        );
        assert_eq!(
            ConsultationStatus::MaintenanceScheduled.to_string(),
            "Maintenance Scheduled"
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("cancelled".parse::<ConsultationStatus>().is_err());
        assert!("PENDING".parse::<ConsultationStatus>().is_err());
    }

    #[test]
    fn request_type_follows_status() {
        assert_eq!(ConsultationStatus::Pending.request_type(), "Enquiry");
        assert_eq!(ConsultationStatus::Approved.request_type(), "Enquiry");
        assert_eq!(
            ConsultationStatus::InstallationScheduled.request_type(),
            "Installation"
        );
        assert_eq!(
            ConsultationStatus::MaintenanceScheduled.request_type(),
            "Maintenance"
        );
    }
}
