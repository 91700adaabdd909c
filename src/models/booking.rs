use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::consultation::ConsultationStatus;

/// Status written to every booking row.
pub const BOOKING_STATUS_SCHEDULED: &str = "Scheduled";

/// What a scheduling request books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Installation,
    Maintenance,
}

impl ServiceType {
    pub fn is_maintenance(self) -> bool {
        matches!(self, Self::Maintenance)
    }

    /// Consultation status written after a successful scheduling request.
    pub fn scheduled_status(self) -> ConsultationStatus {
        match self {
            Self::Installation => ConsultationStatus::InstallationScheduled,
            Self::Maintenance => ConsultationStatus::MaintenanceScheduled,
        }
    }

    /// Capitalised label used in success messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Installation => "Installation",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "installation" => Ok(ServiceType::Installation),
            "maintenance" => Ok(ServiceType::Maintenance),
            _ => Err(anyhow::anyhow!("Unknown service type: {s}")),
        }
    }
}

/// Append-only ledger row tying a scheduled visit to its consultation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub consultation_id: i64,
    pub maintenance: bool,
    pub date_booked: NaiveDate,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_parses_the_two_wire_values() {
        assert_eq!(
            "installation".parse::<ServiceType>().unwrap(),
            ServiceType::Installation
        );
        assert_eq!(
            "maintenance".parse::<ServiceType>().unwrap(),
            ServiceType::Maintenance
        );
        assert!("repair".parse::<ServiceType>().is_err());
        assert!("Installation".parse::<ServiceType>().is_err());
    }

    #[test]
    fn scheduled_status_matches_service_type() {
        assert_eq!(
            ServiceType::Installation.scheduled_status(),
            ConsultationStatus::InstallationScheduled
        );
        assert_eq!(
            ServiceType::Maintenance.scheduled_status(),
            ConsultationStatus::MaintenanceScheduled
        );
        assert!(ServiceType::Maintenance.is_maintenance());
        assert!(!ServiceType::Installation.is_maintenance());
    }
}
