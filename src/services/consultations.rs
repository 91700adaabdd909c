use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::{
    error::ApiError,
    models::{
        auth::AuthenticatedCustomer,
        booking::{ServiceType, BOOKING_STATUS_SCHEDULED},
        consultation::{
            CancelConsultationRequest, ConsultationStatus, ConsultationSummary, DashboardEntry,
            DashboardRow, DashboardView, ScheduleServiceRequest, SubmitConsultationRequest,
        },
    },
    services::{auth::AuthService, products::ProductService, sanitize::sanitize},
};

/// New consultations wait for staff approval before an installation can be
/// booked.
const INITIAL_STATUS: ConsultationStatus = ConsultationStatus::Pending;

pub struct ConsultationService;

impl ConsultationService {
    /// Validate and persist a consultation request. The customer's display
    /// name is overwritten with the submitted one in the same transaction as
    /// the insert.
    pub async fn submit(
        pool: &PgPool,
        principal: &AuthenticatedCustomer,
        req: &SubmitConsultationRequest,
    ) -> Result<i64, ApiError> {
        let fields = clean_submission(req)?;

        let customer = AuthService::resolve_customer(pool, principal.customer_id)
            .await?
            .ok_or_else(|| ApiError::validation("User not in session"))?;

        let today = Utc::now().date_naive();
        let preferred_date =
            validate_details(&fields.full_name, &fields.postcode, &fields.preferred_date, today)?;

        let product = ProductService::find_by_type(pool, &fields.product_type)
            .await?
            .ok_or_else(|| ApiError::validation("Product not found"))?;

        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE customers SET full_name = $1 WHERE id = $2")
            .bind(&fields.full_name)
            .bind(customer.id)
            .execute(&mut *tx)
            .await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO consultations (product_id, preferred_date, postcode, property_type, status, customer_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(product.id)
        .bind(preferred_date)
        .bind(&fields.postcode)
        .bind(&fields.property_type)
        .bind(INITIAL_STATUS.to_string())
        .bind(customer.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Delete a consultation and every booking tied to it, scoped to the
    /// caller. Cancelling a consultation that does not exist or belongs to
    /// another customer deletes nothing and reports not-found.
    pub async fn cancel(
        pool: &PgPool,
        principal: &AuthenticatedCustomer,
        req: &CancelConsultationRequest,
    ) -> Result<(), ApiError> {
        let consultation_id = req
            .consultation_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation("Consultation id required"))?;
        let consultation_id: i64 = consultation_id
            .parse()
            .map_err(|_| ApiError::validation("Invalid consultation ID"))?;

        let mut tx = pool.begin().await?;

        // Bookings go first: there is no FK cascade, and the ledger must
        // never keep rows for a deleted consultation.
        sqlx::query("DELETE FROM bookings WHERE consultation_id = $1 AND customer_id = $2")
            .bind(consultation_id)
            .bind(principal.customer_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM consultations WHERE id = $1 AND customer_id = $2")
            .bind(consultation_id)
            .bind(principal.customer_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("Consultation not found"));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Book an installation or maintenance visit against a consultation.
    /// Inserts the booking and advances the consultation's status and date
    /// as one unit of work.
    pub async fn schedule(
        pool: &PgPool,
        principal: &AuthenticatedCustomer,
        req: &ScheduleServiceRequest,
    ) -> Result<ServiceType, ApiError> {
        let (Some(consultation_id), Some(schedule_date), Some(service_type)) = (
            req.consultation_id.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            req.schedule_date.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            req.service_type.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::validation(
                "Consultation ID, schedule date, and service type are required",
            ));
        };

        let consultation_id: i64 = consultation_id
            .parse()
            .map_err(|_| ApiError::validation("Invalid consultation ID"))?;
        let schedule_date = parse_ymd(schedule_date)
            .ok_or_else(|| ApiError::validation("Invalid date format. Use YYYY-MM-DD"))?;
        let service_type: ServiceType = service_type
            .parse()
            .map_err(|_| ApiError::validation("Invalid service type"))?;

        let mut tx = pool.begin().await?;

        // The row lock serialises concurrent scheduling requests for the
        // same consultation; ownership scoping keeps other customers' rows
        // invisible.
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM consultations WHERE id = $1 AND customer_id = $2 FOR UPDATE",
        )
        .bind(consultation_id)
        .bind(principal.customer_id)
        .fetch_optional(&mut *tx)
        .await?;

        let status = status
            .ok_or_else(|| {
                ApiError::not_found("Consultation not found or does not belong to you")
            })?
            .parse::<ConsultationStatus>()
            .map_err(ApiError::Internal)?;

        if !schedule_allowed(status, service_type) {
            return Err(ApiError::validation(
                "Consultation must be approved to schedule installation",
            ));
        }

        let today = Utc::now().date_naive();
        if schedule_date <= today {
            return Err(ApiError::validation("Schedule date must be after today"));
        }

        sqlx::query(
            "INSERT INTO bookings (customer_id, consultation_id, maintenance, date_booked, status)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(principal.customer_id)
        .bind(consultation_id)
        .bind(service_type.is_maintenance())
        .bind(schedule_date)
        .bind(BOOKING_STATUS_SCHEDULED)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE consultations SET status = $1, preferred_date = $2 WHERE id = $3")
            .bind(service_type.scheduled_status().to_string())
            .bind(schedule_date)
            .bind(consultation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(service_type)
    }

    /// All of the caller's consultations, most recent preferred date first.
    pub async fn list(
        pool: &PgPool,
        principal: &AuthenticatedCustomer,
    ) -> Result<Vec<ConsultationSummary>, ApiError> {
        let customer = AuthService::resolve_customer(pool, principal.customer_id)
            .await?
            .ok_or_else(|| ApiError::validation("Customer not found"))?;

        let rows = sqlx::query_as::<_, ConsultationSummary>(
            "SELECT c.id, p.type AS product_type, c.preferred_date AS date_scheduled, c.status
             FROM consultations c
             JOIN products p ON p.id = c.product_id
             WHERE c.customer_id = $1
             ORDER BY c.preferred_date DESC",
        )
        .bind(customer.id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Dashboard data: the full ascending list plus the derived next and
    /// latest consultations.
    pub async fn dashboard(
        pool: &PgPool,
        principal: &AuthenticatedCustomer,
    ) -> Result<DashboardView, ApiError> {
        let customer = AuthService::resolve_customer(pool, principal.customer_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let rows = sqlx::query_as::<_, DashboardRow>(
            "SELECT c.id, p.type AS product_type, c.preferred_date, c.property_type, c.status
             FROM consultations c
             JOIN products p ON p.id = c.product_id
             WHERE c.customer_id = $1
             ORDER BY c.preferred_date ASC, c.id ASC",
        )
        .bind(customer.id)
        .fetch_all(pool)
        .await?;

        let today = Utc::now().date_naive();
        Ok(build_dashboard(&customer.full_name, rows, today))
    }
}

#[derive(Debug)]
struct CleanedSubmission {
    product_type: String,
    full_name: String,
    preferred_date: String,
    postcode: String,
    property_type: String,
}

/// Run every text field through the sanitizer, then apply the
/// all-fields-required rule. A sanitizer rejection aborts immediately with
/// an invalid-characters error for that field.
fn clean_submission(req: &SubmitConsultationRequest) -> Result<CleanedSubmission, ApiError> {
    let fields = CleanedSubmission {
        product_type: clean(req.product_type.as_deref(), "product type")?,
        full_name: clean(req.full_name.as_deref(), "full name")?,
        preferred_date: clean(req.preferred_date.as_deref(), "preferred date")?,
        postcode: clean(req.postcode.as_deref(), "postcode")?,
        property_type: clean(req.property_type.as_deref(), "property type")?,
    };

    if fields.product_type.is_empty()
        || fields.full_name.is_empty()
        || fields.preferred_date.is_empty()
        || fields.postcode.is_empty()
        || fields.property_type.is_empty()
    {
        return Err(ApiError::validation("Fields cannot be empty"));
    }

    Ok(fields)
}

fn clean(raw: Option<&str>, field: &str) -> Result<String, ApiError> {
    sanitize(raw).ok_or_else(|| ApiError::validation(format!("Invalid characters in {field}")))
}

/// Field rules applied after the caller has been resolved: name format,
/// postcode length, preferred date. Returns the parsed date.
fn validate_details(
    full_name: &str,
    postcode: &str,
    preferred_date: &str,
    today: NaiveDate,
) -> Result<NaiveDate, ApiError> {
    if !full_name.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(ApiError::validation(
            "Full name must contain only letters and spaces, no numbers",
        ));
    }

    if !full_name.chars().any(|c| c.is_alphabetic()) {
        return Err(ApiError::validation(
            "Full name must contain at least one letter, not just spaces",
        ));
    }

    if postcode.chars().count() > 8 {
        return Err(ApiError::validation("Postcode must be 8 characters or less"));
    }

    let preferred = parse_ymd(preferred_date)
        .ok_or_else(|| ApiError::validation("Preferred date must be after today"))?;
    if preferred <= today {
        return Err(ApiError::validation("Preferred date must be after today"));
    }

    Ok(preferred)
}

fn parse_ymd(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Installation needs prior approval; maintenance can be booked regardless
/// of the current status.
fn schedule_allowed(status: ConsultationStatus, service: ServiceType) -> bool {
    match service {
        ServiceType::Installation => status == ConsultationStatus::Approved,
        ServiceType::Maintenance => true,
    }
}

fn build_dashboard(full_name: &str, rows: Vec<DashboardRow>, today: NaiveDate) -> DashboardView {
    let trimmed = full_name.trim();
    let user_name = if trimmed.is_empty() { "user" } else { trimmed }.to_string();

    let mut consultations = Vec::with_capacity(rows.len());
    let mut next: Option<DashboardEntry> = None;
    let mut latest: Option<(NaiveDate, i64, DashboardEntry)> = None;

    for row in rows {
        let status = row
            .status
            .parse::<ConsultationStatus>()
            .unwrap_or(ConsultationStatus::Pending);
        let date = row.preferred_date;
        let id = row.id;

        let entry = DashboardEntry {
            consultation_id: id,
            product_type: row.product_type,
            request_type: status.request_type().to_string(),
            property_type: row.property_type,
            date_scheduled: date.format("%d/%m/%Y").to_string(),
            status: row.status,
        };

        // Rows arrive ascending by date, so the first strictly-future one is
        // the closest upcoming consultation.
        if next.is_none() && date > today {
            next = Some(entry.clone());
        }

        // Maximum date wins; ties break towards the highest id.
        let replace = match &latest {
            None => true,
            Some((latest_date, latest_id, _)) => {
                date > *latest_date || (date == *latest_date && id > *latest_id)
            }
        };
        if replace {
            latest = Some((date, id, entry.clone()));
        }

        consultations.push(entry);
    }

    DashboardView {
        user_name,
        consultations,
        next_consultation: next,
        latest_consultation: latest.map(|(_, _, entry)| entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(id: i64, preferred: NaiveDate, status: &str) -> DashboardRow {
        DashboardRow {
            id,
            product_type: "Solar panels".into(),
            preferred_date: preferred,
            property_type: "house".into(),
            status: status.into(),
        }
    }

    fn submission(
        product_type: &str,
        full_name: &str,
        preferred_date: &str,
        postcode: &str,
        property_type: &str,
    ) -> SubmitConsultationRequest {
        SubmitConsultationRequest {
            product_type: Some(product_type.into()),
            full_name: Some(full_name.into()),
            preferred_date: Some(preferred_date.into()),
            postcode: Some(postcode.into()),
            property_type: Some(property_type.into()),
        }
    }

    #[test]
    fn missing_fields_cannot_be_empty() {
        let req = SubmitConsultationRequest {
            product_type: Some("Solar panels".into()),
            full_name: None,
            preferred_date: Some("2999-01-01".into()),
            postcode: Some("AB12 3CD".into()),
            property_type: Some("house".into()),
        };
        let err = clean_submission(&req).unwrap_err();
        assert_eq!(err.to_string(), "Fields cannot be empty");
    }

    #[test]
    fn whitespace_only_fields_are_empty() {
        let req = submission("Solar panels", "Jane Doe", "2999-01-01", "   ", "house");
        let err = clean_submission(&req).unwrap_err();
        assert_eq!(err.to_string(), "Fields cannot be empty");
    }

    #[test]
    fn denylisted_input_aborts_with_invalid_characters() {
        let req = submission("Solar panels", "Jane'; --", "2999-01-01", "AB12 3CD", "house");
        let err = clean_submission(&req).unwrap_err();
        assert_eq!(err.to_string(), "Invalid characters in full name");
    }

    #[test]
    fn valid_submission_is_cleaned_and_trimmed() {
        let req = submission("Solar panels", "  Jane Doe  ", "2999-01-01", "AB12 3CD", "house");
        let fields = clean_submission(&req).unwrap();
        assert_eq!(fields.full_name, "Jane Doe");
        assert_eq!(fields.postcode, "AB12 3CD");
    }

    #[test]
    fn name_with_digits_is_rejected() {
        let today = date(2024, 6, 1);
        let err = validate_details("Jane D03", "AB12 3CD", "2999-01-01", today).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Full name must contain only letters and spaces, no numbers"
        );
    }

    #[test]
    fn name_needs_at_least_one_letter() {
        let today = date(2024, 6, 1);
        // Sanitized input is already trimmed, so an all-space name arrives
        // as an empty string here.
        let err = validate_details("", "AB12 3CD", "2999-01-01", today).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Full name must contain at least one letter, not just spaces"
        );
    }

    #[test]
    fn postcode_longer_than_eight_chars_is_rejected() {
        let today = date(2024, 6, 1);
        let err = validate_details("Jane Doe", "AB12 3CDE", "2999-01-01", today).unwrap_err();
        assert_eq!(err.to_string(), "Postcode must be 8 characters or less");
    }

    #[test]
    fn preferred_date_must_be_strictly_after_today() {
        let today = date(2024, 6, 1);
        for bad in ["2024-06-01", "2024-05-31", "2001-01-01"] {
            let err = validate_details("Jane Doe", "AB12 3CD", bad, today).unwrap_err();
            assert_eq!(err.to_string(), "Preferred date must be after today");
        }
        let ok = validate_details("Jane Doe", "AB12 3CD", "2024-06-02", today).unwrap();
        assert_eq!(ok, date(2024, 6, 2));
    }

    #[test]
    fn unparseable_preferred_date_is_rejected() {
        let today = date(2024, 6, 1);
        let err = validate_details("Jane Doe", "AB12 3CD", "01/02/2999", today).unwrap_err();
        assert_eq!(err.to_string(), "Preferred date must be after today");
    }

    #[test]
    fn installation_requires_approved_status() {
        use ConsultationStatus::*;
        assert!(schedule_allowed(Approved, ServiceType::Installation));
        assert!(!schedule_allowed(Pending, ServiceType::Installation));
        assert!(!schedule_allowed(InstallationScheduled, ServiceType::Installation));
        assert!(!schedule_allowed(MaintenanceScheduled, ServiceType::Installation));
    }

    #[test]
    fn maintenance_is_allowed_from_any_status() {
        use ConsultationStatus::*;
        for status in [Pending, Approved, InstallationScheduled, MaintenanceScheduled] {
            assert!(schedule_allowed(status, ServiceType::Maintenance));
        }
    }

    #[test]
    fn parse_ymd_accepts_wire_dates_only() {
        assert_eq!(parse_ymd("2025-03-09"), Some(date(2025, 3, 9)));
        assert_eq!(parse_ymd("09/03/2025"), None);
        assert_eq!(parse_ymd("2025-13-01"), None);
        assert_eq!(parse_ymd("soon"), None);
    }

    #[test]
    fn dashboard_next_is_first_future_date() {
        let today = date(2024, 6, 1);
        let rows = vec![
            row(1, date(2024, 5, 20), "approved"),
            row(2, date(2024, 6, 10), "pending"),
            row(3, date(2024, 7, 1), "pending"),
        ];
        let view = build_dashboard("Jane Doe", rows, today);
        assert_eq!(view.next_consultation.unwrap().consultation_id, 2);
        assert_eq!(view.latest_consultation.unwrap().consultation_id, 3);
        assert_eq!(view.consultations.len(), 3);
    }

    #[test]
    fn dashboard_latest_tie_breaks_on_highest_id() {
        let today = date(2024, 6, 1);
        let rows = vec![
            row(4, date(2024, 7, 1), "pending"),
            row(9, date(2024, 7, 1), "approved"),
        ];
        let view = build_dashboard("Jane Doe", rows, today);
        assert_eq!(view.latest_consultation.unwrap().consultation_id, 9);
    }

    #[test]
    fn dashboard_with_no_future_dates_has_no_next() {
        let today = date(2024, 6, 1);
        let rows = vec![row(1, date(2024, 5, 1), "Maintenance Scheduled")];
        let view = build_dashboard("Jane Doe", rows, today);
        assert!(view.next_consultation.is_none());
        assert_eq!(view.latest_consultation.unwrap().consultation_id, 1);
    }

    #[test]
    fn dashboard_entry_shape() {
        let today = date(2024, 6, 1);
        let rows = vec![row(7, date(2024, 6, 9), "Installation Scheduled")];
        let view = build_dashboard("  ", rows, today);
        assert_eq!(view.user_name, "user");
        let entry = &view.consultations[0];
        assert_eq!(entry.request_type, "Installation");
        assert_eq!(entry.date_scheduled, "09/06/2024");
        assert_eq!(entry.status, "Installation Scheduled");
    }
}
