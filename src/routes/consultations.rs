use axum::{
    extract::{Form, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::{
        auth::AuthenticatedCustomer,
        consultation::{
            CancelConsultationRequest, ScheduleServiceRequest, SubmitConsultationRequest,
        },
    },
    services::consultations::ConsultationService,
    AppState,
};

/// Workflow surfaces report failures as `{"success": false, "error": ...}`
/// with the taxonomy's status code; storage faults stay generic.
fn workflow_error(err: ApiError) -> (StatusCode, Json<Value>) {
    err.log();
    (
        err.status(),
        Json(json!({ "success": false, "error": err.to_string() })),
    )
}

/// POST /submit-consultation
pub async fn submit_consultation(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
    Json(body): Json<SubmitConsultationRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ConsultationService::submit(&state.db, &customer, &body)
        .await
        .map(|_id| Json(json!({ "success": true, "redirect": "/dashboard" })))
        .map_err(workflow_error)
}

/// POST /cancel-consultation (form-encoded)
pub async fn cancel_consultation(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
    Form(body): Form<CancelConsultationRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ConsultationService::cancel(&state.db, &customer, &body)
        .await
        .map(|_| Json(json!({ "success": "Consultation successfully cancelled" })))
        .map_err(workflow_error)
}

/// POST /schedule-request (form-encoded)
pub async fn schedule_request(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
    Form(body): Form<ScheduleServiceRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ConsultationService::schedule(&state.db, &customer, &body)
        .await
        .map(|service| {
            Json(json!({
                "success": true,
                "message": format!("{} successfully scheduled", service.label()),
            }))
        })
        .map_err(workflow_error)
}

/// GET /api/consultations
pub async fn list_consultations(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ConsultationService::list(&state.db, &customer)
        .await
        .map(|consultations| {
            Json(json!({
                "success": true,
                "consultations": consultations,
            }))
        })
        .map_err(workflow_error)
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ConsultationService::dashboard(&state.db, &customer)
        .await
        .map(|view| Json(serde_json::to_value(view).unwrap()))
        .map_err(workflow_error)
}
