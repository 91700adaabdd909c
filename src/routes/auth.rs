use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::{
        auth::AuthenticatedCustomer,
        customer::{CustomerProfile, LoginRequest, SignupRequest},
    },
    services::auth::AuthService,
    AppState,
};

fn auth_error(err: ApiError) -> (StatusCode, Json<Value>) {
    err.log();
    (err.status(), Json(json!({ "error": err.to_string() })))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    AuthService::signup(&state.db, &body.email, &body.password, &body.repeat_password)
        .await
        .map(|profile| {
            (
                StatusCode::CREATED,
                Json(serde_json::to_value(profile).unwrap()),
            )
        })
        .map_err(auth_error)
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    AuthService::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .await
    .map(|res| Json(serde_json::to_value(res).unwrap()))
    .map_err(|e| {
        e.log();
        // Credential failures are a 401, not a 400.
        let status = match e {
            ApiError::Validation(_) => StatusCode::UNAUTHORIZED,
            _ => e.status(),
        };
        (status, Json(json!({ "error": e.to_string() })))
    })
}

pub async fn me(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    AuthService::resolve_customer(&state.db, customer.customer_id)
        .await
        .map_err(auth_error)?
        .map(|c| Json(serde_json::to_value(CustomerProfile::from(c)).unwrap()))
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Customer not found" })),
        ))
}
