//! Read-only patient and doctor listings.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::directory::{Doctor, Patient};

/// `GET /api/patients`
pub async fn patients(State(ctx): State<ApiContext>) -> Json<Vec<Patient>> {
    Json(ctx.core.directory().patients().to_vec())
}

/// `GET /api/patients/:name`
pub async fn patient(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    ctx.core
        .directory()
        .patient(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown patient: {name}")))
}

/// `GET /api/doctors`
pub async fn doctors(State(ctx): State<ApiContext>) -> Json<Vec<Doctor>> {
    Json(ctx.core.directory().doctors().to_vec())
}
