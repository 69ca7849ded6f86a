//! Triage session endpoints.
//!
//! - `POST   /api/sessions`              — new session at `initial_input`
//! - `GET    /api/sessions/:id`          — current view
//! - `DELETE /api/sessions/:id`          — discard
//! - `POST   /api/sessions/:id/select`   — choose patient
//! - `POST   /api/sessions/:id/start`    — "Start Guided Examination"
//! - `POST   /api/sessions/:id/analyze`  — "Analyze My Case"
//! - `POST   /api/sessions/:id/reset`    — "Start New Triage"

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::blocking;
use crate::api::error::ApiError;
use crate::api::types::{ActionResponse, ApiContext, SessionResponse, MAX_TEXT_LEN};
use crate::triage::{Transition, TriageFlow, TriageView};

#[derive(Deserialize)]
pub struct SelectRequest {
    pub patient_name: String,
}

#[derive(Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub patient_name: Option<String>,
    pub symptoms: String,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub answers: BTreeMap<usize, String>,
}

fn check_len(field: &str, text: &str) -> Result<(), ApiError> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field} too long (max {MAX_TEXT_LEN} chars)"
        )));
    }
    Ok(())
}

/// `POST /api/sessions`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let core = ctx.core.clone();
    let response = blocking(move || {
        let (session, handle) = core.create_session()?;
        let guard = handle
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
        let view = TriageView::render(&guard, core.directory());
        Ok(SessionResponse { session, view })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/sessions/:id`
pub async fn show(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let core = ctx.core.clone();
    blocking(move || {
        let view = core.with_session(&id, |s| TriageView::render(s, core.directory()))?;
        let session = core
            .session_info(&id)
            .ok_or(ApiError::SessionNotFound)?;
        Ok(Json(SessionResponse { session, view }))
    })
    .await
}

/// `DELETE /api/sessions/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.core.end_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/:id/select`
pub async fn select(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let core = ctx.core.clone();
    blocking(move || {
        let flow = core.flow();
        let response = core.with_session(&id, |s| -> Result<ActionResponse, ApiError> {
            flow.select_patient(s, &req.patient_name)?;
            Ok(ActionResponse {
                transition: Transition::Ignored(s.stage),
                view: TriageView::render(s, core.directory()),
            })
        })??;
        Ok(Json(response))
    })
    .await
}

/// `POST /api/sessions/:id/start`
pub async fn start(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<StartRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    check_len("Symptoms", &req.symptoms)?;

    let core = ctx.core.clone();
    blocking(move || {
        let flow = core.flow();
        let response = core.with_session(&id, |s| -> Result<ActionResponse, ApiError> {
            let transition =
                flow.start_examination(s, req.patient_name.as_deref(), &req.symptoms)?;
            Ok(ActionResponse {
                transition,
                view: TriageView::render(s, core.directory()),
            })
        })??;
        tracing::info!(session_id = %id, transition = ?response.transition, "Start examination");
        Ok(Json(response))
    })
    .await
}

/// `POST /api/sessions/:id/analyze`
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    for answer in req.answers.values() {
        check_len("Answer", answer)?;
    }

    let core = ctx.core.clone();
    blocking(move || {
        let flow = core.flow();
        let response = core.with_session(&id, |s| {
            let transition = flow.analyze_case(s, req.answers);
            ActionResponse {
                transition,
                view: TriageView::render(s, core.directory()),
            }
        })?;
        tracing::info!(session_id = %id, transition = ?response.transition, "Analyze case");
        Ok(Json(response))
    })
    .await
}

/// `POST /api/sessions/:id/reset`
pub async fn reset(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let core = ctx.core.clone();
    blocking(move || {
        let response = core.with_session(&id, |s| ActionResponse {
            transition: TriageFlow::reset(s),
            view: TriageView::render(s, core.directory()),
        })?;
        Ok(Json(response))
    })
    .await
}
