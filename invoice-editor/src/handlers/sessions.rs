//! Invoice session lifecycle and event dispatch.

use crate::models::{EditPolicy, EventOutcome, InvoiceEvent, SessionSnapshot};
use crate::services::{metrics, SessionError};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub edit_policy: Option<EditPolicy>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub outcome: EventOutcome,
    pub snapshot: SessionSnapshot,
}

pub(crate) fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Session {} not found", id))
}

/// Open a new, empty invoice session.
pub async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();
    let policy = request
        .edit_policy
        .unwrap_or(state.config.session.default_edit_policy);

    let id = state.sessions.create(policy);
    metrics::set_active_sessions(state.sessions.len());

    let snapshot = state
        .sessions
        .with_session(id, |session| session.snapshot())
        .ok_or_else(|| session_not_found(id))??;

    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .with_session(id, |session| session.snapshot())
        .ok_or_else(|| session_not_found(id))??;

    Ok(Json(snapshot))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id) {
        return Err(session_not_found(id));
    }
    metrics::set_active_sessions(state.sessions.len());

    Ok(StatusCode::NO_CONTENT)
}

/// Apply one user action and return the refreshed invoice.
pub async fn apply_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<InvoiceEvent>,
) -> Result<Json<EventResponse>, AppError> {
    let kind = event.kind();

    let result = state
        .sessions
        .with_session(id, |session| -> Result<EventResponse, SessionError> {
            let outcome = session.apply(event)?;
            let snapshot = session.snapshot()?;
            Ok(EventResponse { outcome, snapshot })
        })
        .ok_or_else(|| session_not_found(id))?;

    match &result {
        Ok(_) => metrics::record_session_event(kind, "applied"),
        Err(e) => {
            tracing::info!(session_id = %id, event = kind, error = %e, "Invoice event rejected");
            metrics::record_session_event(kind, "rejected");
        }
    }

    Ok(Json(result?))
}
