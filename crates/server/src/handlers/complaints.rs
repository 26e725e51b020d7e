use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use fra_portal::{Complaint, ComplaintForm, ComplaintId, ComplaintStatus, PortalError};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser},
    state::SharedState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintList {
    complaints: Vec<Complaint>,
    open_count: usize,
}

/// GET /api/complaints
pub async fn list_complaints(
    State(state): State<SharedState>,
    current: CurrentUser,
) -> Json<ComplaintList> {
    let portal = state.portal.lock().await;
    Json(ComplaintList {
        complaints: portal.complaints.list(&current.user).cloned().collect(),
        open_count: portal.complaints.open_count(&current.user),
    })
}

/// POST /api/complaints
pub async fn submit_complaint(
    State(state): State<SharedState>,
    current: CurrentUser,
    Body(form): Body<ComplaintForm>,
) -> Result<(StatusCode, Json<Complaint>), ApiError> {
    let mut portal = state.portal.lock().await;
    let complaint = portal
        .complaints
        .submit(form, &current.user, Utc::now())?
        .clone();
    info!("{} filed complaint {}", current.user.email, complaint.id.0);
    Ok((StatusCode::CREATED, Json(complaint)))
}

#[derive(Deserialize)]
pub struct ComplaintStatusChange {
    status: ComplaintStatus,
    response: Option<String>,
}

/// POST /api/complaints/{id}/status
pub async fn set_complaint_status(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Body(change): Body<ComplaintStatusChange>,
) -> Result<Json<Complaint>, ApiError> {
    let id = id
        .parse()
        .map(ComplaintId)
        .map_err(|_| PortalError::not_found("complaint", &id))?;
    let mut portal = state.portal.lock().await;
    let complaint = portal
        .complaints
        .set_status(id, change.status, change.response, &current.user)?
        .clone();
    Ok(Json(complaint))
}
