use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use fra_portal::{
    Alert, AlertDraft, AlertFilter, AlertId, AlertKind, AlertPatch, PortalError, Priority,
    parse_choice,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser, MaybeUser},
    state::SharedState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    #[serde(flatten)]
    alert: Alert,
    is_expired: bool,
}

#[derive(Deserialize, Default)]
pub struct AlertQuery {
    search: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    priority: Option<String>,
}

fn parse_alert_id(raw: &str) -> Result<AlertId, PortalError> {
    raw.parse()
        .map(AlertId)
        .map_err(|_| PortalError::not_found("alert", raw))
}

/// GET /api/alerts
pub async fn list_alerts(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Query(query): Query<AlertQuery>,
) -> Result<Json<Vec<AlertView>>, ApiError> {
    let filter = AlertFilter {
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        kind: parse_choice::<AlertKind>(query.kind.as_deref(), &["all-types"])?,
        priority: parse_choice::<Priority>(query.priority.as_deref(), &["all-priorities"])?,
    };

    let now = Utc::now();
    let portal = state.portal.lock().await;
    let alerts = portal
        .alerts
        .visible(viewer.role(), &filter)
        .map(|alert| AlertView {
            is_expired: alert.is_expired(now),
            alert: alert.clone(),
        })
        .collect();
    Ok(Json(alerts))
}

/// POST /api/alerts
pub async fn create_alert(
    State(state): State<SharedState>,
    current: CurrentUser,
    Body(draft): Body<AlertDraft>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    let mut portal = state.portal.lock().await;
    let alert = portal
        .alerts
        .create(draft, &current.user, Utc::now())?
        .clone();
    info!("{} published alert {}", current.user.email, alert.id.0);
    Ok((StatusCode::CREATED, Json(alert)))
}

/// PATCH /api/alerts/{id}
pub async fn update_alert(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Body(patch): Body<AlertPatch>,
) -> Result<Json<Alert>, ApiError> {
    let id = parse_alert_id(&id)?;
    let mut portal = state.portal.lock().await;
    let alert = portal.alerts.update(id, patch, &current.user)?.clone();
    Ok(Json(alert))
}

/// DELETE /api/alerts/{id}
pub async fn delete_alert(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_alert_id(&id)?;
    let removed = state
        .portal
        .lock()
        .await
        .alerts
        .delete(id, &current.user)?;
    info!("{} deleted alert {}", current.user.email, removed.id.0);
    Ok(StatusCode::NO_CONTENT)
}
