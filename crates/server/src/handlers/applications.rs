//! FRA claim applications: listing, submission, review and validation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use fra_portal::{
    ApplicationFilter, ApplicationForm, ApplicationId, ApplicationStatus, DEFAULT_RADIUS_KM,
    FraApplication, SupportingDocument, UploadCheck, User, ValidationReport, analyze, can_approve,
    can_delete, can_edit, check_uploads, validate_claim,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser},
    state::SharedState,
};

/// A record plus what the viewer may do with it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    application: FraApplication,
    can_edit: bool,
    can_approve: bool,
    can_delete: bool,
}

impl ApplicationView {
    fn of(application: &FraApplication, viewer: &User) -> Self {
        ApplicationView {
            can_edit: can_edit(application, viewer.role),
            can_approve: can_approve(application, viewer.role),
            can_delete: can_delete(application, viewer.role),
            application: application.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ApplicationList {
    applications: Vec<ApplicationView>,
    total: usize,
}

#[derive(Deserialize, Default)]
pub struct ApplicationQuery {
    search: Option<String>,
    status: Option<String>,
    priority: Option<String>,
}

/// GET /api/applications
pub async fn list_applications(
    State(state): State<SharedState>,
    current: CurrentUser,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApplicationList>, ApiError> {
    let filter = ApplicationFilter::from_choices(
        query.search.as_deref(),
        query.status.as_deref(),
        query.priority.as_deref(),
    )?;

    let portal = state.portal.lock().await;
    let applications: Vec<ApplicationView> = portal
        .applications
        .list(&current.user, &filter)
        .into_iter()
        .map(|app| ApplicationView::of(app, &current.user))
        .collect();
    Ok(Json(ApplicationList {
        total: applications.len(),
        applications,
    }))
}

#[derive(Deserialize)]
pub struct NewApplication {
    #[serde(default)]
    draft: bool,
    #[serde(flatten)]
    form: ApplicationForm,
}

/// POST /api/applications
pub async fn create_application(
    State(state): State<SharedState>,
    current: CurrentUser,
    Body(body): Body<NewApplication>,
) -> Result<(StatusCode, Json<ApplicationView>), ApiError> {
    let now = Utc::now();
    let mut portal = state.portal.lock().await;
    let app = if body.draft {
        portal.applications.save_draft(body.form, &current.user, now)?
    } else {
        portal.applications.submit(body.form, &current.user, now)?
    };
    info!("{} recorded application {} ({})", current.user.email, app.id, app.status);
    Ok((StatusCode::CREATED, Json(ApplicationView::of(app, &current.user))))
}

/// GET /api/applications/{id}
pub async fn application_detail(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApplicationView>, ApiError> {
    let portal = state.portal.lock().await;
    let app = portal.applications.get(&ApplicationId(id), &current.user)?;
    Ok(Json(ApplicationView::of(app, &current.user)))
}

/// PUT /api/applications/{id}
pub async fn update_application(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Body(form): Body<ApplicationForm>,
) -> Result<Json<ApplicationView>, ApiError> {
    let mut portal = state.portal.lock().await;
    let app = portal
        .applications
        .update(&ApplicationId(id), form, &current.user)?;
    Ok(Json(ApplicationView::of(app, &current.user)))
}

/// DELETE /api/applications/{id}
pub async fn delete_application(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .portal
        .lock()
        .await
        .applications
        .delete(&ApplicationId(id), &current.user)?;
    info!("{} deleted application {}", current.user.email, removed.id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct StatusChange {
    status: ApplicationStatus,
    notes: Option<String>,
}

/// POST /api/applications/{id}/status
pub async fn change_status(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Body(change): Body<StatusChange>,
) -> Result<Json<ApplicationView>, ApiError> {
    let mut portal = state.portal.lock().await;
    let app = portal.applications.change_status(
        &ApplicationId(id),
        change.status,
        change.notes,
        &current.user,
        Utc::now(),
    )?;
    info!("{} moved application {} to {}", current.user.email, app.id, app.status);
    Ok(Json(ApplicationView::of(app, &current.user)))
}

#[derive(Deserialize, Default)]
pub struct ValidateQuery {
    #[serde(default)]
    analyze: bool,
}

/// POST /api/applications/{id}/validate[?analyze=true]
///
/// With `analyze`, records that carry coordinates are scored against a
/// fresh asset analysis around them.
pub async fn validate_application(
    State(state): State<SharedState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidationReport>, ApiError> {
    let form = {
        let portal = state.portal.lock().await;
        portal
            .applications
            .get(&ApplicationId(id), &current.user)?
            .form
            .clone()
    };

    let analysis = match form.coordinates.filter(|_| query.analyze) {
        None => None,
        Some(center) => match analyze(center, DEFAULT_RADIUS_KM, Utc::now()) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("Skipping asset analysis: {}", err);
                None
            }
        },
    };

    Ok(Json(validate_claim(&form, analysis)))
}

#[derive(Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    files: Vec<SupportingDocument>,
}

/// POST /api/applications/uploads/check
pub async fn check_upload(
    current: CurrentUser,
    Body(request): Body<UploadRequest>,
) -> Json<UploadCheck> {
    Json(check_uploads(current.user.permissions(), &request.files))
}
