//! Analytics, asset analysis and the static statistics tables.

use axum::{Json, extract::State};
use chrono::Utc;
use fra_portal::{
    AnalysisResult, Coordinates, DEFAULT_RADIUS_KM, DashboardData, StaticRecommendation,
    StaticStatistics, VillageBreakdown, analyze,
};
use fra_portal_data::{RECOMMENDATIONS, STATISTICS, villages};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser},
    state::SharedState,
};

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
pub struct AnalysisRequest {
    coordinates: Coordinates,
    radius: Option<f64>,
}

/// POST /api/analysis
pub async fn run_analysis(
    Body(request): Body<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let radius = request.radius.unwrap_or(DEFAULT_RADIUS_KM);
    Ok(Json(analyze(request.coordinates, radius, Utc::now())?))
}

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<SharedState>,
    current: CurrentUser,
) -> Result<Json<DashboardData>, ApiError> {
    let perms = current.user.permissions();
    perms.require(perms.can_view_analytics, "view analytics")?;

    let portal = state.portal.lock().await;
    Ok(Json(DashboardData::collect(
        portal.applications.all(),
        portal.sessions.len(),
        portal.known_users(),
        STATISTICS.monthly_growth,
    )))
}

/// GET /api/analytics/villages
pub async fn village_breakdown(State(state): State<SharedState>) -> Json<VillageBreakdown> {
    let villages = state.portal.lock().await.overlay.all(villages::ALL);
    Json(VillageBreakdown::of(&villages))
}

/// GET /api/statistics
pub async fn statistics() -> Json<&'static StaticStatistics> {
    Json(&STATISTICS)
}

/// GET /api/recommendations
pub async fn recommendations() -> Json<&'static [StaticRecommendation]> {
    Json(RECOMMENDATIONS)
}
