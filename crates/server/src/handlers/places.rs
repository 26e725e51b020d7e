//! States, villages, forest areas and the map's GeoJSON layers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use fra_portal::{
    ForestAreaId, ForestKind, PortalError, StaticForestArea, StaticState, StatusSummary, Village,
    VillageFilter, VillageId, VillagePatch, feature_collection, local_date, parse_choice,
};
use fra_portal_data::{forest_areas, villages};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser},
    state::SharedState,
};

fn parse_id<T: std::str::FromStr>(kind: &'static str, raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| PortalError::not_found(kind, raw).into())
}

fn base_village(raw: &str) -> Result<&'static fra_portal::StaticVillage, ApiError> {
    let id = VillageId(parse_id("village", raw)?);
    fra_portal_data::village(id).ok_or_else(|| PortalError::not_found("village", raw).into())
}

/// GET /api/states
pub async fn list_states() -> Json<&'static [StaticState]> {
    Json(fra_portal_data::STATES)
}

/// GET /api/states/{name}/districts
pub async fn state_districts(Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    let state =
        fra_portal_data::state(&name).ok_or_else(|| PortalError::not_found("state", &name))?;
    Ok(Json(json!({ "state": state.name, "districts": state.districts })))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VillageQuery {
    state: Option<String>,
    district: Option<String>,
    status: Option<String>,
    fra_type: Option<String>,
}

#[derive(Serialize)]
pub struct VillageList {
    villages: Vec<Village>,
    summary: StatusSummary,
    total: usize,
}

/// GET /api/villages
pub async fn list_villages(
    State(state): State<SharedState>,
    Query(query): Query<VillageQuery>,
) -> Result<Json<VillageList>, ApiError> {
    let filter = VillageFilter::from_choices(
        query.state.as_deref(),
        query.district.as_deref(),
        query.status.as_deref(),
        query.fra_type.as_deref(),
    )?;

    let all = state.portal.lock().await.overlay.all(villages::ALL);
    let total = all.len();
    let villages: Vec<Village> = all.into_iter().filter(|v| filter.matches(v)).collect();
    Ok(Json(VillageList {
        summary: StatusSummary::of(&villages),
        villages,
        total,
    }))
}

/// GET /api/villages/{id}
pub async fn village_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Village>, ApiError> {
    let base = base_village(&id)?;
    Ok(Json(state.portal.lock().await.overlay.apply(base)))
}

/// PATCH /api/villages/{id}
pub async fn edit_village(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    current: CurrentUser,
    Body(patch): Body<VillagePatch>,
) -> Result<Json<Village>, ApiError> {
    let base = base_village(&id)?;
    let today = local_date(Utc::now());
    let village = state
        .portal
        .lock()
        .await
        .overlay
        .edit(base, patch, &current.user, &today)?;
    Ok(Json(village))
}

/// DELETE /api/villages/{id}/edits
pub async fn reset_village(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    current: CurrentUser,
) -> Result<Json<Village>, ApiError> {
    let base = base_village(&id)?;
    let perms = current.user.permissions();
    perms.require(perms.can_edit_village_data, "edit village data")?;

    let mut portal = state.portal.lock().await;
    portal.overlay.reset(base.id);
    Ok(Json(portal.overlay.apply(base)))
}

#[derive(Deserialize, Default)]
pub struct ForestQuery {
    state: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// GET /api/forest-areas
pub async fn list_forest_areas(
    Query(query): Query<ForestQuery>,
) -> Result<Json<Vec<&'static StaticForestArea>>, ApiError> {
    let kind: Option<ForestKind> = parse_choice(query.kind.as_deref(), &["all-types"])?;
    let state = query
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all" && *s != "all-states");

    let areas = forest_areas::ALL
        .iter()
        .copied()
        .filter(|f| state.is_none_or(|s| f.state == s) && kind.is_none_or(|k| f.kind == k))
        .collect();
    Ok(Json(areas))
}

/// GET /api/forest-areas/{id}
pub async fn forest_area_detail(
    Path(id): Path<String>,
) -> Result<Json<&'static StaticForestArea>, ApiError> {
    let area_id = ForestAreaId(parse_id("forest area", &id)?);
    let area = fra_portal_data::forest_area(area_id)
        .ok_or_else(|| PortalError::not_found("forest area", &id))?;
    Ok(Json(area))
}

/// GET /api/map/{layer}.geojson
pub async fn map_layer(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let layer = file
        .strip_suffix(".geojson")
        .ok_or_else(|| PortalError::not_found("map layer", &file))?;

    let collection = match layer {
        "villages" => {
            let villages = state.portal.lock().await.overlay.all(villages::ALL);
            feature_collection(&villages)?
        }
        "forest-areas" => feature_collection(forest_areas::ALL.iter().copied())?,
        "alerts" => {
            let now = Utc::now();
            let portal = state.portal.lock().await;
            feature_collection(
                portal
                    .alerts
                    .all()
                    .iter()
                    .filter(|a| a.is_active && !a.is_expired(now)),
            )?
        }
        _ => return Err(PortalError::not_found("map layer", layer).into()),
    };
    Ok(Json(collection))
}
