use axum::{
    Json,
    extract::{Path, Query},
};
use fra_portal::{
    HomeView, NavTab, Role, RolePermissions, RouteDecision, home_view, navigation_tabs,
    permissions, resolve_route,
};
use serde::Deserialize;

use crate::extract::MaybeUser;

/// Unknown role tags get the signed-out view rather than an error.
fn lenient_role(tag: &str) -> Option<Role> {
    Role::parse_tag(tag).ok()
}

/// GET /api/roles/{role}/permissions
pub async fn role_permissions(Path(role): Path<String>) -> Json<&'static RolePermissions> {
    Json(permissions(lenient_role(&role)))
}

/// GET /api/roles/{role}/tabs
pub async fn role_tabs(Path(role): Path<String>) -> Json<Vec<NavTab>> {
    Json(navigation_tabs(lenient_role(&role)))
}

#[derive(Deserialize)]
pub struct GuardQuery {
    #[serde(default)]
    path: String,
}

/// GET /api/routes/guard?path=
pub async fn guard(viewer: MaybeUser, Query(query): Query<GuardQuery>) -> Json<RouteDecision> {
    Json(resolve_route(&query.path, viewer.viewer()))
}

/// GET /api/home
pub async fn home(viewer: MaybeUser) -> Json<HomeView> {
    Json(home_view(viewer.viewer()))
}
