//! Sign-in, sign-up and role selection.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use fra_portal::{
    NavTab, Role, RolePermissions, User, authenticate, dashboard_path, navigation_tabs, register,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::{Body, CurrentUser, bearer_token},
    state::SharedState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user: User,
    pub permissions: &'static RolePermissions,
    pub tabs: Vec<NavTab>,
    pub dashboard: &'static str,
}

impl SessionView {
    fn of(user: User, token: Option<String>) -> Self {
        SessionView {
            token,
            permissions: user.permissions(),
            tabs: navigation_tabs(user.role),
            dashboard: dashboard_path(user.role),
            user,
        }
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Deserialize)]
pub struct RoleChoice {
    role: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    Body(credentials): Body<Credentials>,
) -> Result<Json<SessionView>, ApiError> {
    let user = authenticate(&credentials.email, &credentials.password)?;
    let token = state.portal.lock().await.sessions.open(user.clone());
    info!("{} signed in", user.email);
    Ok(Json(SessionView::of(user, Some(token))))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<SharedState>,
    Body(form): Body<Signup>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let user = register(&form.email, &form.password, &form.display_name)?;
    let token = {
        let mut portal = state.portal.lock().await;
        portal.signups += 1;
        portal.sessions.open(user.clone())
    };
    info!("{} signed up", user.email);
    Ok((StatusCode::CREATED, Json(SessionView::of(user, Some(token)))))
}

/// POST /api/auth/logout. Unknown or missing tokens are not an error.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.portal.lock().await.sessions.close(&token);
    }
    StatusCode::NO_CONTENT
}

/// PUT /api/auth/role
pub async fn select_role(
    State(state): State<SharedState>,
    current: CurrentUser,
    Body(choice): Body<RoleChoice>,
) -> Result<Json<SessionView>, ApiError> {
    let role = Role::parse_tag(&choice.role)?;
    let user = state
        .portal
        .lock()
        .await
        .sessions
        .set_role(&current.token, role)?
        .clone();
    info!("{} selected role {}", user.email, role);
    Ok(Json(SessionView::of(user, None)))
}

/// GET /api/me
pub async fn me(current: CurrentUser) -> Json<SessionView> {
    Json(SessionView::of(current.user, None))
}
