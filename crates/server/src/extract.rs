use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use fra_portal::{PortalError, Role, User, Viewer};
use serde::de::DeserializeOwned;

use crate::{error::ApiError, state::SharedState};

/// The token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// A signed-in user. Rejects with 401 when the token is missing or unknown.
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::MissingToken)?;
        let user = state
            .portal
            .lock()
            .await
            .sessions
            .get(&token)
            .cloned()
            .ok_or(PortalError::UnknownSession)?;
        Ok(CurrentUser { token, user })
    }
}

/// The signed-in user if there is one. Unknown tokens count as anonymous.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map(|u| u.role)
    }

    pub fn role(&self) -> Option<Role> {
        self.viewer().flatten()
    }
}

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let user = state.portal.lock().await.sessions.get(&token).cloned();
        Ok(MaybeUser(user))
    }
}

/// `Json<T>` whose rejections use the API's error body.
pub struct Body<T>(pub T);

impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Body(value))
    }
}
