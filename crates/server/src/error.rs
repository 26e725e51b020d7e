use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fra_portal::{GeminiError, PortalError};
use log::{debug, error};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

impl From<fra_portal::UnknownTag> for ApiError {
    fn from(value: fra_portal::UnknownTag) -> Self {
        ApiError::Portal(value.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Internal(value.to_string())
    }
}

fn message(error: &str) -> Value {
    json!({ "error": error })
}

fn with_details(error: &str, details: impl Into<Value>) -> Value {
    json!({ "error": error, "details": details.into() })
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, Value) {
        match self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, message("Sign in required")),
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                with_details("Invalid request", details.as_str()),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                message("Method Not Allowed"),
            ),
            ApiError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                with_details("Internal server error", details.as_str()),
            ),
            ApiError::Portal(err) => portal_status(err),
            ApiError::Gemini(err) => gemini_status(err),
        }
    }
}

fn portal_status(err: &PortalError) -> (StatusCode, Value) {
    let text = err.to_string();
    match err {
        PortalError::InvalidCredentials | PortalError::UnknownSession => {
            (StatusCode::UNAUTHORIZED, message(&text))
        }
        PortalError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Validation failed", "fields": fields }),
        ),
        PortalError::Invalid(_) | PortalError::UnknownTag(_) => {
            (StatusCode::BAD_REQUEST, with_details("Invalid request", text))
        }
        PortalError::Forbidden(_) => (StatusCode::FORBIDDEN, message(&text)),
        PortalError::NotFound { .. } => (StatusCode::NOT_FOUND, message(&text)),
        PortalError::Transition { .. } => (StatusCode::CONFLICT, message(&text)),
    }
}

fn gemini_status(err: &GeminiError) -> (StatusCode, Value) {
    match err {
        GeminiError::MissingApiKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            message("Missing GEMINI_API_KEY"),
        ),
        GeminiError::Upstream { status, body } => {
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, with_details("Gemini request failed", body.as_str()))
        }
        GeminiError::Transport(_) | GeminiError::Decode(_) | GeminiError::Message(_) => (
            StatusCode::BAD_REQUEST,
            with_details("Invalid request", err.to_string()),
        ),
        GeminiError::Endpoint(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            with_details("Gemini is misconfigured", err.to_string()),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!("Request refused with {}: {}", status, self);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_errors_map_to_statuses() {
        let cases = [
            (ApiError::from(PortalError::InvalidCredentials), 401),
            (ApiError::from(PortalError::Forbidden("manage alerts")), 403),
            (ApiError::from(PortalError::not_found("village", 7)), 404),
            (
                ApiError::from(PortalError::Transition {
                    kind: "application",
                    from: "approved",
                    to: "submitted",
                }),
                409,
            ),
            (ApiError::MissingToken, 401),
            (ApiError::Gemini(GeminiError::MissingApiKey), 500),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_body().0.as_u16(), expected, "{err}");
        }
    }

    #[test]
    fn upstream_failures_keep_status_and_body() {
        let err = ApiError::Gemini(GeminiError::Upstream {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            body: "quota".to_string(),
        });
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({"error": "Gemini request failed", "details": "quota"}));
    }
}
