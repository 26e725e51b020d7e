//! Chat proxy in front of Gemini's `generateContent`.

use axum::{Json, body::Bytes, extract::State};
use fra_portal::{ChatRequest, GeminiError};
use serde_json::{Value, json};

use crate::{error::ApiError, state::SharedState};

/// POST /api/gemini-chat
pub async fn gemini_chat(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if state.gemini.config().api_key.is_none() {
        return Err(GeminiError::MissingApiKey.into());
    }

    let body: Value = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let request = ChatRequest::from_value(&body)?;
    let reply = state.gemini.chat(&request).await?;
    Ok(Json(json!({ "reply": reply })))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
