//! Maps URL paths to handlers.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;

use crate::handlers::{alerts, applications, auth, chat, complaints, insights, places, roles};
use crate::logging::log_requests;
use crate::state::{AppState, SharedState};

fn chat_route() -> MethodRouter<SharedState> {
    post(chat::gemini_chat).fallback(chat::method_not_allowed)
}

pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/health", get(insights::health))
        // Chat proxy
        .route("/api/gemini-chat", chat_route())
        .route("/.netlify/functions/gemini-chat", chat_route())
        // Session
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/role", put(auth::select_role))
        .route("/api/me", get(auth::me))
        // Roles and navigation
        .route("/api/roles/{role}/permissions", get(roles::role_permissions))
        .route("/api/roles/{role}/tabs", get(roles::role_tabs))
        .route("/api/routes/guard", get(roles::guard))
        .route("/api/home", get(roles::home))
        // Places and map layers
        .route("/api/states", get(places::list_states))
        .route("/api/states/{name}/districts", get(places::state_districts))
        .route("/api/villages", get(places::list_villages))
        .route(
            "/api/villages/{id}",
            get(places::village_detail).patch(places::edit_village),
        )
        .route("/api/villages/{id}/edits", delete(places::reset_village))
        .route("/api/forest-areas", get(places::list_forest_areas))
        .route("/api/forest-areas/{id}", get(places::forest_area_detail))
        .route("/api/map/{file}", get(places::map_layer))
        // Applications
        .route(
            "/api/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/api/applications/uploads/check",
            post(applications::check_upload),
        )
        .route(
            "/api/applications/{id}",
            get(applications::application_detail)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        .route(
            "/api/applications/{id}/status",
            post(applications::change_status),
        )
        .route(
            "/api/applications/{id}/validate",
            post(applications::validate_application),
        )
        // Complaints
        .route(
            "/api/complaints",
            get(complaints::list_complaints).post(complaints::submit_complaint),
        )
        .route(
            "/api/complaints/{id}/status",
            post(complaints::set_complaint_status),
        )
        // Alerts
        .route(
            "/api/alerts",
            get(alerts::list_alerts).post(alerts::create_alert),
        )
        .route(
            "/api/alerts/{id}",
            patch(alerts::update_alert).delete(alerts::delete_alert),
        )
        // Insights
        .route("/api/analysis", post(insights::run_analysis))
        .route("/api/analytics/dashboard", get(insights::dashboard))
        .route("/api/analytics/villages", get(insights::village_breakdown))
        .route("/api/statistics", get(insights::statistics))
        .route("/api/recommendations", get(insights::recommendations))
        // Middleware
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
        .with_state(shared)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use fra_portal::GeminiConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app_with(gemini: GeminiConfig) -> Router {
        build_router(AppState::new(gemini).unwrap())
    }

    fn app() -> Router {
        app_with(GeminiConfig::default())
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    fn claim() -> Value {
        json!({
            "applicantName": "Sita Devi",
            "village": "Kumhargaon",
            "district": "Mandla",
            "state": "Madhya Pradesh",
            "landArea": "4.5 hectares",
            "landType": "individual",
            "claimType": "individual_forest_rights",
            "description": "Cultivated since 1990",
            "priority": "high",
            "coordinates": {"lat": 22.5957, "lng": 80.3689}
        })
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = send(&app(), "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn login_me_and_logout() {
        let app = app();
        let token = login(&app, "tribal@fraportal.com", "tribal123").await;

        let (status, me) = send(&app, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["role"], "ministry_tribal");
        assert_eq!(me["dashboard"], "/tribal-dashboard");
        assert!(me.get("token").is_none());
        assert!(me["tabs"].as_array().unwrap().contains(&json!("ai-insights")));

        let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, "POST", "/api/auth/logout", Some("stale"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn bad_credentials_and_missing_tokens() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "someone@example.com", "password": "guess"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (status, _) = send(&app, "GET", "/api/applications", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signup_then_switch_role() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": "new@example.com", "password": "secret1", "displayName": "Asha"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "normal");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            "/api/auth/role",
            Some(&token),
            Some(json!({"role": "ngo"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dashboard"], "/ngo-dashboard");

        let (status, _) = send(
            &app,
            "PUT",
            "/api/auth/role",
            Some(&token),
            Some(json!({"role": "wizard"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn route_guard_and_role_tables() {
        let app = app();
        let (_, body) = send(&app, "GET", "/api/routes/guard?path=/ngo-dashboard", None, None).await;
        assert_eq!(body, json!({"decision": "redirect", "to": "/login"}));

        let token = login(&app, "gov@fraportal.com", "gov123").await;
        let (_, body) = send(
            &app,
            "GET",
            "/api/routes/guard?path=/ngo-dashboard",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["to"], "/government-dashboard");

        let (_, body) = send(&app, "GET", "/api/home", None, None).await;
        assert_eq!(body["view"], "limited_local_dashboard");

        let (_, tabs) = send(&app, "GET", "/api/roles/normal/tabs", None, None).await;
        assert_eq!(
            tabs,
            json!(["dashboard", "map", "fra-applications", "complaints", "role-dashboard"])
        );
        let (status, perms) = send(&app, "GET", "/api/roles/nobody/permissions", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(perms["canManageUsers"], false);
    }

    #[tokio::test]
    async fn application_lifecycle() {
        let app = app();
        let local = login(&app, "user@fraportal.com", "user123").await;
        let gov = login(&app, "gov@fraportal.com", "gov123").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/applications",
            Some(&local),
            Some(json!({"applicantName": "Sita Devi"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        for field in ["village", "district", "state", "landArea", "description"] {
            assert!(body["fields"].get(field).is_some(), "missing error for {field}");
        }

        let (status, created) =
            send(&app, "POST", "/api/applications", Some(&local), Some(claim())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "submitted");
        assert_eq!(created["canApprove"], false);
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("FRA-"));

        let (_, listed) = send(&app, "GET", "/api/applications", Some(&gov), None).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["applications"][0]["canApprove"], true);

        let status_uri = format!("/api/applications/{id}/status");
        let (status, _) = send(
            &app,
            "POST",
            &status_uri,
            Some(&local),
            Some(json!({"status": "approved"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, approved) = send(
            &app,
            "POST",
            &status_uri,
            Some(&gov),
            Some(json!({"status": "approved", "notes": "Verified on site"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["reviewNotes"], "Verified on site");

        let (status, _) = send(
            &app,
            "POST",
            &status_uri,
            Some(&gov),
            Some(json!({"status": "approved"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, report) = send(
            &app,
            "POST",
            &format!("/api/applications/{id}/validate"),
            Some(&gov),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(report["score"].as_u64().is_some());
    }

    #[tokio::test]
    async fn drafts_are_private_to_their_owner() {
        let app = app();
        let local = login(&app, "user@fraportal.com", "user123").await;
        let ngo = login(&app, "ngo@fraportal.com", "ngo123").await;

        let (status, draft) = send(
            &app,
            "POST",
            "/api/applications",
            Some(&local),
            Some(json!({"draft": true, "applicantName": "Ravi"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(draft["status"], "draft");
        assert_eq!(draft["canEdit"], true);

        let uri = format!("/api/applications/{}", draft["id"].as_str().unwrap());
        let (status, _) = send(&app, "GET", &uri, Some(&ngo), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &uri, Some(&local), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn village_filters_and_edits() {
        let app = app();
        let (_, body) = send(&app, "GET", "/api/villages?status=Approved", None, None).await;
        let villages = body["villages"].as_array().unwrap();
        assert!(!villages.is_empty());
        assert!(villages.iter().all(|v| v["status"] == "Approved"));
        assert_eq!(body["summary"]["pending"], 0);

        let (status, _) = send(&app, "GET", "/api/villages?status=Lost", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let local = login(&app, "user@fraportal.com", "user123").await;
        let patch = json!({"population": 3000});
        let (status, _) =
            send(&app, "PATCH", "/api/villages/1", Some(&local), Some(patch.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let gov = login(&app, "gov@fraportal.com", "gov123").await;
        let (status, village) =
            send(&app, "PATCH", "/api/villages/1", Some(&gov), Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(village["population"], 3000);
        assert_eq!(village["edited"], true);

        let (_, village) = send(&app, "DELETE", "/api/villages/1/edits", Some(&gov), None).await;
        assert_eq!(village["edited"], false);

        let (status, _) = send(&app, "GET", "/api/villages/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn map_layers() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/map/forest-areas.geojson", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 10);

        let (status, _) = send(&app, "GET", "/api/map/rivers.geojson", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/api/map/villages", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn alerts_need_permission_to_publish() {
        let app = app();
        let draft = json!({
            "title": "Fire watch",
            "message": "Dry conditions near Similipal",
            "type": "warning",
            "priority": "high",
            "coordinates": {"lat": 21.9, "lng": 86.3},
            "state": "Odisha",
            "district": "Mayurbhanj",
            "targetAudience": "all"
        });

        let local = login(&app, "user@fraportal.com", "user123").await;
        let (status, _) =
            send(&app, "POST", "/api/alerts", Some(&local), Some(draft.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let gov = login(&app, "gov@fraportal.com", "gov123").await;
        let (status, created) = send(&app, "POST", "/api/alerts", Some(&gov), Some(draft)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = send(&app, "GET", "/api/alerts?search=fire", None, None).await;
        assert_eq!(listed[0]["id"], created["id"]);
        assert_eq!(listed[0]["isExpired"], false);

        let uri = format!("/api/alerts/{}", created["id"]);
        let (status, _) = send(&app, "DELETE", &uri, Some(&gov), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &uri, Some(&gov), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn complaints_are_scoped_by_role() {
        let app = app();
        let local = login(&app, "user@fraportal.com", "user123").await;
        let gov = login(&app, "gov@fraportal.com", "gov123").await;

        let (_, mine) = send(&app, "GET", "/api/complaints", Some(&local), None).await;
        let (_, all) = send(&app, "GET", "/api/complaints", Some(&gov), None).await;
        assert!(
            mine["complaints"].as_array().unwrap().len()
                < all["complaints"].as_array().unwrap().len()
        );

        let (status, filed) = send(
            &app,
            "POST",
            "/api/complaints",
            Some(&local),
            Some(json!({"village": "Kumhargaon", "issue": "Boundary", "description": "Fence moved"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(filed["status"], "open");

        let (status, updated) = send(
            &app,
            "POST",
            &format!("/api/complaints/{}/status", filed["id"]),
            Some(&gov),
            Some(json!({"status": "resolved", "response": "Survey scheduled"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["response"], "Survey scheduled");
    }

    #[tokio::test]
    async fn analytics_requires_permission() {
        let app = app();
        let local = login(&app, "user@fraportal.com", "user123").await;
        let (status, _) = send(&app, "GET", "/api/analytics/dashboard", Some(&local), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let gov = login(&app, "gov@fraportal.com", "gov123").await;
        let (status, body) = send(&app, "GET", "/api/analytics/dashboard", Some(&gov), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active_users"], 1802);
        assert_eq!(body["monthly_trends"].as_array().unwrap().len(), 6);

        let (status, body) = send(
            &app,
            "POST",
            "/api/analysis",
            None,
            Some(json!({"coordinates": {"lat": 95.0, "lng": 80.0}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    #[tokio::test]
    async fn dashboard_starts_from_national_figures() {
        let app = app();
        let gov = login(&app, "gov@fraportal.com", "gov123").await;
        let (status, body) = send(&app, "GET", "/api/analytics/dashboard", Some(&gov), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_applications"], 1234);
        assert_eq!(body["pending_applications"], 109505);
        assert_eq!(body["approved_applications"], 856);
        assert_eq!(body["verified_documents"], 400000);
        assert_eq!(body["applications_by_state"]["Odisha"], 500);
        assert_eq!(body["applications_by_type"]["habitation"], 134);
        assert_eq!(body["recent_activities"], json!([]));

        let local = login(&app, "user@fraportal.com", "user123").await;
        let (status, _) =
            send(&app, "POST", "/api/applications", Some(&local), Some(claim())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, body) = send(&app, "GET", "/api/analytics/dashboard", Some(&gov), None).await;
        assert_eq!(body["total_applications"], 1235);
        assert_eq!(body["pending_applications"], 109506);
        assert_eq!(body["applications_by_state"]["Madhya Pradesh"], 1);
        assert_eq!(body["recent_activities"][0]["applicant"], "Sita Devi");
    }

    #[tokio::test]
    async fn chat_without_key_is_a_server_error() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gemini-chat",
            None,
            Some(json!({"messages": []})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Missing GEMINI_API_KEY"}));
    }

    async fn fake_gemini(status: StatusCode, reply: Value) -> GeminiConfig {
        let upstream = Router::new().fallback(move || async move { (status, Json(reply)) });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        GeminiConfig::new(
            Some("test-key".to_string()),
            Some(&format!("http://{addr}/v1beta")),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn chat_relays_replies_and_upstream_failures() {
        let ok = app_with(
            fake_gemini(
                StatusCode::OK,
                json!({"candidates": [{"content": {"parts": [{"text": "Hello"}]}}]}),
            )
            .await,
        );
        let (status, body) = send(
            &ok,
            "POST",
            "/.netlify/functions/gemini-chat",
            None,
            Some(json!({"messages": [{"role": "user", "content": "Hi"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"reply": "Hello"}));

        let (status, body) = send(&ok, "GET", "/api/gemini-chat", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"error": "Method Not Allowed"}));

        let request = Request::builder()
            .method("POST")
            .uri("/api/gemini-chat")
            .body(Body::from("{not json"))
            .unwrap();
        let response = ok.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &ok,
            "POST",
            "/api/gemini-chat",
            None,
            Some(json!({"messages": [null]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
        assert_eq!(body["details"], "Malformed chat message: messages[0] is null, expected an object");

        let limited = app_with(
            fake_gemini(StatusCode::TOO_MANY_REQUESTS, json!({"error": "quota"})).await,
        );
        let (status, body) = send(&limited, "POST", "/api/gemini-chat", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Gemini request failed");
        assert_eq!(body["details"], r#"{"error":"quota"}"#);
    }
}
