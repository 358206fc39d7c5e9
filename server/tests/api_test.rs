//! End-to-end tests against the router with an in-memory database

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use relief_core::config::ServerConfig;
use relief_core::model::UserRole;
use relief_core::{
    AuthConfig, ReliefError, Store, Units, WeatherQuery, WeatherReport, WeatherSource,
};
use relief_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct FakeWeather {
    fail: bool,
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current(
        &self,
        query: &WeatherQuery,
        units: Units,
    ) -> relief_core::Result<WeatherReport> {
        if self.fail {
            return Err(ReliefError::UpstreamError("forecast service down".into()));
        }
        let (location, latitude, longitude) = match query {
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => (format!("{latitude:.2}, {longitude:.2}"), *latitude, *longitude),
            WeatherQuery::Place(name) => (name.clone(), 24.9, 91.9),
        };
        Ok(WeatherReport {
            location,
            latitude,
            longitude,
            temperature: 29.5,
            humidity: Some(88),
            wind_speed: Some(14.0),
            precipitation: Some(12.4),
            conditions: "Heavy rain".into(),
            units,
            fetched_at: Utc::now(),
        })
    }
}

fn test_state(auth: AuthConfig, weather_fails: bool) -> AppState {
    let store = Store::open_in_memory().unwrap();
    AppState::new(
        store,
        Arc::new(FakeWeather {
            fail: weather_fails,
        }),
        auth,
    )
}

fn test_app() -> (Router, AppState) {
    let state = test_state(AuthConfig::default(), false);
    (build_router(state.clone(), &ServerConfig::default()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router, subject: &str) -> String {
    let request = Request::post("/api/login")
        .header("x-auth-request-user", subject)
        .header("x-auth-request-email", format!("{subject}@relief.example"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn zone_body() -> Value {
    json!({
        "name": "Riverside Ward",
        "district": "Sylhet",
        "latitude": 24.89,
        "longitude": 91.87,
        "riskLevel": "high",
        "waterLevelCm": 140.0
    })
}

#[tokio::test]
async fn health_check_needs_no_auth() {
    let (app, _) = test_app();
    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_rejects_missing_session() {
    let (app, _) = test_app();
    let request = Request::get("/api/flood-zones").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = send(&app, get("/api/flood-zones", "not-a-session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_headers_alone_are_ignored_unless_trusted() {
    let (app, _) = test_app();
    let request = Request::get("/api/auth/user")
        .header("x-auth-request-user", "sub-9")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let trusted = AuthConfig {
        trust_identity_headers: true,
        ..AuthConfig::default()
    };
    let app = build_router(test_state(trusted, false), &ServerConfig::default());
    let request = Request::get("/api/auth/user")
        .header("x-auth-request-user", "sub-9")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "sub-9");
}

#[tokio::test]
async fn login_requires_identity_headers() {
    let (app, _) = test_app();
    let request = Request::post("/api/login").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_session_and_profile() {
    let (app, _) = test_app();
    let request = Request::post("/api/login")
        .header("x-auth-request-user", "sub-1")
        .header("x-auth-request-email", "rahim@ngo.org")
        .header("x-auth-request-preferred-username", "Rahim")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["expiresAt"].is_string());
    assert_eq!(body["user"]["role"], "field_worker");
    assert_eq!(body["user"]["firstName"], "Rahim");

    let token = body["token"].as_str().unwrap();
    let (status, me) = send(&app, get("/api/auth/user", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "rahim@ngo.org");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let request = Request::post("/api/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get("/api/auth/user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn flood_zone_lifecycle() {
    let (app, state) = test_app();
    let token = login(&app, "sub-1").await;
    let mut feed = state.events.subscribe();

    let (status, zone) = send(&app, with_json("POST", "/api/flood-zones", &token, zone_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(zone["radiusMeters"], 1000);
    assert_eq!(zone["isActive"], true);
    let id = zone["id"].as_i64().unwrap();

    let event = feed.try_recv().unwrap();
    assert_eq!(event.id, id.to_string());
    assert_eq!(event.actor.as_deref(), Some("sub-1"));

    let (status, patched) = send(
        &app,
        with_json(
            "PATCH",
            &format!("/api/flood-zones/{id}"),
            &token,
            json!({ "riskLevel": "critical", "isActive": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["riskLevel"], "critical");
    assert_eq!(patched["name"], "Riverside Ward");

    let (_, active) = send(&app, get("/api/flood-zones?active=true", &token)).await;
    assert_eq!(active.as_array().unwrap().len(), 0);
    let (_, all) = send(&app, get("/api/flood-zones", &token)).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, map) = send(&app, get("/api/flood-zones/map", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["type"], "FeatureCollection");
    assert_eq!(map["features"][0]["geometry"]["coordinates"][0], 91.87);
}

#[tokio::test]
async fn invalid_payload_lists_field_errors() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let mut body = zone_body();
    body["name"] = json!("");
    body["latitude"] = json!(120.0);
    let (status, error) = send(&app, with_json("POST", "/api/flood-zones", &token, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Invalid request data");
    let fields: Vec<&str> = error["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"latitude"));
}

#[tokio::test]
async fn unknown_enum_value_is_a_bad_request() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let mut body = zone_body();
    body["riskLevel"] = json!("apocalyptic");
    let (status, error) = send(&app, with_json("POST", "/api/flood-zones", &token, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn empty_patch_and_missing_row() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let (status, _) = send(&app, with_json("PATCH", "/api/response-teams/1", &token, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        with_json("PATCH", "/api/response-teams/99", &token, json!({ "status": "deployed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("99"));

    let (status, _) = send(&app, get("/api/response-teams/abc", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_records_the_current_user() {
    let (app, _) = test_app();
    let token = login(&app, "worker-7").await;

    let (status, person) = send(
        &app,
        with_json(
            "POST",
            "/api/affected-population",
            &token,
            json!({ "fullName": "Amina Begum", "familySize": 5, "priority": "high" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(person["registeredBy"], "worker-7");
    assert_eq!(person["evacuationStatus"], "not_evacuated");

    let (_, high) = send(&app, get("/api/affected-population?priority=high", &token)).await;
    assert_eq!(high.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn distribution_draws_down_stock_and_refuses_overdraw() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let (_, resource) = send(
        &app,
        with_json(
            "POST",
            "/api/relief-resources",
            &token,
            json!({ "name": "Rice", "resourceType": "food", "quantity": 50, "unit": "kg" }),
        ),
    )
    .await;
    let resource_id = resource["id"].as_i64().unwrap();

    let (status, dist) = send(
        &app,
        with_json(
            "POST",
            "/api/distributions",
            &token,
            json!({ "resourceId": resource_id, "quantity": 30, "recipientCount": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dist["distributedBy"], "sub-1");

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/distributions",
            &token,
            json!({ "resourceId": resource_id, "quantity": 30 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (_, resource) = send(&app, get(&format!("/api/relief-resources/{resource_id}"), &token)).await;
    assert_eq!(resource["distributed"], 30);

    let (_, stats) = send(&app, get("/api/dashboard/stats", &token)).await;
    assert_eq!(stats["distributionRate"], 60);
    assert_eq!(stats["totalResources"], 1);
}

#[tokio::test]
async fn stats_start_at_zero() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;
    let (status, stats) = send(&app, get("/api/dashboard/stats", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["activeZones"], 0);
    assert_eq!(stats["affectedPopulation"], 0);
    assert_eq!(stats["distributionRate"], 0);
    assert_eq!(stats["responseTeams"], 0);
}

#[tokio::test]
async fn weather_proxy() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let (status, report) = send(&app, get("/api/weather?lat=24.9&lon=91.87", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["conditions"], "Heavy rain");
    assert_eq!(report["units"], "metric");

    let (status, report) = send(&app, get("/api/weather?location=Sylhet&units=imperial", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["location"], "Sylhet");
    assert_eq!(report["units"], "imperial");

    let (status, _) = send(&app, get("/api/weather", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/weather?lat=95&lon=10", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_weather_failure_is_bad_gateway() {
    let state = test_state(AuthConfig::default(), true);
    let app = build_router(state, &ServerConfig::default());
    let token = login(&app, "sub-1").await;

    let (status, body) = send(&app, get("/api/weather?lat=24.9&lon=91.87", &token)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().contains("forecast service down"));
}

#[tokio::test]
async fn only_district_officers_change_roles() {
    let (app, state) = test_app();
    let worker = login(&app, "worker-1").await;
    let officer = login(&app, "officer-1").await;
    state
        .store
        .set_user_role("officer-1", UserRole::DistrictOfficer)
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        with_json("PATCH", "/api/users/worker-1/role", &worker, json!({ "role": "district_officer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, user) = send(
        &app,
        with_json("PATCH", "/api/users/worker-1/role", &officer, json!({ "role": "ngo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "ngo");

    let (_, users) = send(&app, get("/api/users", &officer)).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn profile_update_cannot_touch_role() {
    let (app, _) = test_app();
    let token = login(&app, "sub-1").await;

    let (status, user) = send(
        &app,
        with_json(
            "PATCH",
            "/api/auth/user",
            &token,
            json!({ "organization": "Red Crescent", "role": "district_officer" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["organization"], "Red Crescent");
    assert_eq!(user["role"], "field_worker");
}

#[tokio::test]
async fn out_of_range_session_lifetime_still_yields_a_live_session() {
    for hours in [0, -1, i64::MAX] {
        let auth = AuthConfig {
            session_ttl_hours: hours,
            ..AuthConfig::default()
        };
        let app = build_router(test_state(auth, false), &ServerConfig::default());
        let token = login(&app, "sub-1").await;

        let (status, _) = send(&app, get("/api/auth/user", &token)).await;
        assert_eq!(status, StatusCode::OK, "session_ttl_hours = {hours}");
    }
}
