//! Router assembly

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth_routes::auth_router;
use crate::behavior_routes::behavior_router;
use crate::geo_routes::geo_router;
use crate::info_routes::info_router;
use crate::rating_routes::rating_router;
use crate::state::AppState;
use crate::tracking_routes::tracking_router;

pub fn build_router(state: AppState) -> Router {
    let ui_dir = state.config.ui_dir.clone();

    let api = Router::new()
        .route("/health", get(health))
        .merge(geo_router())
        .merge(rating_router())
        .merge(behavior_router())
        .merge(info_router())
        .merge(auth_router())
        .merge(tracking_router())
        .with_state(state);

    // Static file serving for the portal UI, if built
    let app = if ui_dir.exists() {
        tracing::info!("   Serving UI from {}", ui_dir.display());
        api.fallback_service(ServeDir::new(ui_dir))
    } else {
        tracing::warn!("   UI directory {} not found, serving API only", ui_dir.display());
        api
    };

    app.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "safety-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_state(config: GatewayConfig) -> AppState {
        AppState::new(GatewayConfig {
            ui_dir: PathBuf::from("does/not/exist"),
            ..config
        })
        .unwrap()
    }

    fn app() -> (Router, AppState) {
        let state = test_state(GatewayConfig::default());
        (build_router(state.clone()), state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        send(app, builder.body(body).unwrap()).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        call(app, Method::GET, uri, None).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        call(app, Method::POST, uri, Some(body)).await
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "safety-gateway");
    }

    #[tokio::test]
    async fn test_ratings_grouped_and_nearby() {
        let (app, _) = app();

        let (status, body) = post_json(&app, "/api/ratings", json!({"lat": 48.8584, "lng": 2.2945, "rating": 4})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        post_json(&app, "/api/ratings", json!({"lat": 48.8590, "lng": 2.2950, "rating": 5})).await;

        let (status, body) = post_json(&app, "/api/ratings", json!({"lat": 48.85, "lng": 2.29, "rating": 6})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("between 1 and 5"));

        let (status, body) = post_json(&app, "/api/ratings", json!({"lng": 2.29, "rating": 3})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing field: lat");

        let (_, groups) = get_json(&app, "/api/ratings").await;
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["count"], 2);
        assert_eq!(groups[0]["rating"], 4.5);

        let (_, nearby) = get_json(&app, "/api/ratings?lat=48.8584&lng=2.2945").await;
        assert_eq!(nearby["average_rating"], 4.5);
        assert_eq!(nearby["total_ratings"], 2);
        assert_eq!(nearby["radius_km"], 5.0);

        let (_, far) = get_json(&app, "/api/ratings?lat=-33.8568&lng=151.2153&radius=1").await;
        assert_eq!(far["average_rating"], Value::Null);
        assert_eq!(far["message"], "No ratings found in this area");
    }

    #[tokio::test]
    async fn test_sos_lands_in_alert_feed() {
        let (app, _) = app();
        let (status, body) = post_json(&app, "/api/sos", json!({"location": {"lat": 1.0, "lng": 2.0}})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "SOS alert sent");

        let (_, alerts) = get_json(&app, "/api/alerts").await;
        let alerts = alerts.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["type"], "sos");
        assert_eq!(alerts[0]["message"], "SOS Emergency triggered");
        assert_eq!(alerts[0]["data"]["location"]["lat"], 1.0);
    }

    #[tokio::test]
    async fn test_alert_feed_is_capped_at_ten() {
        let (app, _) = app();
        for _ in 0..12 {
            call(&app, Method::POST, "/api/sos", None).await;
        }
        let (_, alerts) = get_json(&app, "/api/alerts").await;
        assert_eq!(alerts.as_array().unwrap().len(), 10);
        assert_eq!(alerts[0]["data"]["location"], "Unknown");
    }

    #[tokio::test]
    async fn test_behavior_builds_hotspot_and_join() {
        let (app, _) = app();
        for (i, dlat) in [0.0, 0.001, 0.002].iter().enumerate() {
            let (status, _) = post_json(
                &app,
                "/api/behavior",
                json!({"user_id": format!("u{}", i), "name": format!("Tourist {}", i), "lat": 51.5080 + dlat, "lng": -0.1281}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, list) = get_json(&app, "/api/hotspots").await;
        let hotspots = list["hotspots"].as_array().unwrap();
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0]["tourist_count"], 3);
        let id = hotspots[0]["id"].as_str().unwrap().to_string();

        let (status, detail) = get_json(&app, &format!("/api/hotspots/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["radius"], 500);

        let uri = format!("/api/hotspots/join/{}", id);
        let (_, joined) = post_json(&app, &uri, json!({"user_id": "late", "name": "Late Arrival"})).await;
        assert_eq!(joined["success"], true);
        assert_eq!(joined["message"], "Joined hotspot with 4 tourists!");

        let (_, again) = post_json(&app, &uri, json!({"user_id": "late"})).await;
        assert_eq!(again["success"], false);
        assert_eq!(again["message"], "Already joined this hotspot");

        let (status, _) = get_json(&app, "/api/hotspots/hotspot_99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = post_json(&app, "/api/hotspots/join/hotspot_99", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_behavior_defaults_and_community() {
        let (app, _) = app();
        post_json(&app, "/api/behavior", json!({"lat": 40.7580, "lng": -73.9855})).await;
        post_json(&app, "/api/behavior", json!({"user_id": "nyc2", "name": "Sam", "lat": 40.7590, "lng": -73.9845})).await;

        let (status, body) = get_json(&app, "/api/tourist-community?lat=40.7580&lng=-73.9855&user_id=nyc2").await;
        assert_eq!(status, StatusCode::OK);
        let tourists = body["tourists"].as_array().unwrap();
        assert_eq!(tourists.len(), 1);
        assert_eq!(tourists[0]["id"], "anonymous");
        assert_eq!(tourists[0]["name"], "Anonymous Tourist");
        assert_eq!(body["radius_km"], 2.0);

        let (status, _) = get_json(&app, "/api/tourist-community?lat=40.7").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_behavior_analysis() {
        let (app, _) = app();
        let (status, _) = get_json(&app, "/api/behavior/ghost/analysis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        for i in 0..3 {
            post_json(&app, "/api/behavior", json!({"user_id": "walker", "lat": 35.0 + i as f64 * 0.0001, "lng": 139.0})).await;
        }
        let (_, early) = get_json(&app, "/api/behavior/walker/analysis?hour=12").await;
        assert_eq!(early["samples"], 3);
        assert_eq!(early["patterns"], Value::Null);
        assert_eq!(early["message"], "Not enough movement data for analysis");

        for i in 3..6 {
            post_json(&app, "/api/behavior", json!({"user_id": "walker", "lat": 35.0 + i as f64 * 0.0001, "lng": 139.0})).await;
        }
        let (status, body) = get_json(&app, "/api/behavior/walker/analysis?hour=12").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["samples"], 6);
        assert_eq!(body["patterns"]["erratic_movement"], false);
        assert_eq!(body["assessment"]["high_risk"], false);

        let (status, _) = get_json(&app, "/api/behavior/walker/analysis?hour=30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assistant_news_and_language() {
        let (app, _) = app();

        let (status, reply) = post_json(&app, "/api/ai-assistant", json!({"message": "EMERGENCY please"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["response"], safety_core::assistant::EMERGENCY_REPLY);
        assert!(reply["timestamp"].is_string());

        let (_, reply) = post_json(&app, "/api/ai-assistant", json!({})).await;
        assert_eq!(reply["response"], safety_core::assistant::GENERIC_REPLY);

        let (status, _) = get_json(&app, "/api/safety-news").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, news) = get_json(&app, "/api/safety-news?location=Rome").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!news["news"].as_array().unwrap().is_empty());

        let (_, lang) = get_json(&app, "/api/language/Paris").await;
        assert_eq!(lang["location"], "Paris");
        assert_eq!(lang["language"]["code"], "fr");
        assert_eq!(lang["phrases"]["where_is"], "Où est");

        let (_, phrases) = get_json(&app, "/api/language/phrases/zz").await;
        assert_eq!(
            phrases["phrases"]["where_is"],
            safety_core::language::ENGLISH_PHRASES.where_is
        );
    }

    #[tokio::test]
    async fn test_upstream_routes_validate_before_calling_out() {
        let (app, _) = app();
        let (status, body) = get_json(&app, "/api/weather?lat=10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Latitude and longitude required");

        let (status, _) = get_json(&app, "/api/search?q=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(&app, "/api/tourist-attractions").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(&app, "/api/reverse-geocode?lat=200&lng=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_input_uses_error_envelope() {
        let (app, _) = app();

        let (status, body) = post_json(&app, "/api/ratings", json!({"lat": 1.0, "lng": 2.0, "rating": 3.5})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("rating"));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/ai-assistant")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"message\": "))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/behavior")
            .body(Body::from(json!({"user_id": "u"}).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Content-Type"));

        let (status, body) = get_json(&app, "/api/tourist-community?lat=abc&lng=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query string"));

        let (status, body) = get_json(&app, "/api/behavior/u/analysis?hour=noon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_auth_flow() {
        let (app, _) = app();
        let creds = json!({"name": "Asha", "email": "asha@example.com", "password": "s3cret"});

        let (status, reg) = post_json(&app, "/api/auth/register", creds.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reg["user_id"], "1");
        let message = reg["message"].as_str().unwrap();
        let code = message.rsplit(": ").next().unwrap().to_string();
        assert_eq!(code.len(), 6);

        let (status, _) = post_json(&app, "/api/auth/register", creds.clone()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = post_json(&app, "/api/auth/login", creds.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please verify your email first");

        let (status, _) = post_json(&app, "/api/auth/verify", json!({"email": "asha@example.com", "code": "000000x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = post_json(&app, "/api/auth/verify", json!({"email": "asha@example.com", "code": code})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Email verified successfully");

        let (status, _) = post_json(&app, "/api/auth/login", json!({"email": "asha@example.com", "password": "nope"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, login) = post_json(&app, "/api/auth/login", creds).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["user"]["name"], "Asha");
        let token = login["token"].as_str().unwrap().to_string();

        let authed = |uri: &str| {
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let (_, status_body) = send(&app, authed("/api/auth/status")).await;
        assert_eq!(status_body["logged_in"], true);
        assert_eq!(status_body["user"]["email"], "asha@example.com");

        let (_, anon) = get_json(&app, "/api/auth/status").await;
        assert_eq!(anon["logged_in"], false);

        let (_, bye) = send(&app, authed("/api/auth/logout")).await;
        assert_eq!(bye["message"], "Logged out successfully");
        let (_, after) = send(&app, authed("/api/auth/status")).await;
        assert_eq!(after["logged_in"], false);

        let (_, dash) = get_json(&app, "/api/dashboard").await;
        assert_eq!(dash["active_tourists"], 1);
    }

    #[tokio::test]
    async fn test_blockchain_verify() {
        let (app, _) = app();
        post_json(&app, "/api/auth/register", json!({"name": "Li", "email": "li@example.com", "password": "pw"})).await;

        let (status, first) = post_json(&app, "/api/blockchain/verify", json!({"email": "li@example.com"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["verified"], true);
        assert_eq!(first["message"], "ID verified and stored on blockchain");
        assert_eq!(first["hash"].as_str().unwrap().len(), 64);

        let (_, second) = post_json(&app, "/api/blockchain/verify", json!({"email": "li@example.com"})).await;
        assert_eq!(second["verified"], true);
        assert_eq!(second["message"], "Blockchain verification successful");
        assert_eq!(second["hash"], first["hash"]);

        let (status, _) = post_json(&app, "/api/blockchain/verify", json!({"email": "nobody@example.com"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = post_json(&app, "/api/blockchain/verify", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tracking_lifecycle() {
        let (app, state) = app();
        post_json(&app, "/api/ratings", json!({"lat": 41.9028, "lng": 12.4964, "rating": 1})).await;

        let mut events = state.events.subscribe();

        let (status, session) = post_json(&app, "/api/tracking/start", json!({"user_id": "t1", "name": "Rosa"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["state"], "active");
        let id = session["id"].as_str().unwrap().to_string();

        let (_, again) = post_json(&app, "/api/tracking/start", json!({"user_id": "t1"})).await;
        assert_eq!(again["id"], id.as_str());

        let position = format!("/api/tracking/{}/position", id);
        let (status, body) = post_json(&app, &position, json!({"lat": 41.9029, "lng": 12.4965, "hour": 14})).await;
        assert_eq!(status, StatusCode::OK);
        let emitted = body["events"].as_array().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0]["event"], "safety_zone");

        let published = events.recv().await.unwrap();
        assert_eq!(published.session_id(), id);

        // Cooldown suppresses an immediate repeat
        let (_, body) = post_json(&app, &position, json!({"lat": 41.9029, "lng": 12.4965, "hour": 14})).await;
        assert!(body["events"].as_array().unwrap().is_empty());

        let (_, alerts) = get_json(&app, "/api/alerts").await;
        let alerts = alerts.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["type"], "safety_zone");

        let (_, status_body) = get_json(&app, &format!("/api/tracking/{}", id)).await;
        assert_eq!(status_body["samples_seen"], 2);

        let (_, dash) = get_json(&app, "/api/dashboard").await;
        assert_eq!(dash["active_tracking_sessions"], 1);
        assert_eq!(dash["behavior_analysis"]["total_users"], 1);

        let (status, stopped) = post_json(&app, &format!("/api/tracking/{}/stop", id), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stopped["state"], "stopped");

        let (status, _) = post_json(&app, &position, json!({"lat": 41.9, "lng": 12.49})).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_tracking_unknown_session() {
        let (app, _) = app();
        let (status, _) = get_json(&app, "/api/tracking/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = post_json(&app, "/api/tracking/nope/position", json!({"lat": 1.0, "lng": 1.0})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get_json(&app, "/api/tracking/nope/events").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tracking_events_stream_opens() {
        let (app, _) = app();
        let (_, session) = post_json(&app, "/api/tracking/start", json!({})).await;
        let id = session["id"].as_str().unwrap();

        let request = Request::builder()
            .uri(format!("/api/tracking/{}/events", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn test_refresh_prunes_stopped_sessions() {
        let state = test_state(GatewayConfig {
            session_retention_secs: 0,
            ..GatewayConfig::default()
        });
        let app = build_router(state.clone());

        let (_, session) = post_json(&app, "/api/tracking/start", json!({"user_id": "p"})).await;
        let id = session["id"].as_str().unwrap().to_string();
        post_json(&app, &format!("/api/tracking/{}/stop", id), json!({})).await;

        let report = crate::refresh::refresh_once(&state, chrono::Utc::now()).await;
        assert_eq!(report.pruned_sessions, 1);
        let (status, _) = get_json(&app, &format!("/api/tracking/{}", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refresh_expires_idle_sessions_and_histories() {
        let state = test_state(GatewayConfig {
            idle_timeout_secs: 600,
            ..GatewayConfig::default()
        });
        let app = build_router(state.clone());

        let (_, session) = post_json(&app, "/api/tracking/start", json!({"user_id": "idle"})).await;
        let id = session["id"].as_str().unwrap().to_string();
        let (status, _) = post_json(
            &app,
            &format!("/api/tracking/{}/position", id),
            json!({"lat": 27.1751, "lng": 78.0421, "hour": 12}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.behavior.read().await.user_count(), 1);

        let soon = crate::refresh::refresh_once(&state, chrono::Utc::now()).await;
        assert_eq!(soon.expired_sessions, 0);
        assert_eq!(soon.pruned_histories, 0);

        let later = chrono::Utc::now() + chrono::Duration::hours(1);
        let report = crate::refresh::refresh_once(&state, later).await;
        assert_eq!(report.expired_sessions, 1);
        assert_eq!(report.pruned_histories, 1);
        assert_eq!(state.behavior.read().await.user_count(), 0);
        assert_eq!(state.hotspots.read().await.tourist_count(), 0);

        let (status, body) = get_json(&app, &format!("/api/tracking/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "stopped");
    }
}
