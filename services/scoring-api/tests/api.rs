//! Integration tests for the scoring HTTP surface
//!
//! Requests are driven through the router in-process; no socket is bound.

use agrosense_core::HealthStatus;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use chrono::DateTime;
use serde_json::Value;
use tower::ServiceExt;

use scoring_api::{router, with_middleware, HealthResponse, PredictResponse};

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn has_two_decimals(value: f64) -> bool {
    let scaled = value * 100.0;
    (scaled - scaled.round()).abs() < 1e-6
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(router(), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "Backend is running");
    assert!(DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
}

#[tokio::test]
async fn test_predict_is_consistent_with_scoring_thresholds() {
    for _ in 0..200 {
        let (status, body) = get_json(router(), "/predict").await;
        assert_eq!(status, StatusCode::OK);

        let prediction: PredictResponse = serde_json::from_value(body).unwrap();
        assert!((0.0..=100.0).contains(&prediction.plant_health));
        assert_eq!(
            prediction.health_status,
            HealthStatus::from_percent(prediction.plant_health)
        );
        assert!((0.0..=100.0).contains(&prediction.soil_moisture));
        assert!((5.0..=40.0).contains(&prediction.temperature));
        assert!(prediction.rainfall >= 0.0);
        assert!(has_two_decimals(prediction.plant_health));
        assert!(has_two_decimals(prediction.soil_moisture));
        assert!(DateTime::parse_from_rfc3339(&prediction.timestamp).is_ok());
    }
}

#[tokio::test]
async fn test_predict_status_label_on_wire() {
    let (_, body) = get_json(router(), "/predict").await;
    let label = body["health_status"].as_str().unwrap();
    assert!(["Needs Water", "Optimal", "Great"].contains(&label));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get_json(router(), "/train").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn exploding_handler() -> &'static str {
    panic!("model exploded")
}

#[tokio::test]
async fn test_panics_become_structured_500() {
    let app = with_middleware(Router::new().route("/boom", get(exploding_handler)));

    let (status, body) = get_json(app.clone(), "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "model exploded");

    // the same router keeps serving after a panic
    let (status, _) = get_json(app, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
