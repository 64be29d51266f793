use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use schedule_cell::router::{availability_routes, schedule_routes, specialty_routes};
use shared_config::AppConfig;
use shared_utils::rate_limit::{rate_limit_middleware, RateLimitConfig, SlidingWindowRateLimiter};

use crate::stores::Stores;

pub fn create_router(config: Arc<AppConfig>, stores: &Stores) -> Router {
    let limiter = Arc::new(SlidingWindowRateLimiter::new(RateLimitConfig::from_app_config(&config)));
    let schedule_state = Arc::new(stores.schedule_state(config.clone()));
    let appointment_state = Arc::new(stores.appointment_state(config));

    Router::new()
        .route("/", get(|| async { "Agenda API is running!" }))
        .route("/health", get(health))
        .nest("/specialties", specialty_routes(schedule_state.clone()))
        .nest("/schedules", schedule_routes(schedule_state.clone()))
        .nest("/availability", availability_routes(schedule_state))
        .nest("/appointments", appointment_routes(appointment_state))
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": "Medical Schedules Service",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;
    use shared_utils::test_utils::TestConfig;

    async fn get_from(app: &Router, uri: &str, client: &str) -> axum::response::Response {
        let request = Request::builder()
            .uri(uri)
            .header("X-Forwarded-For", client)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    fn app() -> Router {
        create_router(TestConfig::default().to_arc(), &Stores::in_memory())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_cells_are_mounted() {
        assert_eq!(get_json("/specialties").await, (StatusCode::OK, json!([])));
        assert_eq!(get_json("/schedules").await, (StatusCode::OK, json!([])));
        assert_eq!(get_json("/appointments").await, (StatusCode::OK, json!([])));
        assert_eq!(
            get_json("/availability/doctors/nobody?start_date=2024-06-03&end_date=2024-06-09").await,
            (StatusCode::OK, json!([]))
        );
    }

    #[tokio::test]
    async fn test_requests_over_the_limit_get_429() {
        let mut config = TestConfig::default().to_app_config();
        config.rate_limit_max = 2;
        let app = create_router(Arc::new(config), &Stores::in_memory());

        for _ in 0..2 {
            assert_eq!(get_from(&app, "/health", "203.0.113.7").await.status(), StatusCode::OK);
        }

        let response = get_from(&app, "/availability/doctors/doc-1?start_date=2024-06-03&end_date=2024-06-09", "203.0.113.7").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Too many requests"));

        // Other clients keep their own budget.
        assert_eq!(get_from(&app, "/health", "198.51.100.1").await.status(), StatusCode::OK);
    }
}
