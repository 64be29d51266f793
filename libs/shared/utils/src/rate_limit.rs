use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::warn;

use shared_config::AppConfig;
use shared_models::error::AppError;

/// Past this many tracked clients, idle windows are dropped on the next check.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

impl RateLimitConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            requests_per_window: config.rate_limit_max,
            window_duration: Duration::from_secs(config.rate_limit_window_secs),
        }
    }
}

/// Per-client sliding window: at most `requests_per_window` requests in any
/// `window_duration`.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    windows: RwLock<HashMap<String, VecDeque<Instant>>>,
    config: RateLimitConfig,
}

impl SlidingWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Records a request for `client`, or returns how long until it may retry.
    pub async fn check(&self, client: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let window = self.config.window_duration;
        let mut windows = self.windows.write().await;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, requests| {
                requests.back().is_some_and(|last| now.duration_since(*last) < window)
            });
        }

        let requests = windows.entry(client.to_string()).or_default();
        while requests.front().is_some_and(|oldest| now.duration_since(*oldest) >= window) {
            requests.pop_front();
        }

        if requests.len() >= self.config.requests_per_window as usize {
            let retry_after = requests
                .front()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(window);
            return Err(retry_after);
        }

        requests.push_back(now);
        Ok(())
    }
}

/// Throttles by client address. Responds 429 with a `Retry-After` header once
/// the window is full.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request);

    if let Err(retry_after) = limiter.check(&client).await {
        let seconds = retry_after.as_secs().max(1);
        warn!("Rate limit exceeded for {}", client);

        let mut response = AppError::RateLimited(format!(
            "Too many requests, retry in {} seconds",
            seconds
        ))
        .into_response();
        response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        return response;
    }

    next.run(request).await
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_key(request: &Request<Body>) -> String {
    request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
