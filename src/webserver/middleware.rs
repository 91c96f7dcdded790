/// Webserver middleware
///
/// Per-client rate limiting and request logging.
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::{
    logger::{self, LogTag},
    webserver::{state::AppState, utils},
};

/// Client tables above this size are pruned of idle entries
const PRUNE_THRESHOLD: usize = 10_000;

/// Sliding-window request counter keyed by client
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request at `now`; `Err` carries how long until a slot frees up
    pub async fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().await;

        if clients.len() > PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, hits| {
                hits.back()
                    .map_or(false, |last| now.duration_since(*last) < window)
            });
        }

        let hits = clients.entry(client.to_string()).or_default();
        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_requests {
            let retry_after = hits
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        hits.push_back(now);
        Ok(())
    }

    pub async fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now()).await
    }
}

/// Client key: peer address when the server provides it, else the first
/// forwarded address, else a shared bucket
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 429 once a client exceeds its window allowance
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);
    match state.rate_limiter.check(&client).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            logger::warning(
                LogTag::Webserver,
                &format!(
                    "Rate limit exceeded for {} on {}",
                    client,
                    request.uri().path()
                ),
            );
            let mut response = utils::error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests",
                Some(&format!(
                    "Limit is {} requests per {}s",
                    state.config.rate_limit_requests, state.config.rate_limit_window_secs
                )),
            );
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

/// Method, path, status and latency of every request
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let line = format!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        status.as_u16(),
        started.elapsed().as_millis()
    );
    if status.is_server_error() {
        logger::warning(LogTag::Webserver, &line);
    } else {
        logger::debug(LogTag::Webserver, &line);
    }
    response
}
