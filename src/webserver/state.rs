/// Shared application state for the webserver
use crate::config::WebserverConfig;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::explorer::Explorer;
use crate::webserver::middleware::RateLimiter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<Explorer>,
    pub config: Arc<WebserverConfig>,
    pub rate_limiter: Arc<RateLimiter>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(explorer: Arc<Explorer>, config: WebserverConfig) -> Self {
        let rate_limiter = RateLimiter::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            explorer,
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }

    /// Cancellation scope for one request, bounded by the configured deadline
    pub fn request_scope(&self) -> RequestScope {
        RequestScope::new(Duration::from_secs(self.config.request_timeout_secs))
    }
}

/// Ties a query's cancellation token to the lifetime of its request.
///
/// Dropping the scope (axum drops the handler future when the client goes
/// away) cancels the token; so does running past the deadline.
pub struct RequestScope {
    token: CancellationToken,
    deadline: Duration,
    _guard: DropGuard,
}

impl RequestScope {
    pub fn new(deadline: Duration) -> Self {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        Self {
            token,
            deadline,
            _guard: guard,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub async fn run<T, F>(&self, query: F) -> ExplorerResult<T>
    where
        F: Future<Output = ExplorerResult<T>>,
    {
        match tokio::time::timeout(self.deadline, query).await {
            Ok(result) => result,
            Err(_) => {
                self.token.cancel();
                Err(ExplorerError::Cancelled {
                    operation: "request deadline",
                })
            }
        }
    }
}
