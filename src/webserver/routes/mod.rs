use crate::logger::{self, LogTag};
use crate::webserver::{
    middleware::{rate_limit, request_logging},
    state::AppState,
};
use axum::{
    http::{HeaderValue, Method},
    middleware, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod addresses;
pub mod operations;
pub mod status;
pub mod tokens;

/// Full router: `/api/v1` routes behind CORS, request logging and rate limiting
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(request_logging))
                .layer(middleware::from_fn_with_state(state.clone(), rate_limit)),
        )
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(tokens::routes())
        .merge(addresses::routes())
        .merge(operations::routes())
}

/// Read-only API: GET and preflight only. `*` anywhere in the list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                logger::warning(
                    LogTag::Webserver,
                    &format!("Ignoring invalid CORS origin '{}'", origin),
                );
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
