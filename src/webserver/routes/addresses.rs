use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::webserver::{
    state::AppState,
    utils::{cursor_response, explorer_error_response, page_response, success_response},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressQuery {
    pub address: Option<String>,
    pub last_address: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/address/balances", get(address_balances))
        .route("/addresses", get(all_addresses))
        .route("/holders/top", get(top_holders))
}

/// GET /api/v1/address/balances?address=
async fn address_balances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> Response {
    let address = query.address.as_deref().unwrap_or("");
    let scope = state.request_scope();
    match scope
        .run(state.explorer.address_balances(address, scope.token()))
        .await
    {
        Ok(portfolio) => success_response(portfolio),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/addresses?lastAddress=&pageSize=
async fn all_addresses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> Response {
    let scope = state.request_scope();
    let result = scope
        .run(state.explorer.all_addresses(
            query.last_address.as_deref(),
            query.page_size,
            scope.token(),
        ))
        .await;
    match result {
        Ok(page) => cursor_response(page),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/holders/top?page=&pageSize=
///
/// Full ledger scan per call.
async fn top_holders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> Response {
    let scope = state.request_scope();
    let result = scope
        .run(
            state
                .explorer
                .top_holders(query.page, query.page_size, scope.token()),
        )
        .await;
    match result {
        Ok(page) => {
            let info = page.info();
            page_response(page.items, info)
        }
        Err(e) => explorer_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::WebserverConfig;
    use crate::webserver::routes::tests::{get, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_address_balances() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app.clone(), "/api/v1/address/balances?address=kaspa:bob").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["address"], "kaspa:bob");
        assert_eq!(body["data"]["balances"][0]["tick"], "KASP");
        assert_eq!(body["data"]["balances"][0]["locked"], "100000");
        assert_eq!(body["data"]["balances"][0]["decimals"], 8);

        let (status, _) = get(app, "/api/v1/address/balances").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_address_catalog_cursor() {
        let app = test_app(WebserverConfig::default());
        let (_, first) = get(app.clone(), "/api/v1/addresses?pageSize=1").await;
        assert_eq!(first["data"][0]["address"], "kaspa:alice");
        assert_eq!(first["pagination"]["hasMore"], true);
        assert_eq!(first["pagination"]["nextCursor"], "kaspa:alice");

        let (_, second) = get(app, "/api/v1/addresses?pageSize=1&lastAddress=kaspa:alice").await;
        assert_eq!(second["data"][0]["address"], "kaspa:bob");
        assert_eq!(second["pagination"]["hasMore"], false);
    }

    #[tokio::test]
    async fn test_top_holders() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app, "/api/v1/holders/top").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["address"], "kaspa:alice");
        assert_eq!(body["data"][0]["tokenCount"], 1);
        assert_eq!(body["data"][0]["totalValue"], "400000");
        assert_eq!(body["pagination"]["pageSize"], 2000);
    }
}
