use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    amount::Amount,
    webserver::{
        state::AppState,
        utils::{
            cursor_response, explorer_error_response, page_response, success_response,
        },
    },
};

// =============================================================================
// QUERY / RESPONSE TYPES
// =============================================================================

/// Query parameters shared by the token endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuery {
    pub tick: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub last_score: Option<i64>,
    pub offset: Option<i64>,
}

impl TokenQuery {
    /// Missing tick is passed through as empty so validation reports it
    fn tick(&self) -> &str {
        self.tick.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyResponse {
    pub tick: String,
    pub circulating_supply: Amount,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tokens", get(all_tokens))
        .route("/token/info", get(token_info))
        .route("/token/balances", get(token_balances))
        .route("/token/holders", get(ranked_holders))
        .route("/token/snapshot", get(snapshot))
        .route("/token/supply", get(circulating_supply))
        .route("/token/operations", get(token_operations))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// GET /api/v1/tokens
async fn all_tokens(State(state): State<Arc<AppState>>) -> Response {
    let scope = state.request_scope();
    match scope.run(state.explorer.all_tokens(scope.token())).await {
        Ok(tokens) => success_response(tokens),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/info?tick=
async fn token_info(State(state): State<Arc<AppState>>, Query(query): Query<TokenQuery>) -> Response {
    let scope = state.request_scope();
    match scope
        .run(state.explorer.token_info(query.tick(), scope.token()))
        .await
    {
        Ok(meta) => success_response(meta),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/balances?tick=
async fn token_balances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let scope = state.request_scope();
    match scope
        .run(state.explorer.token_balances(query.tick(), scope.token()))
        .await
    {
        Ok(balances) => success_response(balances),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/holders?tick=&page=&pageSize=
async fn ranked_holders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let scope = state.request_scope();
    let result = scope
        .run(state.explorer.ranked_holders(
            query.tick(),
            query.page,
            query.page_size,
            scope.token(),
        ))
        .await;
    match result {
        Ok(page) => {
            let info = page.info();
            page_response(page.items, info)
        }
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/snapshot?tick=
async fn snapshot(State(state): State<Arc<AppState>>, Query(query): Query<TokenQuery>) -> Response {
    let scope = state.request_scope();
    match scope
        .run(state.explorer.snapshot(query.tick(), scope.token()))
        .await
    {
        Ok(snapshot) => success_response(snapshot),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/supply?tick=
async fn circulating_supply(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let scope = state.request_scope();
    match scope
        .run(state.explorer.circulating_supply(query.tick(), scope.token()))
        .await
    {
        Ok(circulating_supply) => success_response(SupplyResponse {
            tick: query.tick().trim().to_uppercase(),
            circulating_supply,
        }),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/token/operations?tick=&lastScore=|offset=&pageSize=
async fn token_operations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let scope = state.request_scope();
    let result = scope
        .run(state.explorer.operations_for_tick(
            query.tick(),
            query.last_score,
            query.offset,
            query.page_size,
            scope.token(),
        ))
        .await;
    match result {
        Ok(page) => cursor_response(page),
        Err(e) => explorer_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::WebserverConfig;
    use crate::webserver::routes::tests::{get, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_holders_page_envelope() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app, "/api/v1/token/holders?tick=kasp&page=1&pageSize=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["address"], "kaspa:alice");
        assert_eq!(body["data"][0]["balance"], "400000");
        assert_eq!(body["data"][0]["rank"], 1);
        assert_eq!(body["data"][1]["share"], 20.0);
        assert_eq!(body["pagination"]["totalRecords"], 2);
        assert_eq!(body["pagination"]["totalPages"], 1);
    }

    #[tokio::test]
    async fn test_invalid_tick_is_400() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app.clone(), "/api/v1/token/info?tick=AB12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");

        let (status, _) = get(app, "/api/v1/token/snapshot").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_token_is_404() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app, "/api/v1/token/info?tick=NONE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_snapshot_and_supply() {
        let app = test_app(WebserverConfig::default());
        let (_, snapshot) = get(app.clone(), "/api/v1/token/snapshot?tick=KASP").await;
        assert_eq!(snapshot["data"]["summary"]["circulatingSupply"], "900000");
        assert_eq!(snapshot["data"]["summary"]["holdersCount"], 2);

        let (status, supply) = get(app, "/api/v1/token/supply?tick=%20kasp").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(supply["data"]["tick"], "KASP");
        assert_eq!(supply["data"]["circulatingSupply"], "900000");
    }

    #[tokio::test]
    async fn test_token_operations_cursor() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app, "/api/v1/token/operations?tick=KASP&pageSize=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["hashRev"], "tx7");
        assert_eq!(body["pagination"]["hasMore"], false);
        assert_eq!(body["pagination"]["pageSize"], 5);
        assert_eq!(body["pagination"]["nextCursor"], "7");
    }
}
