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
    utils::{cursor_response, explorer_error_response, success_response},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationQuery {
    pub hash: Option<String>,
    pub last_score: Option<i64>,
    pub page_size: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transaction", get(operation_by_hash))
        .route("/transactions", get(all_operations))
}

/// GET /api/v1/transaction?hash=
async fn operation_by_hash(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OperationQuery>,
) -> Response {
    let hash = query.hash.as_deref().unwrap_or("");
    let scope = state.request_scope();
    match scope
        .run(state.explorer.operation_by_hash(hash, scope.token()))
        .await
    {
        Ok(operation) => success_response(operation),
        Err(e) => explorer_error_response(&e),
    }
}

/// GET /api/v1/transactions?lastScore=&pageSize=
async fn all_operations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OperationQuery>,
) -> Response {
    let scope = state.request_scope();
    let result = scope
        .run(
            state
                .explorer
                .all_operations(query.last_score, query.page_size, scope.token()),
        )
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
    async fn test_operation_by_hash() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app.clone(), "/api/v1/transaction?hash=tx7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["op"], "mint");
        assert_eq!(body["data"]["opScore"], "7");
        assert_eq!(body["data"]["feeRev"], "1000");
        assert!(body["data"].get("opAccept").is_none());

        let (status, body) = get(app, "/api/v1/transaction?hash=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_all_operations_past_the_end() {
        let app = test_app(WebserverConfig::default());
        let (status, body) = get(app, "/api/v1/transactions?lastScore=7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
        assert_eq!(body["pagination"]["hasMore"], false);
        assert!(body["pagination"].get("nextCursor").is_none());
    }
}
