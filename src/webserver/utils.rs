/// Response envelope helpers
///
/// Every endpoint answers `{success, data?, error?, pagination?}`.
use crate::errors::ExplorerError;
use crate::logger::{self, LogTag};
use crate::pagination::{CursorInfo, CursorPage, PageInfo};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Pagination {
    Pages(PageInfo),
    Cursor(CursorInfo),
}

pub fn success_response<T: Serialize>(data: T) -> Response {
    envelope(StatusCode::OK, Some(data), None, None)
}

/// Count-paginated success
pub fn page_response<T: Serialize>(data: T, info: PageInfo) -> Response {
    envelope(StatusCode::OK, Some(data), None, Some(Pagination::Pages(info)))
}

/// Cursor-paginated success; the cursor is rendered as a string
pub fn cursor_response<T: Serialize, C: ToString>(page: CursorPage<T, C>) -> Response {
    let info = page.info();
    envelope(
        StatusCode::OK,
        Some(page.items),
        None,
        Some(Pagination::Cursor(info)),
    )
}

pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    let error = ApiError {
        code: code.to_string(),
        message: message.to_string(),
        details: details.map(str::to_string),
    };
    envelope::<()>(status, None, Some(error), None)
}

pub fn status_for(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
        ExplorerError::NotFound { .. } => StatusCode::NOT_FOUND,
        ExplorerError::MalformedMetadata { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ExplorerError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ExplorerError::InconsistentLedgerState { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ExplorerError::Cancelled { .. } => StatusCode::REQUEST_TIMEOUT,
        ExplorerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a core failure onto the envelope.
///
/// Client mistakes stay at debug level; everything else is logged.
pub fn explorer_error_response(err: &ExplorerError) -> Response {
    let status = status_for(err);
    match err {
        ExplorerError::InvalidArgument { .. } | ExplorerError::NotFound { .. } => {
            logger::debug(LogTag::Webserver, &format!("Rejected request: {}", err));
        }
        ExplorerError::Cancelled { .. } => {
            logger::warning(LogTag::Webserver, &err.to_string());
        }
        _ => logger::error(LogTag::Webserver, &err.to_string()),
    }
    error_response(status, err.code(), &err.to_string(), None)
}

fn envelope<T: Serialize>(
    status: StatusCode,
    data: Option<T>,
    error: Option<ApiError>,
    pagination: Option<Pagination>,
) -> Response {
    let body = ApiResponse {
        success: error.is_none(),
        data,
        error,
        pagination,
    };
    (status, Json(body)).into_response()
}
