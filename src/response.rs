use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type ApiResult<T> = Result<T, AppError>;

/// Body of every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            log_app_error(&self, status);
        }
        ErrorBody::new(self.message()).into_response_with(status)
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_app_error(err: &AppError, status: StatusCode) {
    tracing::error!(
        status = status.as_u16(),
        kind = err.kind(),
        message = %err.message(),
        "request failed"
    );
}

#[cfg(test)]
mod tests {
    use axum::{body, http::StatusCode, response::IntoResponse};

    use super::ErrorBody;
    use crate::error::AppError;

    async fn render(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let body = serde_json::from_slice(&bytes).expect("body should be json");
        (status, body)
    }

    #[tokio::test]
    async fn error_kinds_map_to_distinct_statuses() {
        let (status, body) = render(AppError::not_found("Todo not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Todo not found");

        let (status, _) = render(AppError::validation("bad id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = render(AppError::persistence("Failed to fetch todos")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to fetch todos");
    }
}
