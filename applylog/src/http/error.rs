//! API errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use applylog_core::error::ApplicationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Application(err) => match err {
                ApplicationError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ApplicationError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
                ApplicationError::NothingToUpdate => (StatusCode::BAD_REQUEST, "nothing_to_update"),
                ApplicationError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
                ApplicationError::StorageOperationFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_operation_failed")
                }
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            detail: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_onto_status_codes() {
        let cases = [
            (ApiError::from(ApplicationError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(ApplicationError::Validation("x".into())), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::from(ApplicationError::NothingToUpdate), StatusCode::BAD_REQUEST),
            (ApiError::from(ApplicationError::StorageUnavailable("x".into())), StatusCode::SERVICE_UNAVAILABLE),
            (
                ApiError::from(ApplicationError::StorageOperationFailed("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
