use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::{ErrorCode, TravelAiError};

/// Error returned by every handler, rendered as `{ "error": { "code", "message" } }`
#[derive(Debug)]
pub struct ApiError(pub TravelAiError);

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ConfigMissing => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ApiNetworkError | ErrorCode::ApiInvalidResponse | ErrorCode::GenerationFailed => {
            StatusCode::BAD_GATEWAY
        }
        ErrorCode::StorageFailure | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = status_for(code);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = json!({
            "error": {
                "code": code.as_str(),
                "message": self.0.user_message(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<TravelAiError> for ApiError {
    fn from(err: TravelAiError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(TravelAiError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(TravelAiError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(TravelAiError::validation(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TravelAiError::validation("x"), StatusCode::BAD_REQUEST)]
    #[case(TravelAiError::unauthorized("x"), StatusCode::UNAUTHORIZED)]
    #[case(TravelAiError::not_found("x"), StatusCode::NOT_FOUND)]
    #[case(TravelAiError::config("x"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(TravelAiError::generation("x"), StatusCode::BAD_GATEWAY)]
    #[case(TravelAiError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] err: TravelAiError, #[case] expected: StatusCode) {
        assert_eq!(ApiError(err).into_response().status(), expected);
    }
}
