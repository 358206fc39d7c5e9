use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relief_core::{FieldError, ReliefError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Relief(#[from] ReliefError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Relief(err) => match err {
                ReliefError::Validation(_) => StatusCode::BAD_REQUEST,
                ReliefError::NotFound(_) => StatusCode::NOT_FOUND,
                ReliefError::Conflict(_) => StatusCode::CONFLICT,
                ReliefError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Relief(ReliefError::Validation(errors)) => ErrorBody {
                message: "Invalid request data".to_string(),
                errors: Some(errors),
            },
            other if status.is_server_error() && status != StatusCode::BAD_GATEWAY => {
                error!(target: "http", error = %other, "Request failed");
                ErrorBody {
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            other => {
                if status == StatusCode::BAD_GATEWAY {
                    warn!(target: "http", error = %other, "Upstream failure");
                }
                ErrorBody {
                    message: other.to_string(),
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
