use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::users::repo::RepoError;

/// Every failure a handler can report. Serialized as a JSON envelope with a stable `error` reason.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("id must be a positive integer, got '{0}'")]
    InvalidId(String),

    #[error("malformed request body: {0}")]
    InvalidBody(String),

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("user {id} not found")]
    NotFound { id: i64 },

    #[error("{field} already in use")]
    Conflict { field: &'static str },

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method {0} not allowed here")]
    MethodNotAllowed(String),

    #[error("store unavailable")]
    StoreUnavailable,

    #[error("internal server error")]
    Internal,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::InvalidBody(_) | ApiError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound { .. } | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => "invalid_id",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "constraint_violation",
            ApiError::RouteNotFound(_) => "route_not_found",
            ApiError::MethodNotAllowed(_) => "method_not_allowed",
            ApiError::StoreUnavailable => "store_unavailable",
            ApiError::Internal => "internal_error",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Validation { field, .. } | ApiError::Conflict { field } => {
                Some(json!({ "field": field }))
            }
            ApiError::NotFound { id } => Some(json!({ "id": id })),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.reason(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { id } => ApiError::NotFound { id },
            RepoError::ConstraintViolation { field } => ApiError::Conflict { field },
            RepoError::Unavailable(msg) => {
                error!(error = %msg, "store unavailable");
                ApiError::StoreUnavailable
            }
            RepoError::Store(msg) => {
                error!(error = %msg, "store error");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Router fallback for paths nothing matches.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// Per-route fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
