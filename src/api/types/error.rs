//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Error returned by handlers, rendered as a JSON body with the matching status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Provider { provider, message } => {
                Self::unavailable(format!("{}: {}", provider, message)).with_code("provider_error")
            }
            DomainError::Retrieval { backend, message } => {
                Self::unavailable(format!("{}: {}", backend, message)).with_code("retrieval_error")
            }
            DomainError::Timeout { .. } => Self::unavailable(err.to_string()).with_code("timeout"),
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = DomainError::validation("Question cannot be empty").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "Question cannot be empty");
    }

    #[test]
    fn test_backend_failures_map_to_unavailable() {
        let retrieval: ApiError = DomainError::retrieval("qdrant", "connection refused").into();
        assert_eq!(retrieval.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(retrieval.response.error.code.as_deref(), Some("retrieval_error"));
        assert_eq!(retrieval.response.error.message, "qdrant: connection refused");

        let provider: ApiError = DomainError::provider("groq", "rate limited").into();
        assert_eq!(provider.status, StatusCode::SERVICE_UNAVAILABLE);

        let timeout: ApiError =
            DomainError::timeout("retrieval", Duration::from_secs(30)).into();
        assert_eq!(timeout.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(timeout.response.error.code.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_configuration_maps_to_internal() {
        let err: ApiError = DomainError::configuration("top_k must be at least 1").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response.error.error_type, ApiErrorType::ServerError);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::bad_request("Invalid value").with_param("question");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "question");
        assert!(json["error"].get("code").is_none());
    }
}
