use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cdw_core::error::{CdwError, ErrorKind};
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Malformed or mistyped request bodies answer like any other invalid input
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid input").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CdwError> for ApiError {
    fn from(err: CdwError) -> Self {
        let error = match (&err, err.kind()) {
            (_, ErrorKind::InvalidInput) => Self::bad_request("Invalid input"),
            (CdwError::OutsideCoverage { .. }, _) => {
                Self::not_found("Location is outside the covered area")
            }
            (CdwError::NoTransferRoute { .. }, _) => {
                Self::not_found("No transfer station route for this location")
            }
            (CdwError::NoLandfillRoute { .. }, _) => {
                Self::not_found("No landfill route from the transfer station")
            }
            (_, ErrorKind::NotFound) => Self::not_found("Not found"),
            (_, ErrorKind::DataIntegrity) => Self::conflict("Ambiguous routing data"),
            (_, ErrorKind::Service) => Self::bad_gateway("Upstream service failed"),
            _ => {
                tracing::error!(error = %err, "Request failed");
                Self::internal("Internal error")
            }
        };
        error.with_details(err.to_string())
    }
}
