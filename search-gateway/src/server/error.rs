//! The JSON error envelope every non-success response is rendered with.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use search_gateway_repository::SearchIndexError;
use serde::Serialize;
use tracing::error;

/// Content type of every JSON response the gateway produces.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The single message carried by every error envelope.
pub const ERROR_MESSAGE: &str = "Oops! This is embarrassing. An error occurred.";

/// Marks a response whose body is already an error envelope.
#[derive(Debug, Clone, Copy)]
struct EnvelopeRendered;

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: &'static str,
}

/// An HTTP error answered with the JSON error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
}

impl ApiError {
    /// An error answered with `status`.
    pub fn from_status(status: StatusCode) -> Self {
        Self { status }
    }

    /// Missing or mismatched credentials.
    pub fn unauthorized() -> Self {
        Self::from_status(StatusCode::UNAUTHORIZED)
    }

    /// More items than the safety limit allows.
    pub fn payload_too_large() -> Self {
        Self::from_status(StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// Anything else that went wrong.
    pub fn internal() -> Self {
        Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The status the error is answered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SearchIndexError> for ApiError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::SafetyLimitExceeded { .. } => Self::payload_too_large(),
            other => {
                error!(error = %other, "Unexpected search index error");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.status.as_u16(),
                message: ERROR_MESSAGE,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
        if self.status == StatusCode::UNAUTHORIZED {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response.extensions_mut().insert(EnvelopeRendered);
        response
    }
}

/// Replace the body of any error response that is not already an envelope.
///
/// This covers responses produced by the router itself (unknown path, wrong
/// method, body over the transport limit, extractor rejections).
pub async fn render_error_envelope(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.extensions().get::<EnvelopeRendered>().is_some()
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rendered = ApiError::from_status(status).into_response();
    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}
