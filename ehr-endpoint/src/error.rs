//! Error types for the HTTP surface.

use actix_web::{
    dev::ServiceResponse, error::ResponseError, http::StatusCode, middleware::ErrorHandlerResponse,
    HttpResponse, HttpResponseBuilder,
};
use serde_json::json;

use ehr_common::errors::{EhrError, EhrErrorKind};

/// Common `Result` type.
pub type ApiResult<T> = Result<T, ApiError>;

/// The main error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Required fields were missing from the request body
    #[error("{0}")]
    Validation(String),

    /// The request body could not be read
    #[error("Invalid request body: {0}")]
    Payload(String),

    /// The cell store failed; carries what was being attempted
    #[error("{summary}: {details}")]
    Store {
        summary: &'static str,
        details: String,
    },

    #[error("API endpoint not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap a record layer error, naming the operation that failed.
    pub fn from_ehr(summary: &'static str, error: EhrError) -> Self {
        match error.kind {
            EhrErrorKind::Validation(e) => ApiError::Validation(e.to_string()),
            kind => ApiError::Store {
                summary,
                details: kind.to_string(),
            },
        }
    }

    /// The short description rendered as `error`.
    fn summary(&self) -> String {
        match self {
            ApiError::Store { summary, .. } => (*summary).to_owned(),
            ApiError::Payload(_) => "Invalid request body".to_owned(),
            ApiError::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }

    /// The underlying message rendered as `details`.
    fn details(&self) -> Option<&str> {
        match self {
            ApiError::Store { details, .. }
            | ApiError::Payload(details)
            | ApiError::Internal(details) => Some(details),
            ApiError::Validation(_) | ApiError::NotFound => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        if let ApiError::NotFound = self {
            return HttpResponseBuilder::new(code).json(json!({"error": self.to_string()}));
        }
        let mut body = json!({
            "success": false,
            "error": self.summary(),
        });
        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }
        HttpResponseBuilder::new(code).json(body)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(inner: std::io::Error) -> Self {
        ApiError::Internal(inner.to_string())
    }
}

impl From<cadence::MetricError> for ApiError {
    fn from(inner: cadence::MetricError) -> Self {
        ApiError::Internal(inner.to_string())
    }
}

/// Render unmatched routes as a JSON 404.
pub fn render_404<B>(
    res: ServiceResponse<B>,
) -> std::result::Result<ErrorHandlerResponse<B>, actix_web::Error> {
    // Replace the outbound error message with our own.
    let resp = ApiError::NotFound.error_response();
    Ok(ErrorHandlerResponse::Response(
        res.into_response(resp).map_into_right_body(),
    ))
}
