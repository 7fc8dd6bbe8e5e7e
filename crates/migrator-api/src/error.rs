//! HTTP error response conversion
//!
//! The receiver acknowledges every well-formed delivery, so the only errors
//! that reach a sender are body rejections. They render as JSON with a
//! machine-readable code.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

#[derive(Debug)]
pub enum HttpAppError {
    InvalidBody(String),
}

impl HttpAppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpAppError::InvalidBody(_) => "INVALID_EVENT_BODY",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            HttpAppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError::InvalidBody(format!("Invalid event body: {}", rejection.body_text()))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let HttpAppError::InvalidBody(ref message) = self;
        tracing::warn!(error = %message, error_code = self.error_code(), "Rejected event delivery");

        let body = Json(ErrorResponse {
            error: message.clone(),
            code: self.error_code().to_string(),
        });
        (self.status(), body).into_response()
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}
