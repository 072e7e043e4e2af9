use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use geomap_core::error::{ErrorKind, GeomapError};

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    /// Processing step that failed: dataset load, intent resolution, rendering
    pub step: Option<&'static str>,
    pub available_columns: Option<Vec<String>>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None, step: None, available_columns: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Convert a domain error, naming the step that failed
    pub fn at_step(step: &'static str, err: GeomapError) -> Self {
        let mut api = Self::from(err);
        api.message = format!("{} failed: {}", capitalize(step), api.message);
        api.step = Some(step);
        api
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_columns: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
            step: self.step,
            available_columns: self.available_columns,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GeomapError> for ApiError {
    fn from(err: GeomapError) -> Self {
        let status = match &err {
            GeomapError::LlmUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GeomapError::LlmRequest { .. } => StatusCode::BAD_GATEWAY,
            GeomapError::FormatError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GeomapError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => match err.kind() {
                ErrorKind::InputValidation => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        let mut api = Self::new(status, err.to_string());
        api.available_columns = err.available_columns().map(<[String]>::to_vec);
        api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = GeomapError::LlmUnavailable { reason: "no key".into(), remediation: "set it".into() };
        assert_eq!(ApiError::from(err).status, StatusCode::SERVICE_UNAVAILABLE);

        let err = GeomapError::UnsupportedIndex { name: "EVI".into() };
        assert_eq!(ApiError::from(err).status, StatusCode::BAD_REQUEST);

        let err = GeomapError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(ApiError::from(err).status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_step_and_columns() {
        let err = GeomapError::ColumnNotFound { column: "gdp".into(), available: vec!["pop".into()] };
        let api = ApiError::at_step("rendering", err);
        assert_eq!(api.step, Some("rendering"));
        assert!(api.message.starts_with("Rendering failed: Column 'gdp' not found"));
        assert_eq!(api.available_columns, Some(vec!["pop".to_string()]));
    }
}
