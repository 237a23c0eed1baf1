//! HTTP error responses
//!
//! Every failed request answers with the same JSON body, `{ message, code,
//! details? }`. The status is derived from `code`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use unionall_core::db::RepositoryError;
use unionall_core::models::ValidationError;

use crate::json_patch::PatchError;

pub const NODE_NOT_FOUND: &str = "NODE_NOT_FOUND";
pub const VECTOR_NOT_FOUND: &str = "VECTOR_NOT_FOUND";
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
pub const RESOURCE_EXISTS: &str = "RESOURCE_EXISTS";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INVALID_PATCH: &str = "INVALID_PATCH";
pub const PERSISTENCE_FAILED: &str = "PERSISTENCE_FAILED";
pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
pub const EDIT_STATE_ERROR: &str = "EDIT_STATE_ERROR";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn node_not_found(id: i64) -> Self {
        Self::new(format!("Node not found: {}", id), NODE_NOT_FOUND)
    }

    pub fn vector_not_found(node_id: i64, vector_id: i64) -> Self {
        Self::new(
            format!("Vector {} not found for node {}", vector_id, node_id),
            VECTOR_NOT_FOUND,
        )
    }

    /// The repository reported that nothing was written
    pub fn persistence_failed(message: impl Into<String>) -> Self {
        let err = Self::new(message, PERSISTENCE_FAILED);
        tracing::error!("{}", err.message);
        err
    }

    /// 422 carrying every field error found in one request
    pub fn unprocessable(errors: &[ValidationError]) -> Self {
        let details = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::with_details("Request failed validation", VALIDATION_ERROR, details)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            NODE_NOT_FOUND | VECTOR_NOT_FOUND | RESOURCE_NOT_FOUND => StatusCode::NOT_FOUND,
            RESOURCE_EXISTS => StatusCode::CONFLICT,
            INVALID_INPUT => StatusCode::BAD_REQUEST,
            VALIDATION_ERROR | INVALID_PATCH => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::warn!("{} {}: {}", status.as_u16(), self.code, self.message);
        }
        (status, Json(self)).into_response()
    }
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Repository failure: {}", err);

        let code = match &err {
            RepositoryError::InvariantViolation { .. } => INVARIANT_VIOLATION,
            e if e.is_caller_error() => EDIT_STATE_ERROR,
            _ => DATABASE_ERROR,
        };

        HttpError::with_details("The data store could not complete the request", code, err.to_string())
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        HttpError::unprocessable(std::slice::from_ref(&err))
    }
}

impl From<PatchError> for HttpError {
    fn from(err: PatchError) -> Self {
        HttpError::with_details("Patch document could not be applied", INVALID_PATCH, err.to_string())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match &rejection {
            JsonRejection::JsonDataError(_) => VALIDATION_ERROR,
            _ => INVALID_INPUT,
        };
        HttpError::with_details("Request body could not be read", code, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HttpError::node_not_found(3).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::vector_not_found(3, 4).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::new("exists", RESOURCE_EXISTS).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HttpError::new("bad list", INVALID_INPUT).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::new("whatever", "SOMETHING_ELSE").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_are_unprocessable() {
        let err = HttpError::unprocessable(&[
            ValidationError::missing_field("nodeName"),
            ValidationError::default_not_allowed("nodeType"),
        ]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.details.unwrap();
        assert!(details.contains("nodeName is mandatory"));
        assert!(details.contains("nodeType cannot be set to Default"));
    }

    #[test]
    fn test_repository_errors_are_server_errors() {
        let err: HttpError = RepositoryError::InvariantViolation {
            table: "NODE",
            id: 4,
            count: 2,
        }
        .into();
        assert_eq!(err.code, INVARIANT_VIOLATION);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(HttpError::node_not_found(9)).unwrap();
        assert_eq!(json["code"], "NODE_NOT_FOUND");
        assert_eq!(json["message"], "Node not found: 9");
        assert!(json.get("details").is_none());
    }
}
