// Mapping of controller failures onto HTTP responses
use crate::application::controller::ControllerError;
use crate::application::rate_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub ControllerError);

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(ControllerError::Store(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ControllerError::Validation(_) | ControllerError::Import(_) => StatusCode::BAD_REQUEST,
            ControllerError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ControllerError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ControllerError::Store(StoreError::Storage(_)) | ControllerError::Generator(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
