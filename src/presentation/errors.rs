// HTTP error mapping
use crate::application::grid_controller::ControllerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum::extract::rejection::JsonRejection;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid layout")]
    InvalidLayout,
    #[error("{0}")]
    BadRequest(String),
    #[error("unknown tile '{0}'")]
    TileNotFound(String),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidLayout | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TileNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Controller(ControllerError::NotReady)
            | ApiError::Controller(ControllerError::NotEditing) => StatusCode::CONFLICT,
            ApiError::Controller(ControllerError::UnknownWidgetType(_)) => StatusCode::NOT_FOUND,
            ApiError::Controller(ControllerError::Persist(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
