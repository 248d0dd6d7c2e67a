// error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single connect-write-drain-close cycle.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("command {0:?} is not 7-bit ASCII")]
    NonAscii(String),
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out after {timeout:?} while {stage} {addr}")]
    Timeout {
        addr: String,
        stage: &'static str,
        timeout: Duration,
    },
    #[error("failed to write to {addr}: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {addr} dropped unexpectedly: {source}")]
    Disconnected {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(serde_json::json!({
            "message": self.to_string(),
            "code": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
