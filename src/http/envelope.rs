use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::PayError;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

/// Domain errors keep their code; anything else is reported as internal.
pub fn error_response(e: anyhow::Error) -> Response {
    let Some(pay) = e.downcast_ref::<PayError>() else {
        tracing::error!("internal error: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(err("INTERNAL_ERROR", &e.to_string())),
        )
            .into_response();
    };

    let status = match pay {
        PayError::TransactionNotFound(_) | PayError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        PayError::Api { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(err(pay.code(), &e.to_string()))).into_response()
}
