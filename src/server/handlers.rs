use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::AppState;
use crate::api::{ChatReplyBody, ChatRequestBody, ErrorBody, HealthResponse};
use crate::core::error::RelayError;

pub const INVALID_JSON_MESSAGE: &str = "Request body must be valid JSON";

fn error_response(err: &RelayError, model: Option<&str>) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        error: err.message(),
        details: err.details(),
        model: if err.is_client_error() {
            None
        } else {
            model.map(str::to_string)
        },
    };
    (status, Json(body)).into_response()
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.router.default_model().to_string(),
        version: Some(crate::version_string()),
    })
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed chat request");
            let body = ErrorBody {
                error: INVALID_JSON_MESSAGE.to_string(),
                details: Some(rejection.body_text()),
                model: None,
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let model = state.router.effective_model(body.model.as_deref()).to_string();
    match state.router.route(&body).await {
        Ok(reply) => Json(ChatReplyBody::from(reply)).into_response(),
        Err(err) if err.is_client_error() => {
            warn!(model = %model, error = %err, "Rejected chat request");
            error_response(&err, Some(&model))
        }
        Err(err) => {
            error!(model = %model, error = %err, "Chat request failed");
            error_response(&err, Some(&model))
        }
    }
}
