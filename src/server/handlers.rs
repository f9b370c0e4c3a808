use super::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};
use crate::{
    Error,
    relay::{Relay, fallback},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// Failure surfaced by a handler, rendered as a status code plus a calm reply.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    reply: String,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            reply: reply.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected chat request body: {}", rejection.body_text());
        Self::new(
            rejection.status(),
            "request body must be JSON like {\"message\": \"...\"}",
            fallback::UNREADABLE_REQUEST_REPLY,
        )
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, msg, fallback::EMPTY_MESSAGE_REPLY)
            }
            Error::Config(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "the service is not configured to answer right now",
                fallback::UNAVAILABLE_REPLY,
            ),
            other => {
                error!("Unexpected failure while handling chat request: {}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong on our side",
                    fallback::UNAVAILABLE_REPLY,
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            reply: self.reply,
        };
        (self.status, Json(body)).into_response()
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    info!("Received chat request for session: {}", session_id);

    match state.relay.respond(&request.message).await {
        Ok(reply) => {
            if reply.fallback {
                info!("Answered session {} with a fallback reply", session_id);
            } else {
                info!("Successfully relayed reply for session: {}", session_id);
            }
            Ok(Json(ChatResponse {
                reply: reply.text,
                session_id,
            }))
        }
        Err(e) => {
            warn!("Chat request for session {} failed: {}", session_id, e);
            Err(e.into())
        }
    }
}

/// Liveness probe for uptime monitors. Never touches the relay.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
