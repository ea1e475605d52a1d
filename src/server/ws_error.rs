/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Use these helpers to ensure all error messages are consistent, explicit, and include a code and context.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::{Value, json};

use crate::server::channel::messages::ServerWsMessage;

/// Formats a WebSocket error frame as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_MESSAGE").
/// - `message`: Human-readable error message (in English).
/// - `context`: Optional context (e.g. session id, remaining ban time).
pub fn ws_error_message(code: &str, message: &str, context: Option<Value>) -> String {
    serde_json::to_string(&ServerWsMessage::error(code, message, context)).unwrap_or_else(|_| {
        r#"{"action":"Error","data":{"code":"INTERNAL","message":"Internal server error","context":null}}"#
            .to_string()
    })
}

/// Returns a WebSocket message for a session replaced by a newer connection.
pub fn ws_session_kicked_message(reason: &str, context: Option<Value>) -> String {
    ws_error_message("SESSION_KICKED", reason, context)
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    }))
}
