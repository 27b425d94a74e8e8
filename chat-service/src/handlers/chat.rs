use crate::models::{ChatInput, ChatMessage, ChatReply, IncomingFile};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use serde_json::Value;
use service_core::error::AppError;
use std::collections::HashMap;

pub const EMPTY_MESSAGE: &str = "Empty message";
pub const INVALID_REQUEST_FORMAT: &str = "Invalid request format";

/// `POST /chat`: JSON, urlencoded form or multipart (with optional `file`).
pub async fn chat(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ChatReply>, AppError> {
    match handle_chat(&state, request).await {
        Ok(reply) => Ok(Json(reply)),
        Err(err) => {
            if err.is_client_error() {
                tracing::warn!(status = %err.status(), error = %err, "Rejected chat request");
            } else {
                tracing::error!(error = %err, "Chat request failed");
            }
            Err(err)
        }
    }
}

async fn handle_chat(state: &AppState, request: Request) -> Result<ChatReply, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let content_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        content_type = %content_type,
        content_length = %content_length,
        "Chat request received"
    );

    let input = read_input(state, &content_type, request).await?;

    match input {
        ChatInput::File(file) => state.chat.reply_to_upload(file).await,
        ChatInput::Message(message) => state.chat.reply_to_message(message).await,
        ChatInput::EmptyMessage => Err(AppError::BadRequest(EMPTY_MESSAGE.to_string())),
        ChatInput::Invalid => Err(AppError::BadRequest(INVALID_REQUEST_FORMAT.to_string())),
    }
}

async fn read_input(
    state: &AppState,
    content_type: &str,
    request: Request,
) -> Result<ChatInput, AppError> {
    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;
        return read_multipart(multipart).await;
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(mut fields) = Form::<HashMap<String, String>>::from_request(request, state)
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;
        return Ok(ChatInput::classify(None, fields.remove("message"), None));
    }

    if is_json(content_type) {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;
        return Ok(json_input(&body));
    }

    Ok(ChatInput::Invalid)
}

/// Only a JSON object is a chat body. A missing or null `message` is an
/// empty message; a `message` that is not a string is malformed.
fn json_input(body: &[u8]) -> ChatInput {
    let mut fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Chat body is not a JSON object");
            return ChatInput::Invalid;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Chat body is not valid JSON");
            return ChatInput::Invalid;
        }
    };

    let message = match fields.remove("message") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            tracing::debug!(kind = json_kind(&other), "Chat message is not a string");
            return ChatInput::Invalid;
        }
    };

    ChatInput::classify(None, None, Some(ChatMessage { message }))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ChatInput, AppError> {
    let mut file: Option<IncomingFile> = None;
    let mut message: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") if file.is_none() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(IncomingFile { filename, data });
            }
            Some("message") if message.is_none() => {
                message = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    tracing::info!(
        has_file = file.is_some(),
        file_name = file.as_ref().map(|f| f.filename.as_str()).unwrap_or("-"),
        has_message = message.is_some(),
        "Multipart fields read"
    );

    Ok(ChatInput::classify(file, message, None))
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn multipart_error(err: MultipartError) -> AppError {
    rejection(err.status(), err.body_text())
}

/// Body-limit rejections keep their 413; any other unreadable body is a
/// malformed request.
fn rejection(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(detail)
    } else {
        tracing::debug!(status = %status, detail = %detail, "Unreadable chat body");
        AppError::BadRequest(INVALID_REQUEST_FORMAT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_json_content_types() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/vnd.api+json"));
        assert!(!is_json("text/plain"));
        assert!(!is_json(""));
    }

    #[test]
    fn only_json_objects_are_chat_bodies() {
        for body in [r#"["hi"]"#, r#""hi""#, "42", "null", "true"] {
            assert!(
                matches!(json_input(body.as_bytes()), ChatInput::Invalid),
                "{body} should be invalid"
            );
        }
    }

    #[test]
    fn json_message_field_is_classified() {
        assert!(matches!(
            json_input(br#"{"message": " hi "}"#),
            ChatInput::Message(m) if m == "hi"
        ));
        assert!(matches!(json_input(b"{}"), ChatInput::EmptyMessage));
        assert!(matches!(
            json_input(br#"{"message": null}"#),
            ChatInput::EmptyMessage
        ));
        assert!(matches!(
            json_input(br#"{"message": 5}"#),
            ChatInput::Invalid
        ));
        assert!(matches!(
            json_input(br#"{"message": ["hi"]}"#),
            ChatInput::Invalid
        ));
    }

    #[test]
    fn body_limit_rejection_keeps_413() {
        let err = rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = rejection(StatusCode::BAD_REQUEST, "bad boundary".into());
        assert_eq!(err.to_string(), INVALID_REQUEST_FORMAT);
    }
}
