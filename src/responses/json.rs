//! The JSON envelope every API route answers with:
//! `{ "success": bool, "data"?, "message"?, "error"? }`.

use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;
use serde_json::json;

use crate::errors::ResultResp;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn build(status: u16, envelope: &impl Serialize) -> Response {
    let body = serde_json::to_string(envelope)
        .unwrap_or_else(|_| r#"{"success":false,"error":"internal server error"}"#.to_string());

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}

pub fn json_ok<T: Serialize>(data: T) -> ResultResp {
    Ok(build(
        200,
        &Envelope {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        },
    ))
}

pub fn json_created<T: Serialize>(data: T, message: &str) -> ResultResp {
    Ok(build(
        201,
        &Envelope {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
            error: None,
        },
    ))
}

/// 200 with a message and no data payload.
pub fn json_message(message: &str) -> ResultResp {
    Ok(build(
        200,
        &Envelope::<()> {
            success: true,
            data: None,
            message: Some(message.to_string()),
            error: None,
        },
    ))
}

pub fn json_error(status: u16, error: &str) -> Response {
    build(status, &json!({ "success": false, "error": error }))
}
