//! HTML bodies for error responses.
//!
//! A configured template is re-read for every error so edits show up
//! without a restart. If it is missing or unreadable the inline fallback
//! is used instead.

use std::path::Path;

use crate::http::response::{Response, StatusCode};

/// Replaced with the numeric status code, e.g. `404`.
pub const STATUS_CODE_TOKEN: &str = "{{status_code}}";
/// Replaced with the reason phrase, e.g. `Not Found`.
pub const STATUS_TEXT_TOKEN: &str = "{{status_text}}";

/// Renders the error body for `status`, using `template` when it can be read.
pub async fn render(status: StatusCode, template: Option<&Path>) -> String {
    if let Some(path) = template {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => return fill_template(&raw, status),
            Err(e) => {
                tracing::warn!(
                    "Error page template {} unavailable, using fallback: {}",
                    path.display(),
                    e
                );
            }
        }
    }
    fallback(status)
}

/// Builds a full 4xx response with a rendered body.
pub async fn error_response(status: StatusCode, template: Option<&Path>) -> Response {
    Response::html(status, render(status, template).await)
}

pub fn fill_template(raw: &str, status: StatusCode) -> String {
    raw.replace(STATUS_CODE_TOKEN, &status.as_u16().to_string())
        .replace(STATUS_TEXT_TOKEN, status.reason_phrase())
}

pub fn fallback(status: StatusCode) -> String {
    let code = status.as_u16();
    let text = status.reason_phrase();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{code} {text}</title></head>\n\
         <body><h1>{code} {text}</h1></body>\n</html>\n"
    )
}
