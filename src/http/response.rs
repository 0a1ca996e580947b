//! HTTP response building module
//!
//! Builders for the handful of responses the server can produce.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::{Method, Response, StatusCode};

use crate::logger;
use crate::provider::Payload;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Build 200 response carrying a provider payload
///
/// HEAD requests keep `Content-Length` but get an empty body.
pub fn build_payload_response(
    body: Bytes,
    content_type: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }

    builder
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Encode a payload and build its 200 response, or a 500 if encoding fails
pub fn build_stuff_response(payload: Payload, is_head: bool) -> Response<Full<Bytes>> {
    let content_type = payload.content_type();
    match payload.into_body() {
        Ok(body) => build_payload_response(body, content_type, is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to encode payload: {e}"));
            build_error_response(StatusCode::INTERNAL_SERVER_ERROR, is_head)
        }
    }
}

/// Build 404 Not Found response naming the unmatched request
pub fn build_404_response(method: &Method, path: &str, is_head: bool) -> Response<Full<Bytes>> {
    let message = format!("Cannot {method} {path}");
    build_html_error(StatusCode::NOT_FOUND, &message, is_head)
}

/// Build an error page for the given status
pub fn build_error_response(status: StatusCode, is_head: bool) -> Response<Full<Bytes>> {
    let message = status.canonical_reason().unwrap_or("Error");
    build_html_error(status, message, is_head)
}

fn build_html_error(status: StatusCode, message: &str, is_head: bool) -> Response<Full<Bytes>> {
    let page = error_page(message);
    let content_length = page.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(page)
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Error</title>\n</head>\n<body>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(message)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
