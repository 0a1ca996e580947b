//! Request dispatch module
//!
//! Entry point for HTTP request processing: body parsing, CORS, mount
//! matching and the provider call, in that order.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use crate::middleware::{read_json_body, CorsPolicy};

/// Request context encapsulating information needed for request processing
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub is_head: bool,
    /// Output of the JSON stage; the mounted handler does not consult it
    pub body: Option<serde_json::Value>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, remote_addr));

    let is_head = *req.method() == Method::HEAD;

    // Body-stage failures are answered before CORS and carry no CORS headers
    let mut response = match read_json_body(req, state.config.http.max_body_size).await {
        Ok((parts, body)) => {
            if CorsPolicy::is_preflight(&parts.method) {
                state.cors.preflight_response(&parts.headers)
            } else {
                let mut response = dispatch(parts, body, is_head, &state).await;
                state.cors.apply(&mut response);
                response
            }
        }
        Err(e) => {
            logger::log_warning(&format!("Rejected request body: {e}"));
            http::build_error_response(e.status(), is_head)
        }
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        let format = AccessLogFormat::parse(&state.config.logging.access_log_format);
        logger::log_access(entry, &format);
    }

    Ok(response)
}

/// Route a request whose body stage has completed
async fn dispatch(
    parts: Parts,
    body: Option<serde_json::Value>,
    is_head: bool,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    if let Some(value) = body.as_ref() {
        logger::log_parsed_body(value);
    }

    let ctx = RequestContext {
        method: parts.method,
        path: parts.uri.path().to_string(),
        is_head,
        body,
    };

    if state.mount.matches(&ctx.path) {
        serve_stuff(&ctx, state).await
    } else {
        http::build_404_response(&ctx.method, &ctx.path, ctx.is_head)
    }
}

/// Call the provider and turn its result into a response
async fn serve_stuff(ctx: &RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let provider = Arc::clone(&state.provider);

    match tokio::task::spawn_blocking(move || provider.fetch()).await {
        Ok(Ok(payload)) => http::build_stuff_response(payload, ctx.is_head),
        Ok(Err(e)) => {
            logger::log_error(&format!("Provider failed for {} {}: {e}", ctx.method, ctx.path));
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, ctx.is_head)
        }
        Err(e) => {
            logger::log_error(&format!("Provider task aborted: {e}"));
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, ctx.is_head)
        }
    }
}
