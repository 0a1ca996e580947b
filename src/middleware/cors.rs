//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! Handles preflight requests and adds CORS headers. Exactly one origin is
//! allowed; requests from other origins are still served, and it is left to
//! the browser to withhold the response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, CONTENT_LENGTH, VARY,
};
use hyper::{Method, Response, StatusCode};

use crate::config::CorsConfig;
use crate::error::ServerError;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Fixed-origin CORS policy
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
    allow_credentials: bool,
    max_age: Option<u64>,
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Result<Self, ServerError> {
        let origin =
            HeaderValue::from_str(&config.allowed_origin).map_err(|_| ServerError::CorsOrigin {
                origin: config.allowed_origin.clone(),
            })?;

        Ok(Self {
            origin,
            allow_credentials: config.allow_credentials,
            max_age: config.max_age,
        })
    }

    /// Every OPTIONS request is answered as a preflight and never routed
    pub fn is_preflight(method: &Method) -> bool {
        *method == Method::OPTIONS
    }

    /// Build the 204 preflight response
    pub fn preflight_response(&self, request_headers: &HeaderMap) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        self.insert_origin_headers(headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );

        // Reflect whatever the browser asked for
        if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
        }

        if let Some(max_age) = self.max_age {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
        }

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        response
    }

    /// Add CORS headers to a non-preflight response
    pub fn apply<B>(&self, response: &mut Response<B>) {
        self.insert_origin_headers(response.headers_mut());
    }

    fn insert_origin_headers(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        headers.append(VARY, HeaderValue::from_static("Origin"));
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }
}
