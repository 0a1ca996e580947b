//! JSON body-parsing middleware
//!
//! Reads and parses request bodies declared as JSON. Other content types pass
//! through unread.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::request::Parts;
use hyper::{Request, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("request entity too large (limit {limit} bytes)")]
    TooLarge { limit: u64 },

    #[error("unsupported charset \"{charset}\"")]
    UnsupportedCharset { charset: String },

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON body must be an object or array")]
    NotObjectOrArray,

    #[error("failed to read request body: {message}")]
    Read { message: String },
}

impl BodyError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedCharset { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidJson(_) | Self::NotObjectOrArray | Self::Read { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Media type without parameters, lowercased
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next()?.trim();
    Some(essence.to_ascii_lowercase())
}

/// `application/json` and any `+json` suffix type
pub fn is_json_request(headers: &HeaderMap) -> bool {
    media_type(headers).is_some_and(|media| {
        media == "application/json" || (media.contains('/') && media.ends_with("+json"))
    })
}

fn charset(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    value.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.parse().ok()
}

/// Parse a collected body in strict mode
///
/// Empty (or whitespace-only) bodies yield `None`.
pub fn parse_strict(bytes: &[u8]) -> Result<Option<serde_json::Value>, BodyError> {
    let Some(first) = bytes.iter().find(|b| !b.is_ascii_whitespace()) else {
        return Ok(None);
    };
    if *first != b'{' && *first != b'[' {
        return Err(BodyError::NotObjectOrArray);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}

/// Run the body stage
///
/// Returns the request head together with the parsed value. The body is only
/// consumed for JSON requests.
pub async fn read_json_body<B>(
    req: Request<B>,
    limit: u64,
) -> Result<(Parts, Option<serde_json::Value>), BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    if !is_json_request(&parts.headers) {
        return Ok((parts, None));
    }

    if let Some(charset) = charset(&parts.headers) {
        if charset != "utf-8" && charset != "utf8" {
            return Err(BodyError::UnsupportedCharset { charset });
        }
    }

    if declared_length(&parts.headers).is_some_and(|len| len > limit) {
        return Err(BodyError::TooLarge { limit });
    }

    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    let collected = Limited::new(body, max).collect().await.map_err(|err| {
        if err.downcast_ref::<LengthLimitError>().is_some() {
            BodyError::TooLarge { limit }
        } else {
            BodyError::Read {
                message: err.to_string(),
            }
        }
    })?;

    let value = parse_strict(&collected.to_bytes())?;
    Ok((parts, value))
}
