//! Data provider module
//!
//! The mounted route delegates to a [`StuffProvider`]: a zero-argument,
//! synchronous, fallible call whose result becomes the response body.

mod file;

use std::sync::Arc;

use hyper::body::Bytes;
use thiserror::Error;

use crate::config::StuffSource;

pub use file::FileProvider;

/// Value returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Serialized as `application/json`; `null` becomes an empty, untyped body
    Json(serde_json::Value),
    /// Sent as-is with an HTML content type
    Text(String),
    /// Sent as-is as an octet stream
    Bytes(Bytes),
}

impl Payload {
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(serde_json::Value::Null) => None,
            Self::Json(_) => Some("application/json; charset=utf-8"),
            Self::Text(_) => Some("text/html; charset=utf-8"),
            Self::Bytes(_) => Some("application/octet-stream"),
        }
    }

    /// Encode the payload as a response body
    pub fn into_body(self) -> Result<Bytes, serde_json::Error> {
        match self {
            Self::Json(serde_json::Value::Null) => Ok(Bytes::new()),
            Self::Json(value) => serde_json::to_vec(&value).map(Bytes::from),
            Self::Text(text) => Ok(Bytes::from(text)),
            Self::Bytes(bytes) => Ok(bytes),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// External data-retrieval collaborator
///
/// Called once per request on a blocking thread, so implementations are
/// free to do synchronous I/O.
pub trait StuffProvider: Send + Sync {
    fn fetch(&self) -> Result<Payload, ProviderError>;
}

/// Provider returning the same JSON value on every call
#[derive(Debug, Clone)]
pub struct InlineProvider {
    value: serde_json::Value,
}

impl InlineProvider {
    pub const fn new(value: serde_json::Value) -> Self {
        Self { value }
    }
}

impl StuffProvider for InlineProvider {
    fn fetch(&self) -> Result<Payload, ProviderError> {
        Ok(Payload::Json(self.value.clone()))
    }
}

/// Build the provider described by configuration
pub fn from_source(source: &StuffSource) -> Arc<dyn StuffProvider> {
    match source {
        StuffSource::Inline { value } => Arc::new(InlineProvider::new(value.clone())),
        StuffSource::File { path } => Arc::new(FileProvider::new(path)),
    }
}
