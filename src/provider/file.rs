use std::fs;
use std::path::{Path, PathBuf};

use hyper::body::Bytes;

use super::{Payload, ProviderError, StuffProvider};

/// Provider that re-reads a file on every call
///
/// `.json` files are parsed and sent as JSON. Other files are sent as text
/// when they are valid UTF-8 and as raw bytes otherwise.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl StuffProvider for FileProvider {
    fn fetch(&self) -> Result<Payload, ProviderError> {
        let display = self.path.display().to_string();
        let content = fs::read(&self.path).map_err(|source| ProviderError::Read {
            path: display.clone(),
            source,
        })?;

        if self.is_json() {
            let value = serde_json::from_slice(&content).map_err(|source| ProviderError::Parse {
                path: display,
                source,
            })?;
            return Ok(Payload::Json(value));
        }

        match String::from_utf8(content) {
            Ok(text) => Ok(Payload::Text(text)),
            Err(e) => Ok(Payload::Bytes(Bytes::from(e.into_bytes()))),
        }
    }
}
