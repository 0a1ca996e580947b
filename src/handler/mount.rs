//! Mount prefix matching
//!
//! A request matches when its path starts with the prefix, compared
//! case-insensitively, and the match ends on a segment boundary.

use crate::error::ServerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefix {
    /// Normalized: leading slash, no trailing slash; empty for the root mount
    prefix: String,
}

impl MountPrefix {
    pub fn new(path: &str) -> Result<Self, ServerError> {
        if !path.starts_with('/') {
            return Err(ServerError::MountPath {
                path: path.to_string(),
                reason: "must start with '/'",
            });
        }
        if path.contains(['?', '#']) {
            return Err(ServerError::MountPath {
                path: path.to_string(),
                reason: "must not contain a query or fragment",
            });
        }

        Ok(Self {
            prefix: path.trim_end_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    /// Check if a request path falls under this mount
    pub fn matches(&self, path: &str) -> bool {
        let Some(head) = path.get(..self.prefix.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return false;
        }

        // The next byte must start a new segment
        matches!(path.as_bytes().get(self.prefix.len()), None | Some(b'/'))
    }
}
