//! Cursor codec.
//!
//! Owns the opaque continuation-token format: a compact JSON payload
//! `{"v": <sort value>, "id": "<row id>", "s": "<scope>"}` wrapped in
//! URL-safe base64 without padding. Query semantics live elsewhere.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Upper bound on accepted token length. Tokens are client-supplied.
const MAX_CURSOR_TOKEN_LEN: usize = 1024;

/// Sort value carried by a cursor.
///
/// Timestamps travel as RFC 3339 text; the sort field decides how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorValue {
    Number(f64),
    Text(String),
}

impl CursorValue {
    /// Numeric reading: numbers as-is, numeric strings parsed. Must be finite.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            CursorValue::Number(n) => *n,
            CursorValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Lexical reading.
    pub fn to_text(&self) -> String {
        match self {
            CursorValue::Number(n) => n.to_string(),
            CursorValue::Text(s) => s.clone(),
        }
    }
}

/// Decoded pagination position: the last row of the previous page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "v")]
    pub value: CursorValue,

    pub id: String,

    /// Fingerprint of the query that produced the cursor.
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Cursor {
    pub fn new(value: CursorValue, id: impl Into<String>) -> Self {
        Self {
            value,
            id: id.into(),
            scope: None,
        }
    }

    /// Bind the cursor to a query scope.
    pub fn scoped(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Whether this cursor may resume a query with the given scope.
    ///
    /// Unscoped cursors are accepted everywhere.
    pub fn fits_scope(&self, scope: &str) -> bool {
        self.scope.as_deref().is_none_or(|s| s == scope)
    }
}

/// Encode a cursor as a URL-safe token.
pub fn encode_cursor(cursor: &Cursor) -> String {
    // Serializing a struct of strings and finite floats cannot fail; a
    // non-finite float would serialize as null and decode to None.
    let json = serde_json::to_vec(cursor).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a token produced by [`encode_cursor`].
///
/// Returns `None` for absent, empty, oversized, or malformed tokens. A broken
/// cursor degrades to "first page" and is never an error.
pub fn decode_cursor(token: Option<&str>) -> Option<Cursor> {
    let token = token?.trim();
    if token.is_empty() || token.len() > MAX_CURSOR_TOKEN_LEN {
        return None;
    }

    let bytes = match URL_SAFE_NO_PAD.decode(token.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "discarding cursor: not base64");
            return None;
        }
    };

    match serde_json::from_slice::<Cursor>(&bytes) {
        Ok(cursor) => Some(cursor),
        Err(e) => {
            tracing::debug!(error = %e, "discarding cursor: bad payload");
            None
        }
    }
}

/// Short stable fingerprint of a canonical query rendering.
pub fn scope_fingerprint(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..8])
}
