//! Per-request context.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) for log correlation
//! - Extract the OLAP session id (`sid` query parameter)
//! - Decode the request path the way the whitelist sees it
//!
//! # Design Decisions
//! - The ID lives only in logs; it is never added to forwarded headers
//! - Context is owned by the handling task and dropped with the response

use axum::http::Uri;
use tracing::Span;
use uuid::Uuid;

/// Correlation data for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub session_id: String,
    pub path: String,
}

impl RequestContext {
    /// Build the context for an incoming request URI.
    pub fn from_uri(uri: &Uri) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            session_id: session_id(uri),
            path: decode_path(uri.path()),
        }
    }

    /// Span carrying the correlation fields for every event of this request.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            session = %self.session_id,
        )
    }
}

/// Value of the `sid` query parameter, empty when absent.
pub fn session_id(uri: &Uri) -> String {
    uri.query()
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, _)| k == "sid")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_default()
}

/// Percent-decode a URL path.
///
/// Invalid escapes are kept verbatim; invalid UTF-8 is replaced.
pub fn decode_path(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
