//! Header hygiene and error responses.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Map backend transport errors to 502 Bad Gateway
//!
//! # Design Decisions
//! - Headers named by `Connection` are hop-by-hop too (RFC 9110 §7.6.1)
//! - Error bodies are short plain text; the client only looks at the status

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Response, StatusCode},
};

/// Headers that apply to a single connection and must not be relayed.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including those listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Response sent when the backend cannot be reached.
pub fn bad_gateway() -> Response<Body> {
    let mut response = Response::new(Body::from("Bad Gateway"));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
