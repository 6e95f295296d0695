//! Rejection of non-whitelisted paths.
//!
//! The body format is read by the OLAP web client and must stay byte-exact:
//! `1009;"not authorized for operation";"<escaped path> (blocked by xdjprox)";`

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};

use crate::http::request::RequestContext;

/// Name reported in rejection messages.
pub const PROXY_NAME: &str = "xdjprox";

/// OLAP error code for "not authorized for operation".
pub const NOT_AUTHORIZED_CODE: u32 = 1009;

/// Produces the fixed 400 rejection.
#[derive(Debug, Clone)]
pub struct BlockHandler {
    proxy_name: String,
}

impl BlockHandler {
    pub fn new(proxy_name: impl Into<String>) -> Self {
        Self {
            proxy_name: proxy_name.into(),
        }
    }

    /// Reject the request described by `ctx`.
    pub fn block(&self, ctx: &RequestContext) -> Response<Body> {
        tracing::info!(kind = "block", path = %ctx.path, "Blocked request");

        let mut response = Response::new(Body::from(self.message(&ctx.path)));
        *response.status_mut() = StatusCode::BAD_REQUEST;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    /// Rejection body for `path`.
    pub fn message(&self, path: &str) -> String {
        format!(
            "{};\"not authorized for operation\";\"{} (blocked by {})\";",
            NOT_AUTHORIZED_CODE,
            escape_html(path),
            self.proxy_name
        )
    }
}

impl Default for BlockHandler {
    fn default() -> Self {
        Self::new(PROXY_NAME)
    }
}

/// Escape `<`, `>`, `&`, `'` and `"` as numeric or named entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            c => out.push(c),
        }
    }
    out
}
