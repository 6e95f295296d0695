//! Request and response body auditing.
//!
//! Both observers read a body to completion, log it, and hand back a body
//! over the same bytes so the wire payload is unchanged. A request body that
//! fails to read is forwarded empty; a backend body that fails to read turns
//! into 502 so a truncated answer never looks complete.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request, Response},
};
use futures_util::future::{BoxFuture, FutureExt};
use http_body_util::BodyExt;
use std::fmt::Write;

use crate::http::proxy::ResponseHook;
use crate::http::response::bad_gateway;

/// Logs client requests before they are forwarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestObserver;

impl RequestObserver {
    /// Log `request` and return an equivalent request.
    ///
    /// GET requests are logged by URL only and pass through untouched.
    pub async fn observe(&self, request: Request<Body>) -> Request<Body> {
        if request.method() == Method::GET {
            tracing::info!(kind = "request", url = %request.uri(), "Client request");
            return request;
        }

        let (mut parts, body) = request.into_parts();
        let bytes = match read_body(body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body for logging");
                parts.headers.remove(header::CONTENT_LENGTH);
                return Request::from_parts(parts, Body::empty());
            }
        };

        let dump = dump_message(
            &format!("{} {} {:?}", parts.method, parts.uri, parts.version),
            &parts.headers,
            &bytes,
        );
        tracing::info!(kind = "request", dump = %dump, "Client request");

        Request::from_parts(parts, Body::from(bytes))
    }
}

/// Logs backend responses; installed as the forwarder's post-receive hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseObserver;

impl ResponseObserver {
    /// Log `response` and return it with a fresh body and matching `Content-Length`.
    pub async fn observe(&self, response: Response<Body>) -> Response<Body> {
        let (mut parts, body) = response.into_parts();
        let bytes = match read_body(body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = parts.status.as_u16(),
                    "Failed to read backend response for logging"
                );
                return bad_gateway();
            }
        };

        let dump = dump_message(
            &format!("{:?} {}", parts.version, parts.status),
            &parts.headers,
            &bytes,
        );
        tracing::info!(kind = "response", dump = %dump, "Backend response");

        parts.headers.remove(header::TRANSFER_ENCODING);
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        Response::from_parts(parts, Body::from(bytes))
    }
}

impl ResponseHook for ResponseObserver {
    fn on_response(&self, response: Response<Body>) -> BoxFuture<'static, Response<Body>> {
        let observer = *self;
        async move { observer.observe(response).await }.boxed()
    }
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    Ok(body.collect().await?.to_bytes())
}

/// Render a message roughly as it looks on the wire.
fn dump_message(start_line: &str, headers: &HeaderMap, body: &Bytes) -> String {
    let mut out = String::with_capacity(start_line.len() + body.len() + 64);
    out.push_str(start_line);
    out.push_str("\r\n");
    for (name, value) in headers {
        let _ = write!(out, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out
}
