//! Forwarding of whitelisted requests.
//!
//! # Responsibilities
//! - Rewrite the headers the OLAP server expects
//! - Attach the body observers when auditing is on
//! - Delegate transport to [`SingleHostProxy`]
//!
//! # Design Decisions
//! - Inbound hop-by-hop headers are dropped before our own are set, so the
//!   outbound `Connection: keep-alive` is ours, not the client's
//! - Compression is requested only while responses are not being logged

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderName, HeaderValue, Request, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::http::proxy::{ProxyBuildError, SingleHostProxy};
use crate::http::request::RequestContext;
use crate::http::response::remove_hop_by_hop;
use crate::observability::{RequestObserver, ResponseObserver};

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");

/// Forwards a request to the OLAP backend.
#[derive(Debug)]
pub struct ForwardHandler {
    config: Arc<ProxyConfig>,
    proxy: SingleHostProxy,
    request_observer: Option<RequestObserver>,
}

impl ForwardHandler {
    /// Build the handler for the configured backend.
    pub fn new(config: Arc<ProxyConfig>) -> Result<Self, ProxyBuildError> {
        let mut proxy = SingleHostProxy::new(&config.upstream.target_url)?;
        if config.log_response() {
            proxy = proxy.with_response_hook(Arc::new(ResponseObserver));
        }
        let request_observer = config.log_request().then_some(RequestObserver);
        tracing::debug!(
            target_uri = %proxy.target(),
            request_observer = request_observer.is_some(),
            response_observer = proxy.has_response_hook(),
            "Forwarding handler ready"
        );

        Ok(Self {
            config,
            proxy,
            request_observer,
        })
    }

    /// Forward `request`; returns once the backend response is relayed.
    pub async fn forward(&self, ctx: &RequestContext, request: Request<Body>) -> Response<Body> {
        tracing::info!(kind = "forward", path = %ctx.path, "Forwarded request");

        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut request = self.rewrite_request(request);
        if let Some(observer) = &self.request_observer {
            request = observer.observe(request).await;
        }

        let mut response = self.proxy.serve(request, client_addr).await;
        set_keep_alive(response.headers_mut());
        response
    }

    /// Apply the outbound header rewrite.
    pub fn rewrite_request(&self, request: Request<Body>) -> Request<Body> {
        let (mut parts, body) = request.into_parts();
        let original_host = parts
            .headers
            .get(header::HOST)
            .cloned()
            .or_else(|| {
                parts
                    .uri
                    .authority()
                    .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
            });

        remove_hop_by_hop(&mut parts.headers);

        let headers = &mut parts.headers;
        headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        if self.config.log_response() {
            headers.remove(header::ACCEPT_ENCODING);
        } else {
            headers.insert(
                header::ACCEPT_ENCODING,
                HeaderValue::from_static("gzip, deflate"),
            );
        }
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
        if let Some(target_host) = self.proxy.target_host() {
            headers.insert(header::HOST, target_host);
        }

        Request::from_parts(parts, body)
    }
}

/// Response headers added to every forwarded response.
pub fn set_keep_alive(headers: &mut axum::http::HeaderMap) {
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(KEEP_ALIVE, HeaderValue::from_static("timeout=5, max=100"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(log_response: bool) -> ForwardHandler {
        let mut config = ProxyConfig::default();
        config.upstream.target_url = "http://olap:7777".into();
        config.logging.log_response = log_response;
        ForwardHandler::new(Arc::new(config)).unwrap()
    }

    fn inbound() -> Request<Body> {
        Request::post("/cell/value?sid=1")
            .header(header::HOST, "proxy.example:8080")
            .header(header::ACCEPT_ENCODING, "br")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONNECTION, "close, x-hop")
            .header("x-hop", "1")
            .header("x-end-to-end", "1")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn rewrites_headers() {
        let out = handler(false).rewrite_request(inbound());
        let h = out.headers();
        assert_eq!(h[header::ACCEPT_CHARSET], "utf-8");
        assert_eq!(h[header::CONTENT_TYPE], "text/plain");
        assert_eq!(h[header::CONNECTION], "keep-alive");
        assert_eq!(h[header::ACCEPT_ENCODING], "gzip, deflate");
        assert_eq!(h[X_FORWARDED_HOST], "proxy.example:8080");
        assert_eq!(h[header::HOST], "olap:7777");
        assert_eq!(h["x-end-to-end"], "1");
        assert!(!h.contains_key("x-hop"));
    }

    #[test]
    fn response_logging_disables_compression() {
        let out = handler(true).rewrite_request(inbound());
        assert!(!out.headers().contains_key(header::ACCEPT_ENCODING));
    }

    #[test]
    fn observers_follow_config() {
        assert!(!handler(false).proxy.has_response_hook());
        assert!(handler(true).proxy.has_response_hook());

        let mut config = ProxyConfig::default();
        config.logging.log_request = true;
        let h = ForwardHandler::new(Arc::new(config)).unwrap();
        assert!(h.request_observer.is_some());
        assert!(!h.proxy.has_response_hook());
    }

    #[test]
    fn keep_alive_response_headers() {
        let mut headers = axum::http::HeaderMap::new();
        set_keep_alive(&mut headers);
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[KEEP_ALIVE], "timeout=5, max=100");
    }
}
