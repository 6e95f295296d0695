//! Single-host forwarding primitive.
//!
//! # Responsibilities
//! - Point the request URI at the backend (scheme, authority, base path)
//! - Append the client address to `X-Forwarded-For`
//! - Send the request and relay the response body as it streams in
//! - Run the optional post-receive hook before the response leaves
//!
//! # Design Decisions
//! - One pooled client per proxy, shared by all requests
//! - Response bodies are never buffered here; frames are passed through
//! - Transport failures become 502 Bad Gateway, never retried

use axum::{
    body::Body,
    http::{
        header::HeaderValue,
        uri::{PathAndQuery, Uri},
        Request, Response, Version,
    },
};
use futures_util::future::BoxFuture;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::http::response::{bad_gateway, remove_hop_by_hop};

/// Pooled client able to reach http and https backends.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Hook run on every backend response before it is relayed.
pub trait ResponseHook: Send + Sync + std::fmt::Debug {
    fn on_response(&self, response: Response<Body>) -> BoxFuture<'static, Response<Body>>;
}

/// Errors building the forwarding primitive.
#[derive(Debug, Error)]
pub enum ProxyBuildError {
    #[error("target '{0}' is not a valid URI")]
    InvalidTarget(String),

    #[error("failed to set up TLS: {0}")]
    Tls(#[from] rustls::Error),
}

/// Forwards requests to exactly one backend.
#[derive(Debug, Clone)]
pub struct SingleHostProxy {
    target: Uri,
    client: HttpClient,
    modify_response: Option<Arc<dyn ResponseHook>>,
}

impl SingleHostProxy {
    /// Create a proxy for the backend at `target`.
    pub fn new(target: &str) -> Result<Self, ProxyBuildError> {
        let target: Uri = target
            .parse()
            .map_err(|_| ProxyBuildError::InvalidTarget(target.to_string()))?;
        if target.scheme().is_none() || target.authority().is_none() {
            return Err(ProxyBuildError::InvalidTarget(target.to_string()));
        }

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_nodelay(true);

        let https_connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            target,
            client,
            modify_response: None,
        })
    }

    /// Install a post-receive hook.
    pub fn with_response_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.modify_response = Some(hook);
        self
    }

    pub fn has_response_hook(&self) -> bool {
        self.modify_response.is_some()
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// Backend authority, used as the outbound `Host`.
    pub fn target_host(&self) -> Option<HeaderValue> {
        self.target
            .authority()
            .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
    }

    /// Relay `request` to the backend and return what the client should see.
    pub async fn serve(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Response<Body> {
        let (mut parts, body) = request.into_parts();

        parts.uri = match self.rewrite_uri(&parts.uri) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(error = %e, uri = %parts.uri, "Failed to build backend URI");
                return bad_gateway();
            }
        };
        parts.version = Version::HTTP_11;
        if let Some(addr) = client_addr {
            append_forwarded_for(&mut parts.headers, addr);
        }

        let outbound = Request::from_parts(parts, body);
        let response = match self.client.request(outbound).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, target = %self.target, "Backend request failed");
                return bad_gateway();
            }
        };

        let (mut parts, body) = response.into_parts();
        remove_hop_by_hop(&mut parts.headers);
        let response = Response::from_parts(parts, Body::new(body));

        match &self.modify_response {
            Some(hook) => hook.on_response(response).await,
            None => response,
        }
    }

    /// Map an inbound URI onto the backend.
    pub fn rewrite_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(self.target.path(), inbound.path());
        let query = match (self.target.query(), inbound.query()) {
            (Some(t), Some(i)) if !t.is_empty() && !i.is_empty() => Some(format!("{}&{}", t, i)),
            (Some(t), _) if !t.is_empty() => Some(t.to_string()),
            (_, Some(i)) => Some(i.to_string()),
            _ => None,
        };
        let path_and_query = match query {
            Some(q) => format!("{}?{}", path, q),
            None => path,
        };

        let mut builder = Uri::builder().path_and_query(PathAndQuery::try_from(path_and_query)?);
        if let Some(scheme) = self.target.scheme() {
            builder = builder.scheme(scheme.clone());
        }
        if let Some(authority) = self.target.authority() {
            builder = builder.authority(authority.clone());
        }
        builder.build()
    }
}

/// Join the backend base path and the request path with exactly one slash.
pub fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn append_forwarded_for(headers: &mut axum::http::HeaderMap, addr: SocketAddr) {
    let ip = addr.ip().to_string();
    let value = match headers.get(X_FORWARDED_FOR) {
        Some(prior) => match prior.to_str() {
            Ok(prior) => format!("{}, {}", prior, ip),
            Err(_) => ip,
        },
        None => ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

const X_FORWARDED_FOR: &str = "x-forwarded-for";
