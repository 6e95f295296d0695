//! Per-request dispatch: route policy → forward or block.

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode},
};
use futures_util::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::block::BlockHandler;
use crate::http::forward::ForwardHandler;
use crate::http::proxy::ProxyBuildError;
use crate::http::request::RequestContext;
use crate::routing::{Disposition, RoutePolicy};

/// Common interface of the forwarding and blocking handlers.
pub trait RequestHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: Request<Body>,
    ) -> BoxFuture<'a, Response<Body>>;
}

impl RequestHandler for ForwardHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: Request<Body>,
    ) -> BoxFuture<'a, Response<Body>> {
        self.forward(ctx, request).boxed()
    }
}

impl RequestHandler for BlockHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a RequestContext,
        _request: Request<Body>,
    ) -> BoxFuture<'a, Response<Body>> {
        let response = self.block(ctx);
        async move { response }.boxed()
    }
}

/// Receives every inbound request and hands it to the right handler.
pub struct Dispatcher {
    policy: RoutePolicy,
    forward: Arc<dyn RequestHandler>,
    block: Arc<dyn RequestHandler>,
}

impl Dispatcher {
    pub fn new(
        policy: RoutePolicy,
        forward: Arc<dyn RequestHandler>,
        block: Arc<dyn RequestHandler>,
    ) -> Self {
        Self {
            policy,
            forward,
            block,
        }
    }

    /// Wire the built-in whitelist to the configured backend.
    pub fn from_config(config: Arc<ProxyConfig>) -> Result<Self, ProxyBuildError> {
        let policy = RoutePolicy::new(config.write_enabled());
        let forward = Arc::new(ForwardHandler::new(config)?);
        Ok(Self::new(policy, forward, Arc::new(BlockHandler::default())))
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Route one request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let ctx = RequestContext::from_uri(request.uri());
        let span = ctx.span();

        async {
            let disposition = self.policy.resolve(&ctx.path);
            let handler = match disposition {
                Disposition::Forward => &self.forward,
                Disposition::Block => &self.block,
            };
            let response = handler.handle(&ctx, request).await;

            let status = response.status();
            if status == StatusCode::BAD_GATEWAY && disposition == Disposition::Forward {
                tracing::warn!(path = %ctx.path, "Backend unavailable");
            } else {
                tracing::debug!(
                    path = %ctx.path,
                    disposition = disposition.as_str(),
                    status = status.as_u16(),
                    "Request completed"
                );
            }
            response
        }
        .instrument(span)
        .await
    }
}

/// Axum fallback handler; every path lands here.
pub async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response<Body> {
    dispatcher.dispatch(request).await
}
