//! The boundary between a wire format and the router.
//!
//! A [`Transport`] converts its own request type into a [`Request`] and
//! renders a [`Response`] back. [`serve`] glues one request through a router;
//! [`Service`] does the same with pooled contexts.

pub mod gateway;
pub mod native;

use crate::TransportError;
use crate::context::{Context, ContextPool};
use crate::request::Request;
use crate::response::{self, Response, status};
use crate::route::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub trait Transport: Send + Sync {
    type Request: Send;
    type Response;

    /// Converts the wire request; the body stays unread.
    fn request(&self, request: Self::Request) -> Result<Request, TransportError>;

    /// Renders `response` for `request`.
    fn render(&self, request: &Request, response: Response) -> Self::Response;
}

/// Answers a wire request the transport cannot convert.
fn rejected<T: Transport>(transport: &T, e: &TransportError) -> T::Response {
    warn!(cause = %e, "failed to convert request");
    transport.render(&Request::default(), status::bad_request().with(response::issue_details(e)))
}

/// Serves one request: converts it, dispatches it through `router` and renders the outcome.
///
/// A cancelled `cancellation` token aborts a pending body read with `503 Service Unavailable`.
pub async fn serve<T: Transport>(transport: &T, router: &Router, request: T::Request, cancellation: Option<CancellationToken>) -> T::Response {
    let request = match transport.request(request) {
        Ok(request) => request,
        Err(e) => return rejected(transport, &e),
    };

    let mut ctx = Context::new(request);
    if let Some(limit) = router.body_limit() {
        ctx = ctx.with_body_limit(limit);
    }
    ctx.set_cancellation(cancellation);

    let response = router.serve(&mut ctx).await;
    transport.render(ctx.request(), response)
}

/// A router bound to a transport, reusing contexts between requests.
#[derive(Debug)]
pub struct Service<T> {
    transport: T,
    router: Arc<Router>,
    pool: ContextPool,
}

impl<T: Transport> Service<T> {
    pub fn new(transport: T, router: Arc<Router>) -> Self {
        Self::with_capacity(transport, router, 64)
    }

    /// Keeps at most `capacity` idle contexts.
    pub fn with_capacity(transport: T, router: Arc<Router>, capacity: usize) -> Self {
        let pool = ContextPool::new(capacity).with_body_limit(router.body_limit());
        Self { transport, router, pool }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn serve(&self, request: T::Request, cancellation: Option<CancellationToken>) -> T::Response {
        let request = match self.transport.request(request) {
            Ok(request) => request,
            Err(e) => return rejected(&self.transport, &e),
        };

        let mut ctx = self.pool.acquire(request);
        ctx.set_cancellation(cancellation);

        let response = self.router.serve(&mut ctx).await;
        let rendered = self.transport.render(ctx.request(), response);
        self.pool.release(ctx);
        rendered
    }
}
