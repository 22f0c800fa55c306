//! Route declaration and dispatch.
//!
//! A [`Router`] compiles every declared route into a [`Trie`] once. Each
//! request walks the trie along its path to at most one leaf, then runs the
//! endpoints declared for that pattern as a co-product, in declaration order.
//!
//! ```
//! use micro_route::context::Context;
//! use micro_route::handler::{bind, handler_fn};
//! use micro_route::route::{Router, get};
//! use micro_route::{lens, uri};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: u64,
//! }
//!
//! let router = Router::builder()
//!     .route(uri!["echo"], get(handler_fn(|_: &mut Context| "echo")))
//!     .route(uri!["users", lens!(User, id)], get(bind(|user: User| async move { format!("id={}", user.id) })))
//!     .build()
//!     .unwrap();
//! ```

mod endpoint;
mod uri;

pub use endpoint::{Endpoint, EndpointBuilder, any, connect, delete, get, head, options, patch, post, put, trace};
pub use uri::{Segment, Uri};

use crate::RouteError;
use crate::context::Context;
use crate::matcher::{AnyOf, Halt, MatchResult, Matcher, MatcherExt};
use crate::response::{self, Response, status};
use crate::trie::Trie;
use async_trait::async_trait;
use tracing::{debug, error, trace};

/// Dispatches requests to the endpoints declared with [`RouterBuilder`].
#[derive(Debug)]
pub struct Router {
    trie: Trie<AnyOf>,
    body_limit: Option<usize>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The maximum body size transports should enforce, if any.
    pub fn body_limit(&self) -> Option<usize> {
        self.body_limit
    }

    /// Number of distinct route patterns.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Runs the router as the top level matcher and renders its outcome.
    ///
    /// A request no route recognizes answers `501 Not Implemented` with an
    /// issue; a route that matches without responding answers an empty
    /// `200 OK`.
    pub async fn serve(&self, ctx: &mut Context) -> Response {
        let response = match self.matches(ctx).await {
            Ok(()) => status::ok(),
            Err(Halt::Respond(response)) => *response,
            Err(Halt::NoMatch) => {
                let failure = format!("NoMatch {}", ctx.request().path());
                status::not_implemented().with(response::issue(failure))
            }
        };

        let request = ctx.request();
        match response.failure() {
            Some(failure) => error!(method = %request.method(), path = request.path(), status = response.status().as_u16(), failure, "request failed"),
            None => debug!(method = %request.method(), path = request.path(), status = response.status().as_u16(), "request served"),
        }
        response
    }
}

#[async_trait]
impl Matcher for Router {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        let base = ctx.values().len();
        let endpoints = {
            let (path, values) = ctx.path_and_values();
            self.trie.lookup(path, values)
        };

        let Some(endpoints) = endpoints else {
            trace!(path = ctx.request().path(), "no route pattern matches the path");
            return Err(Halt::NoMatch);
        };

        // the trie consumed the whole path
        let remaining = ctx.remaining_segments().len();
        ctx.advance(remaining);
        let outer = ctx.replace_capture_base(base);
        let result = endpoints.matches(ctx).await;
        ctx.replace_capture_base(outer);
        if result.as_ref().is_err_and(Halt::is_no_match) {
            ctx.restore(snapshot);
        }
        result
    }
}

/// Collects routes in declaration order and compiles them into a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: Vec<(Uri, EndpointBuilder)>,
    body_limit: Option<usize>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: vec![], body_limit: None }
    }

    #[must_use]
    pub fn route(mut self, uri: Uri, endpoint: EndpointBuilder) -> Self {
        self.routes.push((uri, endpoint));
        self
    }

    /// Limits the size of request bodies read by body matchers.
    #[must_use]
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Builds the router, rejecting invalid route patterns.
    pub fn build(self) -> Result<Router, RouteError> {
        let mut trie: Trie<AnyOf> = Trie::new();
        for (uri, endpoint) in self.routes {
            uri.validate()?;
            let endpoint = endpoint.build(uri.slots());
            trie.entry(uri.edges()).push(endpoint.boxed());
        }
        Ok(Router { trie, body_limit: self.body_limit })
    }
}
