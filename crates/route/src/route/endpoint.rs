use crate::context::Context;
use crate::handler::Handler;
use crate::lens::Optic;
use crate::matcher::{self, AllOf, Halt, MatchResult, Matcher, MethodMatcher};
use async_trait::async_trait;
use std::fmt;

/// A leaf of the route trie: method, captures, tail matchers and the handler.
///
/// The trie captures are bound to the lenses of the route pattern by
/// position. When the method, every capture and every tail matcher accept the
/// request, the handler runs and its response ends the dispatch.
pub struct Endpoint {
    method: MethodMatcher,
    slots: Vec<Option<Optic>>,
    tail: AllOf,
    handler: Box<dyn Handler>,
}

impl Endpoint {
    async fn recognize(&self, ctx: &mut Context) -> MatchResult {
        self.method.matches(ctx).await?;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(optic) = slot {
                ctx.put_capture(index, optic)?;
            }
        }
        self.tail.matches(ctx).await
    }
}

#[async_trait]
impl Matcher for Endpoint {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        if let Err(halt) = self.recognize(ctx).await {
            if halt.is_no_match() {
                ctx.restore(snapshot);
            }
            return Err(halt);
        }

        let response = self.handler.invoke(ctx).await;
        Err(Halt::respond(response))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("method", &self.method.method()).field("slots", &self.slots).field("tail", &self.tail).finish()
    }
}

/// An endpoint waiting for its route pattern.
pub struct EndpointBuilder {
    method: MethodMatcher,
    tail: AllOf,
    handler: Box<dyn Handler>,
}

impl EndpointBuilder {
    fn new<H: Handler + 'static>(method: MethodMatcher, handler: H) -> Self {
        Self { method, tail: matcher::all_of(), handler: Box::new(handler) }
    }

    /// Adds a matcher the request must pass after method and path.
    #[must_use]
    pub fn with<M: Matcher + 'static>(mut self, matcher: M) -> Self {
        self.tail.and(matcher);
        self
    }

    pub(crate) fn build(self, slots: Vec<Option<Optic>>) -> Endpoint {
        Endpoint { method: self.method, slots, tail: self.tail, handler: self.handler }
    }
}

impl fmt::Debug for EndpointBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder").field("method", &self.method.method()).field("tail", &self.tail).finish()
    }
}

macro_rules! method_router {
    ($method:ident, $method_name:ident) => {
        #[doc = concat!("Creates an endpoint for `", stringify!($method), "` requests.")]
        pub fn $method<H: Handler + 'static>(handler: H) -> EndpointBuilder {
            EndpointBuilder::new(matcher::$method_name(), handler)
        }
    };
}

method_router!(get, get_method);
method_router!(post, post_method);
method_router!(put, put_method);
method_router!(delete, delete_method);
method_router!(head, head_method);
method_router!(options, options_method);
method_router!(connect, connect_method);
method_router!(patch, patch_method);
method_router!(trace, trace_method);
method_router!(any, any_method);
