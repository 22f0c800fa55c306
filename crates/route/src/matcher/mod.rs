//! Composable request matchers.
//!
//! A [`Matcher`] inspects a [`Context`] and answers with a [`MatchResult`]:
//! - `Ok(())`: it matched and staged whatever lens values it extracts,
//! - `Err(Halt::NoMatch)`: this branch does not apply, another alternative may,
//! - `Err(Halt::Respond(response))`: the request is recognized and its outcome decided.
//!
//! Matchers compose by product ([`MatcherExt::and`], [`all_of`]), where every
//! part must match, and co-product ([`MatcherExt::or`], [`any_of`]), where the
//! first part that does not answer `NoMatch` wins. A matcher answering `NoMatch`
//! leaves the context as it found it.
//!
//! # Examples
//!
//! ```
//! use micro_route::matcher::{MatcherExt, get_method, header, path, post_method};
//!
//! let read = get_method().and(path::is("users")).and(path::end());
//! let write = post_method().and(path::is("users")).and(header::is("Content-Type", "application/json"));
//! let users = read.or(write);
//! ```

pub mod body;
pub mod claim;
pub mod header;
mod method;
pub mod path;
pub mod query;

pub use method::{
    MethodMatcher, any_method, connect_method, delete_method, get_method, head_method, method, options_method,
    patch_method, post_method, put_method, trace_method,
};

use crate::context::Context;
use crate::response::Response;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Why a matcher stopped the composition.
pub enum Halt {
    NoMatch,
    Respond(Box<Response>),
}

impl Halt {
    pub fn respond(response: Response) -> Self {
        Halt::Respond(Box::new(response))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Halt::NoMatch)
    }
}

impl From<Response> for Halt {
    fn from(response: Response) -> Self {
        Halt::respond(response)
    }
}

impl fmt::Debug for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::NoMatch => f.write_str("NoMatch"),
            Halt::Respond(response) => f.debug_tuple("Respond").field(&response.status()).finish(),
        }
    }
}

pub type MatchResult = Result<(), Halt>;

/// Core trait for request matching.
///
/// The trait requires `Send + Sync`: matchers are built once at startup and
/// shared by every request served concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Matcher: Send + Sync {
    async fn matches(&self, ctx: &mut Context) -> MatchResult;
}

#[async_trait]
impl<M: Matcher + ?Sized> Matcher for Box<M> {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        self.as_ref().matches(ctx).await
    }
}

#[async_trait]
impl<M: Matcher + ?Sized> Matcher for Arc<M> {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        self.as_ref().matches(ctx).await
    }
}

pub type BoxMatcher = Box<dyn Matcher>;

/// Combinator methods available on every matcher.
pub trait MatcherExt: Matcher + Sized {
    /// Product: `self` then `other`, both must match.
    fn and<B: Matcher>(self, other: B) -> And<Self, B> {
        And { first: self, second: other }
    }

    /// Co-product: `self`, or `other` when `self` answers `NoMatch`.
    fn or<B: Matcher>(self, other: B) -> Or<Self, B> {
        Or { first: self, second: other }
    }

    fn boxed(self) -> BoxMatcher
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<M: Matcher> MatcherExt for M {}

#[derive(Debug)]
pub struct And<A, B> {
    first: A,
    second: B,
}

#[async_trait]
impl<A: Matcher, B: Matcher> Matcher for And<A, B> {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        let result = match self.first.matches(ctx).await {
            Ok(()) => self.second.matches(ctx).await,
            halt => halt,
        };
        if matches!(result, Err(Halt::NoMatch)) {
            ctx.restore(snapshot);
        }
        result
    }
}

#[derive(Debug)]
pub struct Or<A, B> {
    first: A,
    second: B,
}

#[async_trait]
impl<A: Matcher, B: Matcher> Matcher for Or<A, B> {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        match self.first.matches(ctx).await {
            Err(Halt::NoMatch) => {
                ctx.restore(snapshot);
                let result = self.second.matches(ctx).await;
                if matches!(result, Err(Halt::NoMatch)) {
                    ctx.restore(snapshot);
                }
                result
            }
            result => result,
        }
    }
}

/// Creates a new product of matchers.
pub fn all_of() -> AllOf {
    AllOf::new()
}

/// Compose matchers with AND logic.
///
/// Inner matchers run in insertion order until one does not answer `Ok`.
/// An empty product matches.
#[derive(Default)]
pub struct AllOf {
    matchers: Vec<BoxMatcher>,
}

impl AllOf {
    fn new() -> Self {
        Self { matchers: vec![] }
    }

    /// Add a new matcher to the AND chain.
    pub fn and<M: Matcher + 'static>(&mut self, matcher: M) -> &mut Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

#[async_trait]
impl Matcher for AllOf {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        for matcher in &self.matchers {
            if let Err(halt) = matcher.matches(ctx).await {
                if halt.is_no_match() {
                    ctx.restore(snapshot);
                }
                return Err(halt);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllOf").field("len", &self.matchers.len()).finish()
    }
}

/// Creates a new co-product of matchers.
pub fn any_of() -> AnyOf {
    AnyOf::new()
}

/// Compose matchers with OR logic.
///
/// Inner matchers run in insertion order; the first answer other than
/// `NoMatch` wins. An empty co-product answers `NoMatch`.
#[derive(Default)]
pub struct AnyOf {
    matchers: Vec<BoxMatcher>,
}

impl AnyOf {
    fn new() -> Self {
        Self { matchers: vec![] }
    }

    /// Add a new matcher to the OR chain.
    pub fn or<M: Matcher + 'static>(&mut self, matcher: M) -> &mut Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub(crate) fn push(&mut self, matcher: BoxMatcher) {
        self.matchers.push(matcher);
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

#[async_trait]
impl Matcher for AnyOf {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        for matcher in &self.matchers {
            match matcher.matches(ctx).await {
                Err(Halt::NoMatch) => ctx.restore(snapshot),
                result => return result,
            }
        }
        Err(Halt::NoMatch)
    }
}

impl fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOf").field("len", &self.matchers.len()).finish()
    }
}

struct FnMatcher<F>(F);

#[async_trait]
impl<F> Matcher for FnMatcher<F>
where
    F: Fn(&mut Context) -> MatchResult + Send + Sync,
{
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        let result = (self.0)(ctx);
        if matches!(result, Err(Halt::NoMatch)) {
            ctx.restore(snapshot);
        }
        result
    }
}

/// Creates a matcher from a closure.
///
/// ```
/// use micro_route::matcher::{Halt, fn_matcher};
///
/// let api = fn_matcher(|ctx| {
///     if ctx.request().path().starts_with("/api") { Ok(()) } else { Err(Halt::NoMatch) }
/// });
/// ```
pub fn fn_matcher<F>(f: F) -> impl Matcher
where
    F: Fn(&mut Context) -> MatchResult + Send + Sync,
{
    FnMatcher(f)
}

/// A matcher that always matches.
#[derive(Debug, Clone, Copy)]
pub struct Always;

#[async_trait]
impl Matcher for Always {
    #[inline]
    async fn matches(&self, _ctx: &mut Context) -> MatchResult {
        Ok(())
    }
}

/// A matcher that never matches.
#[derive(Debug, Clone, Copy)]
pub struct Never;

#[async_trait]
impl Matcher for Never {
    #[inline]
    async fn matches(&self, _ctx: &mut Context) -> MatchResult {
        Err(Halt::NoMatch)
    }
}

pub fn always() -> Always {
    Always
}

pub fn never() -> Never {
    Never
}
