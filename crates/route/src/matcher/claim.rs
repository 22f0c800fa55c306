//! Matchers on identity claims attached by an upstream authorizer.
//!
//! A request without a claims map never matches, `maybe` included: a route
//! guarded by claims is not meant for anonymous callers.

use super::{Halt, MatchResult, Matcher};
use crate::context::Context;
use crate::lens::Optic;
use crate::request::Claims;
use async_trait::async_trait;

fn claims(ctx: &Context) -> Result<&Claims, Halt> {
    ctx.request().claims().ok_or(Halt::NoMatch)
}

/// Matches when the claim equals the literal; the literal `*` accepts any value.
#[derive(Debug, Clone)]
pub struct Is {
    key: String,
    literal: String,
}

pub fn is(key: impl Into<String>, literal: impl Into<String>) -> Is {
    Is { key: key.into(), literal: literal.into() }
}

#[async_trait]
impl Matcher for Is {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        match claims(ctx)?.get(&self.key) {
            Some(value) if self.literal == "*" || *value == self.literal => Ok(()),
            _ => Err(Halt::NoMatch),
        }
    }
}

/// Matches when the claim contains at least one of the needles.
#[derive(Debug, Clone)]
pub struct OneOf {
    key: String,
    needles: Vec<String>,
}

pub fn one_of<I, S>(key: impl Into<String>, needles: I) -> OneOf
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    OneOf { key: key.into(), needles: needles.into_iter().map(Into::into).collect() }
}

#[async_trait]
impl Matcher for OneOf {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        match claims(ctx)?.get(&self.key) {
            Some(value) if self.needles.iter().any(|needle| value.contains(needle.as_str())) => Ok(()),
            _ => Err(Halt::NoMatch),
        }
    }
}

/// Matches when the claim contains every needle.
#[derive(Debug, Clone)]
pub struct AllOf {
    key: String,
    needles: Vec<String>,
}

pub fn all_of<I, S>(key: impl Into<String>, needles: I) -> AllOf
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    AllOf { key: key.into(), needles: needles.into_iter().map(Into::into).collect() }
}

#[async_trait]
impl Matcher for AllOf {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        match claims(ctx)?.get(&self.key) {
            Some(value) if self.needles.iter().all(|needle| value.contains(needle.as_str())) => Ok(()),
            _ => Err(Halt::NoMatch),
        }
    }
}

/// Matches when the claim is present and parses; stages the value.
#[derive(Debug, Clone)]
pub struct Get {
    key: String,
    optic: Optic,
}

pub fn get(key: impl Into<String>, lens: impl Into<Optic>) -> Get {
    Get { key: key.into(), optic: lens.into() }
}

#[async_trait]
impl Matcher for Get {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let Some(raw) = claims(ctx)?.get(&self.key) else {
            return Err(Halt::NoMatch);
        };
        let Ok(value) = self.optic.parse(raw) else {
            return Err(Halt::NoMatch);
        };
        ctx.stage(&self.optic, value);
        Ok(())
    }
}

/// Matches whenever claims are attached; stages the value only when the claim is present and parses.
#[derive(Debug, Clone)]
pub struct Maybe {
    key: String,
    optic: Optic,
}

pub fn maybe(key: impl Into<String>, lens: impl Into<Optic>) -> Maybe {
    Maybe { key: key.into(), optic: lens.into() }
}

#[async_trait]
impl Matcher for Maybe {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let parsed = claims(ctx)?.get(&self.key).and_then(|raw| self.optic.parse(raw).ok());
        if let Some(value) = parsed {
            ctx.stage(&self.optic, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{all_of, get, is, maybe, one_of};
    use crate::context::Context;
    use crate::lenses;
    use crate::matcher::{Halt, Matcher};
    use crate::request::Request;

    #[derive(Debug, Default)]
    struct Caller {
        sub: String,
        level: Option<u8>,
    }

    fn anonymous() -> Context {
        Context::new(Request::builder().uri("/").body(()).unwrap())
    }

    fn signed() -> Context {
        let request = Request::builder().uri("/").claim("sub", "joe").claim("scope", "read write admin").body(()).unwrap();
        Context::new(request)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_literal() {
        let mut ctx = signed();
        assert!(matches!(is("sub", "joe").matches(&mut ctx).await, Ok(())));
        assert!(matches!(is("sub", "*").matches(&mut ctx).await, Ok(())));
        assert!(matches!(is("sub", "ann").matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(is("iss", "*").matches(&mut ctx).await, Err(Halt::NoMatch)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_substring_sets() {
        let mut ctx = signed();
        assert!(matches!(one_of("scope", ["delete", "write"]).matches(&mut ctx).await, Ok(())));
        assert!(matches!(one_of("scope", ["delete"]).matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(all_of("scope", ["read", "admin"]).matches(&mut ctx).await, Ok(())));
        assert!(matches!(all_of("scope", ["read", "delete"]).matches(&mut ctx).await, Err(Halt::NoMatch)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_get_and_maybe() {
        let (sub, level) = lenses!(Caller { sub, level });
        let mut ctx = signed();
        get("sub", &sub).matches(&mut ctx).await.unwrap();
        maybe("level", &level).matches(&mut ctx).await.unwrap();

        let mut caller = Caller::default();
        ctx.decode(&mut caller).unwrap();
        assert_eq!(caller.sub, "joe");
        assert_eq!(caller.level, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_anonymous_request_never_matches() {
        let (sub, level) = lenses!(Caller { sub, level });
        let mut ctx = anonymous();
        assert!(matches!(is("sub", "*").matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(one_of("scope", ["read"]).matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(all_of("scope", Vec::<String>::new()).matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(get("sub", &sub).matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(maybe("level", &level).matches(&mut ctx).await, Err(Halt::NoMatch)));
    }
}
