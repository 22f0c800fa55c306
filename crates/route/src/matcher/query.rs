//! Matchers on query parameters. Keys are case-sensitive; the first value of a key wins.

use super::{Halt, MatchResult, Matcher};
use crate::context::Context;
use crate::lens::Optic;
use async_trait::async_trait;

/// Matches when the parameter equals the literal; the literal `*` accepts any value.
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
        match ctx.request().query().get(&self.key) {
            Some(value) if self.literal == "*" || value == self.literal => Ok(()),
            _ => Err(Halt::NoMatch),
        }
    }
}

/// Matches when the parameter is present.
#[derive(Debug, Clone)]
pub struct Any(String);

pub fn any(key: impl Into<String>) -> Any {
    Any(key.into())
}

#[async_trait]
impl Matcher for Any {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        if ctx.request().query().contains(&self.0) { Ok(()) } else { Err(Halt::NoMatch) }
    }
}

/// Matches when the parameter is present and parses; stages the value.
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
        let Some(raw) = ctx.request().query().get(&self.key) else {
            return Err(Halt::NoMatch);
        };
        let Ok(value) = self.optic.parse(raw) else {
            return Err(Halt::NoMatch);
        };
        ctx.stage(&self.optic, value);
        Ok(())
    }
}

/// Always matches; stages the value only when the parameter is present and parses.
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
        let parsed = ctx.request().query().get(&self.key).and_then(|raw| self.optic.parse(raw).ok());
        if let Some(value) = parsed {
            ctx.stage(&self.optic, value);
        }
        Ok(())
    }
}
