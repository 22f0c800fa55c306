//! Matchers on path segments.
//!
//! Each matcher consumes segments from the context's path cursor, so a product
//! of path matchers walks the path from left to right:
//!
//! ```
//! use micro_route::matcher::{MatcherExt, path};
//! use micro_route::lens;
//!
//! #[derive(Debug, Default)]
//! struct Get {
//!     id: u64,
//! }
//!
//! let user = path::is("users").and(path::capture(lens!(Get, id))).and(path::end());
//! ```

use super::{Halt, MatchResult, Matcher};
use crate::context::Context;
use crate::lens::Optic;
use async_trait::async_trait;

/// Matches when the next segment equals the literal.
#[derive(Debug, Clone)]
pub struct Is(String);

pub fn is(literal: impl Into<String>) -> Is {
    Is(literal.into())
}

#[async_trait]
impl Matcher for Is {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        if ctx.next_segment() != Some(self.0.as_str()) {
            return Err(Halt::NoMatch);
        }
        ctx.advance(1);
        Ok(())
    }
}

/// Consumes the next segment and stages it through a lens.
#[derive(Debug, Clone)]
pub struct Capture(Optic);

pub fn capture(lens: impl Into<Optic>) -> Capture {
    Capture(lens.into())
}

#[async_trait]
impl Matcher for Capture {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let Some(segment) = ctx.next_segment() else {
            return Err(Halt::NoMatch);
        };
        let Ok(value) = self.0.parse(segment) else {
            return Err(Halt::NoMatch);
        };
        ctx.stage(&self.0, value);
        ctx.advance(1);
        Ok(())
    }
}

/// Consumes every remaining segment, joined by `/`, and stages the text through a lens.
#[derive(Debug, Clone)]
pub struct Rest(Optic);

pub fn rest(lens: impl Into<Optic>) -> Rest {
    Rest(lens.into())
}

#[async_trait]
impl Matcher for Rest {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let remaining = ctx.remaining_segments();
        let consumed = remaining.len();
        let Ok(value) = self.0.parse(&remaining.join("/")) else {
            return Err(Halt::NoMatch);
        };
        ctx.stage(&self.0, value);
        ctx.advance(consumed);
        Ok(())
    }
}

/// Consumes one segment without capturing it.
#[derive(Debug, Clone, Copy)]
pub struct Any;

pub fn any() -> Any {
    Any
}

#[async_trait]
impl Matcher for Any {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        if ctx.next_segment().is_none() {
            return Err(Halt::NoMatch);
        }
        ctx.advance(1);
        Ok(())
    }
}

/// Matches when every segment has been consumed.
#[derive(Debug, Clone, Copy)]
pub struct End;

pub fn end() -> End {
    End
}

#[async_trait]
impl Matcher for End {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        if ctx.next_segment().is_some() { Err(Halt::NoMatch) } else { Ok(()) }
    }
}
