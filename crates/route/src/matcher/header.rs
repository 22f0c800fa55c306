//! Matchers on request headers.
//!
//! Header names compare case-insensitively. An invalid header name is logged
//! when the matcher is built and the matcher never matches.

use super::{Halt, MatchResult, Matcher};
use crate::context::Context;
use crate::lens::Optic;
use crate::response::{self, status};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, HeaderName};
use std::fmt::Display;
use tracing::warn;

fn header_name(name: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| warn!(header = name, cause = %e, "invalid header name, matcher never matches")).ok()
}

fn first_value<'a>(ctx: &'a Context, name: Option<&HeaderName>) -> Option<&'a str> {
    name.and_then(|name| ctx.request().headers().get(name)).and_then(|value| value.to_str().ok())
}

/// Matches when a value of the header starts with the literal.
///
/// A trailing `*` in the literal is a wildcard: `"*"` accepts any value and
/// `"Bearer *"` accepts any value starting with `"Bearer "`.
#[derive(Debug, Clone)]
pub struct Is {
    name: Option<HeaderName>,
    prefix: String,
}

pub fn is(name: &str, literal: &str) -> Is {
    let prefix = literal.strip_suffix('*').unwrap_or(literal);
    Is { name: header_name(name), prefix: prefix.to_owned() }
}

#[async_trait]
impl Matcher for Is {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let Some(name) = &self.name else {
            return Err(Halt::NoMatch);
        };
        let prefix = self.prefix.as_bytes();
        if ctx.request().headers().get_all(name).iter().any(|value| value.as_bytes().starts_with(prefix)) {
            Ok(())
        } else {
            Err(Halt::NoMatch)
        }
    }
}

/// Matches when the header is present.
#[derive(Debug, Clone)]
pub struct Any(Option<HeaderName>);

pub fn any(name: &str) -> Any {
    Any(header_name(name))
}

#[async_trait]
impl Matcher for Any {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        match &self.0 {
            Some(name) if ctx.request().headers().contains_key(name) => Ok(()),
            _ => Err(Halt::NoMatch),
        }
    }
}

/// Matches when the header is present and its first value parses; stages the value.
#[derive(Debug, Clone)]
pub struct Get {
    name: Option<HeaderName>,
    optic: Optic,
}

pub fn get(name: &str, lens: impl Into<Optic>) -> Get {
    Get { name: header_name(name), optic: lens.into() }
}

#[async_trait]
impl Matcher for Get {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let Some(raw) = first_value(ctx, self.name.as_ref()) else {
            return Err(Halt::NoMatch);
        };
        let Ok(value) = self.optic.parse(raw) else {
            return Err(Halt::NoMatch);
        };
        ctx.stage(&self.optic, value);
        Ok(())
    }
}

/// Always matches; stages the value only when the header is present and parses.
#[derive(Debug, Clone)]
pub struct Maybe {
    name: Option<HeaderName>,
    optic: Optic,
}

pub fn maybe(name: &str, lens: impl Into<Optic>) -> Maybe {
    Maybe { name: header_name(name), optic: lens.into() }
}

#[async_trait]
impl Matcher for Maybe {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let parsed = first_value(ctx, self.name.as_ref()).and_then(|raw| self.optic.parse(raw).ok());
        if let Some(value) = parsed {
            ctx.stage(&self.optic, value);
        }
        Ok(())
    }
}

/// Checks `Authorization: <type> <credential>` with a user function.
///
/// A missing or malformed header, or a credential the function rejects, ends
/// the request with `401 Unauthorized`.
pub struct Authorization<F>(F);

pub fn authorization<F, E>(f: F) -> Authorization<F>
where
    F: Fn(&str, &str) -> Result<(), E> + Send + Sync,
    E: Display,
{
    Authorization(f)
}

#[async_trait]
impl<F, E> Matcher for Authorization<F>
where
    F: Fn(&str, &str) -> Result<(), E> + Send + Sync,
    E: Display,
{
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let Some(auth) = first_value(ctx, Some(&AUTHORIZATION)) else {
            return Err(unauthorized(ctx));
        };
        let Some((kind, credential)) = auth.split_once(' ').filter(|(_, credential)| !credential.is_empty() && !credential.contains(' ')) else {
            return Err(unauthorized(ctx));
        };

        match (self.0)(kind, credential) {
            Ok(()) => Ok(()),
            Err(e) => Err(status::unauthorized().with(response::issue(e)).into()),
        }
    }
}

fn unauthorized(ctx: &Context) -> Halt {
    let failure = format!("Unauthorized {}", ctx.request().path());
    status::unauthorized().with(response::issue(failure)).into()
}

impl<F> std::fmt::Debug for Authorization<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Authorization")
    }
}

#[cfg(test)]
mod tests {
    use super::{any, authorization, get, is, maybe};
    use crate::context::Context;
    use crate::lens;
    use crate::matcher::{Halt, Matcher};
    use crate::request::Request;
    use http::StatusCode;

    #[derive(Debug, Default)]
    struct Auth {
        token: String,
        retries: Option<u8>,
    }

    fn context(headers: &[(&'static str, &'static str)]) -> Context {
        let mut builder = Request::builder().uri("/secure");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        Context::new(builder.body(()).unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_prefix_and_wildcard() {
        let mut ctx = context(&[("X-Auth", "Bearer xyz")]);

        assert!(matches!(is("X-Auth", "Bearer *").matches(&mut ctx).await, Ok(())));
        assert!(matches!(is("x-auth", "Bearer").matches(&mut ctx).await, Ok(())));
        assert!(matches!(is("X-AUTH", "*").matches(&mut ctx).await, Ok(())));
        assert!(matches!(is("X-Auth", "Basic *").matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(is("X-Other", "*").matches(&mut ctx).await, Err(Halt::NoMatch)));

        let mut ctx = context(&[]);
        assert!(matches!(is("X-Auth", "Bearer *").matches(&mut ctx).await, Err(Halt::NoMatch)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_multi_valued_header() {
        let mut ctx = context(&[("Accept", "text/html"), ("accept", "application/json")]);
        assert!(matches!(is("Accept", "application/json").matches(&mut ctx).await, Ok(())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_invalid_name_never_matches() {
        let mut ctx = context(&[("X-Auth", "Bearer xyz")]);
        assert!(matches!(is("bad name", "*").matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(any("bad name").matches(&mut ctx).await, Err(Halt::NoMatch)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_get_and_maybe() {
        let token = lens!(Auth, token);
        let retries = lens!(Auth, retries);

        let mut ctx = context(&[("X-Token", "abc"), ("X-Retries", "many")]);
        get("x-token", &token).matches(&mut ctx).await.unwrap();
        maybe("x-retries", &retries).matches(&mut ctx).await.unwrap();
        assert!(matches!(get("x-retries", &retries).matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(any("X-Token").matches(&mut ctx).await, Ok(())));

        let mut auth = Auth::default();
        ctx.decode(&mut auth).unwrap();
        assert_eq!(auth.token, "abc");
        assert_eq!(auth.retries, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_authorization() {
        let check = authorization(|kind, credential| if kind == "Bearer" && credential == "good" { Ok(()) } else { Err("token is rejected") });

        let mut ctx = context(&[("Authorization", "Bearer good")]);
        assert!(matches!(check.matches(&mut ctx).await, Ok(())));

        for headers in [&[][..], &[("Authorization", "Bearer")][..], &[("Authorization", "Bearer bad")][..]] {
            let mut ctx = context(headers);
            match check.matches(&mut ctx).await {
                Err(Halt::Respond(response)) => {
                    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
                    assert_eq!(response.issue().unwrap().status, 401);
                }
                other => panic!("expected 401, got {other:?}"),
            }
        }
    }
}
