//! The request body matcher.

use super::{Halt, MatchResult, Matcher};
use crate::BodyError;
use crate::context::Context;
use crate::lens::Optic;
use crate::response::{self, Response, status};
use async_trait::async_trait;
use tracing::debug;

/// Reads the body once and stages its text through a lens.
///
/// The lens codec decides how the text becomes the field: JSON and form
/// lenses carry the raw text and decode it when the morphism is applied.
/// An empty body does not match. A body that is not UTF-8, fails to read or
/// does not parse ends the request with an issue response.
#[derive(Debug, Clone)]
pub struct Content(Optic);

pub fn content(lens: impl Into<Optic>) -> Content {
    Content(lens.into())
}

#[async_trait]
impl Matcher for Content {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let payload = ctx.payload().await.map_err(|e| Halt::respond(body_failure(&e)))?;
        if payload.is_empty() {
            return Err(Halt::NoMatch);
        }

        let Ok(text) = std::str::from_utf8(&payload) else {
            return Err(status::bad_request().with(response::issue_details("request body is not utf8")).into());
        };

        match self.0.parse(text) {
            Ok(value) => {
                ctx.stage(&self.0, value);
                Ok(())
            }
            Err(e) => Err(status::bad_request().with(response::issue_details(e)).into()),
        }
    }
}

fn body_failure(e: &BodyError) -> Response {
    debug!(cause = %e, "failed to read request body");
    let response = match e {
        BodyError::Cancelled => status::service_unavailable(),
        BodyError::TooLarge { .. } => status::request_entity_too_large(),
        BodyError::Io { .. } => status::bad_request(),
    };
    response.with(response::issue_details(e))
}
