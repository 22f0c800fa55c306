//! Conversion of handler outputs into responses.
//!
//! The [`Responder`] trait is the last step of a handler invocation: whatever
//! a handler returns is turned into a [`Response`] with the context at hand.

use crate::context::Context;
use crate::response::{self, Response, status};
use http::StatusCode;
use std::convert::Infallible;
use std::fmt::Display;
use tracing::error;

/// A type that can be converted into a [`Response`].
pub trait Responder {
    fn response_to(self, ctx: &Context) -> Response;
}

/// Pre-built responses pass through.
impl Responder for Response {
    fn response_to(self, _ctx: &Context) -> Response {
        self
    }
}

/// `Err` becomes `500 Internal Server Error` with the message in the issue `details`.
impl<T: Responder, E: Display> Responder for Result<T, E> {
    fn response_to(self, ctx: &Context) -> Response {
        match self {
            Ok(t) => t.response_to(ctx),
            Err(e) => {
                error!(path = ctx.request().path(), cause = %e, "handler failed");
                status::internal_server_error().with(response::issue_details(e))
            }
        }
    }
}

/// `None` becomes `404 Not Found`.
impl<T: Responder> Responder for Option<T> {
    fn response_to(self, ctx: &Context) -> Response {
        match self {
            Some(t) => t.response_to(ctx),
            None => {
                let failure = format!("NotFound {}", ctx.request().path());
                status::not_found().with(response::issue(failure))
            }
        }
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn response_to(self, ctx: &Context) -> Response {
        let (status, responder) = self;
        let mut response = responder.response_to(ctx);
        response.set_status(status);
        response
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn response_to(self, ctx: &Context) -> Response {
        let (responder, status) = self;
        (status, responder).response_to(ctx)
    }
}

impl<T: Responder> Responder for Box<T> {
    fn response_to(self, ctx: &Context) -> Response {
        (*self).response_to(ctx)
    }
}

/// An empty `200 OK`.
impl Responder for () {
    fn response_to(self, _ctx: &Context) -> Response {
        status::ok()
    }
}

impl Responder for &'static str {
    fn response_to(self, _ctx: &Context) -> Response {
        status::ok().with(response::content_type(mime::TEXT_PLAIN_UTF_8)).with(response::send(self))
    }
}

impl Responder for String {
    fn response_to(self, _ctx: &Context) -> Response {
        status::ok().with(response::content_type(mime::TEXT_PLAIN_UTF_8)).with(response::send(self))
    }
}

impl Responder for Infallible {
    fn response_to(self, _ctx: &Context) -> Response {
        match self {}
    }
}
