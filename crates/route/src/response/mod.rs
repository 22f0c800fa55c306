//! The response value handlers produce and transports render.
//!
//! Responses are built from a [`status`] constructor and refined with
//! options, each a `FnOnce(&mut Response)`:
//!
//! ```
//! use micro_route::response::{self, status};
//!
//! let response = status::ok()
//!     .with(response::content_type(mime::APPLICATION_JSON))
//!     .with(response::send(response::Entity(vec!["a", "b"])));
//!
//! assert_eq!(response.headers().get("content-type"), Some("application/json"));
//! assert_eq!(response.headers().get("content-length"), Some("9"));
//! assert_eq!(response.body().unwrap(), r#"["a","b"]"#);
//! ```

mod headers;
mod issue;
mod payload;
pub mod status;

pub use headers::{Headers, canonical};
pub use issue::Issue;
pub use payload::{Entity, Payload, Reader};

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Option<Bytes>,
    issue: Option<Issue>,
    failure: Option<String>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: Headers::new(), body: None, issue: None, failure: None }
    }

    /// Applies a response option.
    #[must_use]
    pub fn with<O: FnOnce(&mut Self)>(mut self, option: O) -> Self {
        option(&mut self);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn issue(&self) -> Option<&Issue> {
        self.issue.as_ref()
    }

    /// The failure behind an issue response, for logging only.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn into_parts(self) -> (StatusCode, Headers, Option<Bytes>) {
        (self.status, self.headers, self.body)
    }

    /// Sets the body and, unless the transfer encoding is chunked, its `Content-Length`.
    pub fn set_body(&mut self, body: Bytes) {
        let chunked = self.headers.get(TRANSFER_ENCODING.as_str()).is_some_and(|te| te.eq_ignore_ascii_case("chunked"));
        if !chunked {
            self.headers.insert(CONTENT_LENGTH.as_str(), body.len().to_string());
        }
        self.body = Some(body);
    }

    /// Attaches an RFC 7807 issue for the current status and renders it as the body.
    pub fn set_issue(&mut self, failure: &dyn Display, title: Option<&str>, details: Option<serde_json::Value>) {
        let mut issue = Issue::new(self.status);
        if let Some(title) = title {
            issue.title = title.to_owned();
        }
        issue.details = details;

        match serde_json::to_vec(&issue) {
            Ok(body) => {
                self.headers.insert(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref());
                self.set_body(Bytes::from(body));
            }
            Err(_) => {
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.headers.insert(CONTENT_TYPE.as_str(), mime::TEXT_PLAIN.as_ref());
                self.set_body(Bytes::from_static(b"JSON serialization is failed for <Issue>"));
            }
        }

        self.failure = Some(format!("{}: {} {} - {failure}", issue.instance, self.status.as_u16(), issue.title));
        self.issue = Some(issue);
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

/// Sets a header, replacing previous values.
pub fn header(name: &str, value: impl Into<String>) -> impl FnOnce(&mut Response) {
    move |response| response.headers.insert(name, value)
}

/// Appends a header value, keeping previous values.
pub fn append_header(name: &str, value: impl Into<String>) -> impl FnOnce(&mut Response) {
    move |response| response.headers.append(name, value)
}

pub fn content_type(value: impl AsRef<str>) -> impl FnOnce(&mut Response) {
    move |response| response.headers.insert(CONTENT_TYPE.as_str(), value.as_ref())
}

/// Writes `payload` as the body, encoded by the response `Content-Type`.
///
/// An encoding failure turns the response into a `500` issue.
pub fn send<P: Payload>(payload: P) -> impl FnOnce(&mut Response) {
    move |response| match payload.encode(response.headers.get(CONTENT_TYPE.as_str())) {
        Ok(body) => response.set_body(body),
        Err(e) => {
            response.status = StatusCode::INTERNAL_SERVER_ERROR;
            response.set_issue(&format_args!("serialization is failed: {e}"), None, None);
        }
    }
}

/// Sets `Content-Type: application/json` and writes `value` as JSON.
pub fn json<T: Serialize>(value: T) -> impl FnOnce(&mut Response) {
    move |response| {
        response.headers.insert(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref());
        send(Entity(value))(response);
    }
}

/// Sets `Content-Type: application/x-www-form-urlencoded` and writes `value` as a flat form.
pub fn form<T: Serialize>(value: T) -> impl FnOnce(&mut Response) {
    move |response| {
        response.headers.insert(CONTENT_TYPE.as_str(), mime::APPLICATION_WWW_FORM_URLENCODED.as_ref());
        send(Entity(value))(response);
    }
}

/// Attaches an RFC 7807 issue caused by `failure`.
pub fn issue<E: Display>(failure: E) -> impl FnOnce(&mut Response) {
    move |response| response.set_issue(&failure, None, None)
}

/// Attaches an RFC 7807 issue with a custom title.
pub fn issue_titled<E: Display>(failure: E, title: impl Into<String>) -> impl FnOnce(&mut Response) {
    move |response| {
        let title = title.into();
        response.set_issue(&failure, Some(&title), None);
    }
}

/// Attaches an RFC 7807 issue whose `details` carry the failure message.
pub fn issue_details<E: Display>(failure: E) -> impl FnOnce(&mut Response) {
    move |response| {
        let details = serde_json::Value::String(failure.to_string());
        response.set_issue(&failure, None, Some(details));
    }
}
