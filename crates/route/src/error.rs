use std::io;
use thiserror::Error;

/// Failures of a lens: either the raw text did not parse into the field kind,
/// or the staged value could not be written into the target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LensError {
    #[error("can not parse {input:?} as {kind}: {reason}")]
    Parse { kind: &'static str, input: String, reason: String },

    #[error("can not decode field `{field}`: {reason}")]
    Decode { field: &'static str, reason: String },

    #[error("lens `{field}` expects target type {expected}")]
    Target { field: &'static str, expected: &'static str },
}

impl LensError {
    pub fn parse<S: ToString>(kind: &'static str, input: &str, reason: S) -> Self {
        Self::Parse { kind, input: input.to_owned(), reason: reason.to_string() }
    }

    pub fn decode<S: ToString>(field: &'static str, reason: S) -> Self {
        Self::Decode { field, reason: reason.to_string() }
    }

    pub fn target(field: &'static str, expected: &'static str) -> Self {
        Self::Target { field, expected }
    }
}

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("body size exceed the limit {limit}")]
    TooLarge { limit: usize },

    #[error("body read is cancelled")]
    Cancelled,

    #[error("io error: {reason}")]
    Io { reason: String },
}

impl BodyError {
    pub fn too_large(limit: usize) -> Self {
        Self::TooLarge { limit }
    }

    pub fn io<S: ToString>(str: S) -> Self {
        Self::Io { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("json encode error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("form encode error: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::ser::Error,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route pattern {pattern:?} declares {expected} captures but {actual} lenses are given")]
    MissingLens { pattern: String, expected: usize, actual: usize },
}

impl RouteError {
    pub fn invalid_pattern<P: ToString, S: ToString>(pattern: P, reason: S) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), reason: reason.to_string() }
    }

    pub fn missing_lens<P: ToString>(pattern: P, expected: usize, actual: usize) -> Self {
        Self::MissingLens { pattern: pattern.to_string(), expected, actual }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid http method: {reason}")]
    InvalidMethod { reason: String },

    #[error("invalid http uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },
}

impl TransportError {
    pub fn invalid_method<S: ToString>(str: S) -> Self {
        Self::InvalidMethod { reason: str.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}

impl From<http::Error> for TransportError {
    fn from(e: http::Error) -> Self {
        if e.is::<http::method::InvalidMethod>() {
            Self::invalid_method(e)
        } else if e.is::<http::uri::InvalidUri>() || e.is::<http::uri::InvalidUriParts>() {
            Self::invalid_uri(e)
        } else {
            Self::invalid_header(e)
        }
    }
}
