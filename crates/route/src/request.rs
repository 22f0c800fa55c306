//! The transport independent request shape matchers inspect.

use crate::TransportError;
use crate::body::ReqBody;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use std::collections::HashMap;

/// Identity claims supplied by a gateway authorizer, treated as opaque strings.
pub type Claims = HashMap<String, String>;

/// An incoming request.
///
/// Everything except the body is immutable once built. `segments` is the path
/// split on `/` with the leading empty element dropped, `[]` for the root.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Query,
    headers: HeaderMap,
    body: ReqBody,
    claims: Option<Claims>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw url path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn body_mut(&mut self) -> &mut ReqBody {
        &mut self.body
    }
}

fn http_error<E: Into<http::Error>>(e: E) -> TransportError {
    TransportError::from(Into::<http::Error>::into(e))
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_owned(),
            segments: Vec::new(),
            query: Query::default(),
            headers: HeaderMap::new(),
            body: ReqBody::empty(),
            claims: None,
        }
    }
}

pub(crate) fn split_segments(path: &str) -> Vec<String> {
    match path.strip_prefix('/').unwrap_or(path) {
        "" => Vec::new(),
        rest => rest.split('/').map(ToOwned::to_owned).collect(),
    }
}

/// Decoded query parameters.
///
/// Keys are case-sensitive and may repeat; [`get`](Query::get) returns the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn parse(query: &str) -> Result<Self, TransportError> {
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .map(|pairs| Self { pairs })
            .map_err(TransportError::invalid_uri)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

struct Parts {
    method: Method,
    uri: Uri,
    path: Option<String>,
    query: Query,
    headers: HeaderMap,
    claims: Option<Claims>,
}

/// Builds a [`Request`], recording the first error until [`body`](RequestBuilder::body) is called.
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Result<Parts, TransportError>,
}

impl std::fmt::Debug for Parts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parts").field("method", &self.method).field("uri", &self.uri).finish_non_exhaustive()
    }
}

impl RequestBuilder {
    fn new() -> Self {
        let parts = Parts { method: Method::GET, uri: Uri::from_static("/"), path: None, query: Query::default(), headers: HeaderMap::new(), claims: None };
        Self { inner: Ok(parts) }
    }

    pub fn method<T>(self, method: T) -> Self
    where
        Method: TryFrom<T>,
        <Method as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.and_then(move |mut parts| {
            parts.method = Method::try_from(method).map_err(http_error)?;
            Ok(parts)
        })
    }

    /// Sets the request target; the query string, if any, is decoded into parameters.
    pub fn uri<T>(self, uri: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.and_then(move |mut parts| {
            let uri = Uri::try_from(uri).map_err(http_error)?;
            parts.query = match uri.query() {
                Some(query) => Query::parse(query)?,
                None => Query::default(),
            };
            parts.uri = uri;
            Ok(parts)
        })
    }

    /// Sets an already decoded path, used in place of the uri path.
    ///
    /// Gateways hand over the path decoded, so it may hold spaces or
    /// non-ASCII text a uri can not carry.
    pub fn path(self, path: impl Into<String>) -> Self {
        self.and_then(move |mut parts| {
            let path = path.into();
            parts.path = Some(if path.starts_with('/') { path } else { format!("/{path}") });
            Ok(parts)
        })
    }

    pub fn query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.and_then(move |mut parts| {
            parts.query.append(key, value);
            Ok(parts)
        })
    }

    pub fn header<K, V>(self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.and_then(move |mut parts| {
            let name = HeaderName::try_from(key).map_err(http_error)?;
            let value = HeaderValue::try_from(value).map_err(http_error)?;
            parts.headers.append(name, value);
            Ok(parts)
        })
    }

    pub fn headers(self, headers: HeaderMap) -> Self {
        self.and_then(move |mut parts| {
            parts.headers.extend(headers);
            Ok(parts)
        })
    }

    pub fn claim(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.and_then(move |mut parts| {
            parts.claims.get_or_insert_with(Claims::new).insert(key.into(), value.into());
            Ok(parts)
        })
    }

    pub fn claims(self, claims: Claims) -> Self {
        self.and_then(move |mut parts| {
            parts.claims = Some(claims);
            Ok(parts)
        })
    }

    pub fn body(self, body: impl Into<ReqBody>) -> Result<Request, TransportError> {
        let Parts { method, uri, path, query, headers, claims } = self.inner?;
        let path = match path {
            Some(path) => path,
            None if uri.path().is_empty() => "/".to_owned(),
            None => uri.path().to_owned(),
        };
        let segments = split_segments(&path);

        Ok(Request { method, path, segments, query, headers, body: body.into(), claims })
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(Parts) -> Result<Parts, TransportError>,
    {
        Self { inner: self.inner.and_then(f) }
    }
}
