//! Conversion from and to API gateway proxy events.
//!
//! The gateway delivers each request as a JSON event and expects a JSON
//! response event back. Bodies may be base64 encoded; identity claims come
//! from the authorizer attached to the request context.

use super::Transport;
use crate::TransportError;
use crate::request::{Claims, Request};
use crate::response::{Response, canonical};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An API gateway proxy request event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub http_method: String,
    pub path: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: ProxyRequestContext,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestContext {
    #[serde(default)]
    pub authorizer: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub identity: Identity,
}

/// The IAM caller identity of a signed request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_arn: Option<String>,
}

/// An API gateway proxy response event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// CORS headers added to every gateway response.
///
/// `allow_origin: None` echoes the request `Origin`, or `*` without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cors {
    pub allow_origin: Option<String>,
    pub allow_methods: String,
    pub allow_headers: String,
    pub max_age: u32,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_origin: None,
            allow_methods: "GET, PUT, POST, DELETE, OPTIONS".to_owned(),
            allow_headers: "Content-Type, Authorization, Accept".to_owned(),
            max_age: 600,
        }
    }
}

impl Cors {
    fn headers(&self, request: &Request) -> [(&'static str, String); 4] {
        let origin = match &self.allow_origin {
            Some(origin) => origin.clone(),
            None => request.headers().get(http::header::ORIGIN).and_then(|origin| origin.to_str().ok()).unwrap_or("*").to_owned(),
        };
        [
            ("Access-Control-Allow-Origin", origin),
            ("Access-Control-Allow-Methods", self.allow_methods.clone()),
            ("Access-Control-Allow-Headers", self.allow_headers.clone()),
            ("Access-Control-Max-Age", self.max_age.to_string()),
        ]
    }
}

/// The API gateway proxy transport.
///
/// ```
/// use micro_route::transport::gateway::{Cors, Gateway};
///
/// let permissive = Gateway::new();
/// let strict = Gateway::new().cors(Cors { allow_origin: Some("https://example.com".into()), ..Cors::default() });
/// let bare = Gateway::new().without_cors();
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    cors: Option<Cors>,
}

impl Gateway {
    pub fn new() -> Self {
        Self { cors: Some(Cors::default()) }
    }

    #[must_use]
    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    #[must_use]
    pub fn without_cors(mut self) -> Self {
        self.cors = None;
        self
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

fn claims(context: &ProxyRequestContext) -> Option<Claims> {
    if let Some(authorizer) = &context.authorizer {
        let serde_json::Value::Object(claims) = authorizer.get("claims")? else {
            return None;
        };
        let claims = claims
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(value) => (key.clone(), value.clone()),
                other => (key.clone(), other.to_string()),
            })
            .collect();
        return Some(claims);
    }

    let identity = &context.identity;
    let user_arn = identity.user_arn.as_deref().filter(|arn| !arn.is_empty())?;
    Some(Claims::from([
        ("iss".to_owned(), "https://aws.amazon.com/iam".to_owned()),
        ("sub".to_owned(), identity.user.clone().unwrap_or_default()),
        ("username".to_owned(), user_arn.to_owned()),
    ]))
}

impl Transport for Gateway {
    type Request = ProxyRequest;
    type Response = ProxyResponse;

    fn request(&self, event: ProxyRequest) -> Result<Request, TransportError> {
        let mut builder = Request::builder().method(event.http_method.as_str()).path(event.path);

        match (event.multi_value_headers, event.headers) {
            (Some(headers), _) => {
                for (name, values) in headers {
                    for value in values {
                        builder = builder.header(name.as_str(), value);
                    }
                }
            }
            (None, Some(headers)) => {
                for (name, value) in headers {
                    builder = builder.header(name.as_str(), value);
                }
            }
            (None, None) => {}
        }

        match (event.multi_value_query_string_parameters, event.query_string_parameters) {
            (Some(params), _) => {
                for (key, values) in params {
                    for value in values {
                        builder = builder.query(key.as_str(), value);
                    }
                }
            }
            (None, Some(params)) => {
                for (key, value) in params {
                    builder = builder.query(key, value);
                }
            }
            (None, None) => {}
        }

        if let Some(claims) = claims(&event.request_context) {
            builder = builder.claims(claims);
        }

        let body = match event.body {
            Some(body) if event.is_base64_encoded => Bytes::from(STANDARD.decode(body).map_err(TransportError::invalid_body)?),
            Some(body) => Bytes::from(body),
            None => Bytes::new(),
        };
        builder.body(body)
    }

    fn render(&self, request: &Request, response: Response) -> ProxyResponse {
        let (status, headers, body) = response.into_parts();

        let mut single = HashMap::new();
        let mut multi: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers.iter() {
            multi.entry(canonical(name)).or_default().push(value.to_owned());
        }
        if let Some(cors) = &self.cors {
            for (name, value) in cors.headers(request) {
                multi.entry(name.to_owned()).or_insert_with(|| vec![value]);
            }
        }
        multi.retain(|name, values| {
            if let [value] = values.as_slice() {
                single.insert(name.clone(), value.clone());
                false
            } else {
                true
            }
        });

        let (body, is_base64_encoded) = match body {
            None => (String::new(), false),
            Some(body) => match String::from_utf8(body.to_vec()) {
                Ok(text) => (text, false),
                Err(_) => (STANDARD.encode(&body), true),
            },
        };

        ProxyResponse { status_code: status.as_u16(), headers: single, multi_value_headers: multi, body, is_base64_encoded }
    }
}
