//! Conversion from and to the `http` crate types.

use super::Transport;
use crate::TransportError;
use crate::body::{BoxError, ReqBody};
use crate::request::Request;
use crate::response::Response;
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::Full;
use std::fmt;
use std::marker::PhantomData;

/// The transport of `http::Request<B>` / `http::Response<Full<Bytes>>`,
/// ready to sit behind any server built on the `http` crate.
pub struct Native<B> {
    _phantom: PhantomData<fn(B)>,
}

impl<B> Native<B> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<B> Default for Native<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Native<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Native")
    }
}

impl<B> Transport for Native<B>
where
    B: HttpBody<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    type Request = http::Request<B>;
    type Response = http::Response<Full<Bytes>>;

    fn request(&self, request: http::Request<B>) -> Result<Request, TransportError> {
        let (parts, body) = request.into_parts();
        Request::builder().method(parts.method).uri(parts.uri).headers(parts.headers).body(ReqBody::new(body))
    }

    fn render(&self, _request: &Request, response: Response) -> http::Response<Full<Bytes>> {
        let (status, headers, body) = response.into_parts();
        let mut rendered = http::Response::new(Full::new(body.unwrap_or_default()));
        *rendered.status_mut() = status;
        *rendered.headers_mut() = headers.into();
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::Native;
    use crate::context::Context;
    use crate::handler::{bind, handler_fn};
    use crate::matcher::body;
    use crate::response::{self, status};
    use crate::route::{Router, get, post};
    use crate::transport::{Service, Transport, serve};
    use crate::{lens, uri};
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Note {
        text: String,
    }

    #[derive(Debug, Default)]
    struct Create {
        note: Note,
    }

    fn router() -> Router {
        Router::builder()
            .route(uri!["echo"], get(handler_fn(|ctx: &mut Context| ctx.request().query().get("say").unwrap_or("echo").to_owned())))
            .route(
                uri!["notes"],
                post(bind(|req: Create| async move { status::created().with(response::header("x-custom-header", "1")).with(response::json(req.note)) }))
                    .with(body::content(lens!(Create, note, json))),
            )
            .body_limit(64)
            .build()
            .unwrap()
    }

    async fn read(response: http::Response<Full<Bytes>>) -> (StatusCode, http::HeaderMap, Bytes) {
        let (parts, body) = response.into_parts();
        (parts.status, parts.headers, body.collect().await.unwrap().to_bytes())
    }

    #[test]
    fn test_request_conversion() {
        let native = Native::<Full<Bytes>>::new();
        let request = http::Request::builder().method("PUT").uri("/a/b?x=1&x=2").header("X-Auth", "token").body(Full::new(Bytes::new())).unwrap();

        let request = native.request(request).unwrap();
        assert_eq!(request.method(), http::Method::PUT);
        assert_eq!(request.segments(), ["a", "b"]);
        assert_eq!(request.query().get_all("x").collect::<Vec<_>>(), ["1", "2"]);
        assert_eq!(request.headers()["x-auth"], "token");
        assert!(request.claims().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_serve() {
        let native = Native::<Full<Bytes>>::new();
        let router = router();

        let request = http::Request::get("/echo?say=hi").body(Full::new(Bytes::new())).unwrap();
        let (status, headers, body) = read(serve(&native, &router, request, None).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/plain; charset=utf-8");
        assert_eq!(body, "hi");

        let request = http::Request::get("/missing").body(Full::new(Bytes::new())).unwrap();
        let (status, headers, _) = read(serve(&native, &router, request, None).await).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(headers["content-type"], "application/json");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_service_pools_contexts() {
        let service = Service::with_capacity(Native::<Full<Bytes>>::new(), Arc::new(router()), 2);

        for _ in 0..3 {
            let request = http::Request::post("/notes").body(Full::new(Bytes::from_static(br#"{"text":"hello"}"#))).unwrap();
            let (status, headers, body) = read(service.serve(request, None).await).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(headers["x-custom-header"], "1");
            assert_eq!(body, r#"{"text":"hello"}"#);
        }

        let oversized = Bytes::from(format!(r#"{{"text":"{}"}}"#, "x".repeat(100)));
        let request = http::Request::post("/notes").body(Full::new(oversized)).unwrap();
        let (status, _, _) = read(service.serve(request, None).await).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
