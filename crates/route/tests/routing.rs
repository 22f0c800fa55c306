use http::StatusCode;
use micro_route::context::Context;
use micro_route::handler::{bind, handler_fn};
use micro_route::matcher::{body, header, path};
use micro_route::response::{self, Issue, status};
use micro_route::route::{Router, Segment, any, get, post};
use micro_route::{Request, Response, lens, lenses, uri};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
struct User {
    id: i64,
}

#[derive(Debug, Default)]
struct Pair {
    x: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Echo {
    s: String,
    n: i32,
}

#[derive(Debug, Default)]
struct EchoRequest {
    echo: Echo,
}

#[derive(Debug, Default)]
struct FormRequest {
    fields: HashMap<String, String>,
}

fn router() -> Router {
    let id = lens!(User, id);
    let x = lens!(Pair, x);
    Router::builder()
        .route(uri!["echo"], get(handler_fn(|_: &mut Context| status::ok().with(response::send("echo")))))
        .route(uri!["echo"], post(bind(|req: EchoRequest| async move { status::ok().with(response::json(req.echo)) })).with(body::content(lens!(EchoRequest, echo, json))))
        .route(uri!["users", id], get(bind(|user: User| async move { format!("id={}", user.id) })))
        .route(uri!["a", "b"], get(handler_fn(|_: &mut Context| "literal")))
        .route(uri!["a", &x], get(bind(|pair: Pair| async move { format!("wildcard {}", pair.x) })))
        .route(uri!["files", Segment::rest(&x)], get(bind(|pair: Pair| async move { pair.x })))
        .route(uri!["secure"], get(handler_fn(|_: &mut Context| "granted")).with(header::is("X-Auth", "Bearer *")))
        .build()
        .unwrap()
}

async fn send(router: &Router, request: Request) -> Response {
    let mut ctx = Context::new(request);
    router.serve(&mut ctx).await
}

async fn get_path(router: &Router, path: &str) -> Response {
    send(router, Request::builder().uri(path).body(()).unwrap()).await
}

fn text(response: &Response) -> String {
    response.body().map(|body| String::from_utf8_lossy(body).into_owned()).unwrap_or_default()
}

fn issue(response: &Response) -> Issue {
    serde_json::from_slice(response.body().unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_static_route() {
    let response = get_path(&router(), "/echo").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(&response), "echo");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_typed_capture() {
    let router = router();

    let response = get_path(&router, "/users/42").await;
    assert_eq!(text(&response), "id=42");

    let response = get_path(&router, "/users/abc").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.headers().get("content-type"), Some("application/json"));
    let issue = issue(&response);
    assert_eq!(issue.kind, "https://httpstatuses.com/501");
    assert_eq!(issue.status, 501);
    assert_eq!(issue.title, "Not Implemented");
    Uuid::parse_str(&issue.instance).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_literal_wins_over_wildcard() {
    let router = router();
    assert_eq!(text(&get_path(&router, "/a/b").await), "literal");
    assert_eq!(text(&get_path(&router, "/a/c").await), "wildcard c");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_greedy_capture() {
    assert_eq!(text(&get_path(&router(), "/files/a/b/c").await), "a/b/c");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_json_body() {
    let router = router();

    let request = Request::builder().method("POST").uri("/echo").header("Content-Type", "application/json").body(r#"{"s":"hi","n":1}"#).unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let echo: Echo = serde_json::from_slice(response.body().unwrap()).unwrap();
    assert_eq!(echo, Echo { s: "hi".into(), n: 1 });

    let request = Request::builder().method("POST").uri("/echo").header("Content-Type", "application/json").body(r#"{"s":"hi","#).unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(issue(&response).details.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_header_wildcard() {
    let router = router();

    let response = get_path(&router, "/secure").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let request = Request::builder().uri("/secure").header("x-auth", "Bearer xyz").body(()).unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(&response), "granted");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_json_round_trip() {
    let echo = Echo { s: "round trip".into(), n: -7 };
    let encoded = status::ok().with(response::json(echo.clone()));

    let router = Router::builder()
        .route(uri!["echo"], post(bind(|req: EchoRequest| async move { status::ok().with(response::json(req.echo)) })).with(body::content(lens!(EchoRequest, echo, json))))
        .build()
        .unwrap();
    let request = Request::builder().method("POST").uri("/echo").body(encoded.body().unwrap().clone()).unwrap();
    let response = send(&router, request).await;

    let decoded: Echo = serde_json::from_slice(response.body().unwrap()).unwrap();
    assert_eq!(decoded, echo);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_form_round_trip() {
    let fields = HashMap::from([("a".to_owned(), "1".to_owned()), ("b".to_owned(), "two words".to_owned())]);
    let encoded = status::ok().with(response::form(fields.clone()));

    let (form,) = lenses!(FormRequest { fields: form });
    let router = Router::builder()
        .route(uri!["form"], post(bind(|req: FormRequest| async move { status::ok().with(response::json(req.fields)) })).with(body::content(form)))
        .build()
        .unwrap();
    let request = Request::builder().method("POST").uri("/form").body(encoded.body().unwrap().clone()).unwrap();
    let response = send(&router, request).await;

    let decoded: HashMap<String, String> = serde_json::from_slice(response.body().unwrap()).unwrap();
    assert_eq!(decoded, fields);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_nested_router_binds_its_own_captures() {
    let x = lens!(Pair, x);
    let id = lens!(User, id);
    let inner = Router::builder().route(uri!["a", id], get(bind(|user: User| async move { format!("id={}", user.id) }))).build().unwrap();
    let outer = Router::builder().route(uri![&x, "5"], any(handler_fn(|_: &mut Context| "outer")).with(inner)).build().unwrap();

    let response = get_path(&outer, "/a/5").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(&response), "id=5");

    let response = send(&outer, Request::builder().method("POST").uri("/a/5").body(()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_trie_dispatch_consumes_the_path() {
    let router = Router::builder()
        .route(uri!["users"], get(handler_fn(|_: &mut Context| "users")).with(path::end()))
        .route(uri!["users", "_"], get(handler_fn(|_: &mut Context| "user")).with(path::end()))
        .build()
        .unwrap();

    assert_eq!(text(&get_path(&router, "/users").await), "users");
    assert_eq!(text(&get_path(&router, "/users/42").await), "user");
}
