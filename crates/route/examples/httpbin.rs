//! An httpbin clone behind the API gateway transport.
//!
//! Reads one proxy request event per line from stdin and writes the proxy
//! response event to stdout:
//!
//! ```text
//! echo '{"httpMethod":"GET","path":"/get","headers":{"Host":"example.com"}}' | cargo run --example httpbin
//! ```

use http::StatusCode;
use micro_route::context::Context;
use micro_route::handler::{Handler, bind, handler_fn};
use micro_route::matcher::{header, query};
use micro_route::response::{self, status};
use micro_route::route::{EndpointBuilder, Router, delete, get, patch, post, put};
use micro_route::transport::Service;
use micro_route::transport::gateway::{Gateway, ProxyRequest};
use micro_route::{Response, lens, lenses, uri};
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Default, Serialize)]
struct Headers {
    #[serde(rename = "Accept", skip_serializing_if = "String::is_empty")]
    accept: String,
    #[serde(rename = "Host", skip_serializing_if = "String::is_empty")]
    host: String,
    #[serde(rename = "Origin", skip_serializing_if = "String::is_empty")]
    origin: String,
    #[serde(rename = "Referer", skip_serializing_if = "String::is_empty")]
    referer: String,
    #[serde(rename = "User-Agent", skip_serializing_if = "String::is_empty")]
    user_agent: String,
}

#[derive(Debug, Serialize)]
struct Inspection {
    headers: Headers,
    url: String,
}

#[derive(Debug, Default)]
struct Code {
    code: u16,
}

#[derive(Debug, Default)]
struct Forwarded {
    ip: String,
}

#[derive(Debug, Default)]
struct Agent {
    user_agent: String,
}

#[derive(Debug, Default)]
struct Hop {
    host: String,
    n: u32,
}

#[derive(Debug, Default)]
struct Target {
    url: String,
}

fn with_headers(endpoint: EndpointBuilder) -> EndpointBuilder {
    let (accept, host, origin, referer, user_agent) = lenses!(Headers { accept, host, origin, referer, user_agent });
    endpoint
        .with(header::maybe("Accept", accept))
        .with(header::maybe("Host", host))
        .with(header::maybe("Origin", origin))
        .with(header::maybe("Referer", referer))
        .with(header::maybe("User-Agent", user_agent))
}

fn inspect(subpath: &'static str) -> impl Handler {
    bind(move |headers: Headers| async move {
        let url = format!("https://{}/{subpath}", headers.host);
        status::ok().with(response::json(Inspection { headers, url }))
    })
}

fn reply(code: Code) -> Response {
    match StatusCode::from_u16(code.code) {
        Ok(status) => Response::new(status),
        Err(e) => status::bad_request().with(response::issue_details(e)),
    }
}

fn redirect_to(target: &Target) -> Response {
    match target.url.parse::<http::Uri>() {
        Ok(uri) if uri.scheme().is_some() => status::found().with(response::header("Location", target.url.as_str())),
        _ => status::bad_request().with(response::issue(format!("Invalid url: {}", target.url))),
    }
}

fn router() -> Result<Router, micro_route::RouteError> {
    let code = lens!(Code, code);
    let (host, n) = lenses!(Hop { host, n });

    Router::builder()
        .route(uri!["delete"], with_headers(delete(inspect("delete"))))
        .route(uri!["get"], with_headers(get(inspect("get"))))
        .route(uri!["patch"], with_headers(patch(inspect("patch"))))
        .route(uri!["post"], with_headers(post(inspect("post"))))
        .route(uri!["put"], with_headers(put(inspect("put"))))
        .route(uri!["headers"], with_headers(get(bind(|headers: Headers| async move { status::ok().with(response::json(headers)) }))))
        .route(
            uri!["bearer"],
            get(handler_fn(|_: &mut Context| status::ok())).with(header::authorization(|_kind: &str, token: &str| Err::<(), _>(format!("Invalid token: {token}")))),
        )
        .route(uri!["status", code], get(bind(|code: Code| async move { reply(code) })))
        .route(uri!["ip"], get(bind(|fwd: Forwarded| async move { status::ok().with(response::json(fwd.ip)) })).with(header::get("X-Forwarded-For", lens!(Forwarded, ip))))
        .route(
            uri!["user-agent"],
            get(bind(|agent: Agent| async move { status::ok().with(response::json(agent.user_agent)) })).with(header::get("User-Agent", lens!(Agent, user_agent))),
        )
        .route(uri!["redirect", "1"], get(handler_fn(|_: &mut Context| status::found().with(response::header("Location", "https://example.com")))))
        .route(
            uri!["redirect", n],
            get(bind(|hop: Hop| async move {
                let location = format!("https://{}/api/redirect/{}", hop.host, hop.n.saturating_sub(1));
                status::found().with(response::header("Location", location))
            }))
            .with(header::get("Host", host)),
        )
        .route(uri!["redirect-to"], get(bind(|target: Target| async move { redirect_to(&target) })).with(query::get("url", lens!(Target, url))))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let service = Service::new(Gateway::new(), Arc::new(router()?));
    info!(routes = service.router().len(), "httpbin is ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event: ProxyRequest = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                error!(cause = %e, "failed to parse proxy request event");
                continue;
            }
        };

        let response = service.serve(event, None).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}
