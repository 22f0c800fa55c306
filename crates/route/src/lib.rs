//! Composable request matching and decoding.
//!
//! Requests are recognized by [`Matcher`](matcher::Matcher)s: products
//! ([`all_of`](matcher::all_of)) require every part to accept the request,
//! co-products ([`any_of`](matcher::any_of)) try alternatives in order. While
//! matching, values pulled from the path, query, headers, claims and body are
//! written through typed [`Lens`](lens::Lens)es into a morphism, which later
//! decodes into the handler's input type.
//!
//! A [`Router`] compiles route patterns into a radix trie so a request only
//! visits the endpoints declared for its path. Transports convert wire
//! requests into a [`Request`] and render the [`Response`] back.
//!
//! ```
//! use micro_route::handler::bind;
//! use micro_route::matcher::query;
//! use micro_route::route::{Router, get};
//! use micro_route::{lenses, uri};
//!
//! #[derive(Debug, Default)]
//! struct Search {
//!     owner: String,
//!     limit: u32,
//! }
//!
//! let (owner, limit) = lenses!(Search { owner, limit });
//! let router = Router::builder()
//!     .route(uri!["repos", owner], get(bind(|search: Search| async move { format!("{} {}", search.owner, search.limit) })).with(query::get("limit", limit)))
//!     .build()
//!     .unwrap();
//! assert_eq!(router.len(), 1);
//! ```

mod error;

pub mod body;
pub mod context;
pub mod handler;
pub mod lens;
pub mod matcher;
pub mod request;
pub mod responder;
pub mod response;
pub mod route;
pub mod transport;
pub mod trie;

pub use context::{Context, ContextPool};
pub use error::{BodyError, EncodeError, LensError, RouteError, TransportError};
pub use handler::{Handler, bind, handler_fn};
pub use request::Request;
pub use responder::Responder;
pub use response::Response;
pub use route::Router;
