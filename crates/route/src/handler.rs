use crate::context::Context;
use crate::responder::Responder;
use crate::response::{self, Response, status};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use tracing::debug;

/// The canonical handler signature: a matched context in, a response out.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(&self, ctx: &mut Context) -> Response;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn invoke(&self, ctx: &mut Context) -> Response {
        self.as_ref().invoke(ctx).await
    }
}

/// A typed handler: decodes the staged lens values into a `T` first.
pub struct Bind<T, F> {
    f: F,
    _phantom: PhantomData<fn() -> T>,
}

/// Wraps an async function taking the decoded request value.
///
/// A fresh `T::default()` receives every value staged by the matchers. A
/// decoding failure answers `400 Bad Request` with the decoder message in the
/// issue `details`; otherwise the function output is converted by its
/// [`Responder`] implementation.
///
/// ```
/// use micro_route::handler::bind;
///
/// #[derive(Debug, Default)]
/// struct Hello {
///     name: String,
/// }
///
/// let hello = bind(|req: Hello| async move { format!("hello {}", req.name) });
/// ```
pub fn bind<T, F, Fut>(f: F) -> Bind<T, F>
where
    T: Default + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    Bind { f, _phantom: PhantomData }
}

#[async_trait]
impl<T, F, Fut> Handler for Bind<T, F>
where
    T: Default + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    async fn invoke(&self, ctx: &mut Context) -> Response {
        let mut target = T::default();
        if let Err(e) = ctx.decode(&mut target) {
            debug!(path = ctx.request().path(), cause = %e, "failed to decode request");
            return status::bad_request().with(response::issue_details(e));
        }

        let output = (self.f)(target).await;
        output.response_to(ctx)
    }
}

impl<T, F> std::fmt::Debug for Bind<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bind").field("target", &std::any::type_name::<T>()).finish()
    }
}

/// A handler working on the context directly.
pub struct FnHandler<F, R> {
    f: F,
    _phantom: PhantomData<fn() -> R>,
}

/// Wraps a synchronous function of the context.
pub fn handler_fn<F, R>(f: F) -> FnHandler<F, R>
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: Responder + 'static,
{
    FnHandler { f, _phantom: PhantomData }
}

#[async_trait]
impl<F, R> Handler for FnHandler<F, R>
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: Responder + 'static,
{
    async fn invoke(&self, ctx: &mut Context) -> Response {
        let output = (self.f)(ctx);
        output.response_to(ctx)
    }
}

impl<F, R> std::fmt::Debug for FnHandler<F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnHandler")
    }
}
