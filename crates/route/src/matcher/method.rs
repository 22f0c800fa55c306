use super::{Halt, MatchResult, Matcher};
use crate::context::Context;
use async_trait::async_trait;
use http::Method;

/// A matcher on the HTTP method; `None` accepts any method.
#[derive(Debug, Clone)]
pub struct MethodMatcher(Option<Method>);

impl MethodMatcher {
    pub fn method(&self) -> Option<&Method> {
        self.0.as_ref()
    }
}

#[async_trait]
impl Matcher for MethodMatcher {
    #[inline]
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        match &self.0 {
            Some(method) if method != ctx.request().method() => Err(Halt::NoMatch),
            _ => Ok(()),
        }
    }
}

/// Creates a matcher on an arbitrary method.
pub fn method(method: Method) -> MethodMatcher {
    MethodMatcher(Some(method))
}

/// Creates a matcher accepting every method.
pub fn any_method() -> MethodMatcher {
    MethodMatcher(None)
}

macro_rules! method_matcher {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Creates a matcher on HTTP ", stringify!($upper_case_method), " requests.")]
        #[inline]
        pub fn $method() -> MethodMatcher {
            MethodMatcher(Some(Method::$upper_case_method))
        }
    };
}

method_matcher!(get_method, GET);
method_matcher!(post_method, POST);
method_matcher!(put_method, PUT);
method_matcher!(delete_method, DELETE);
method_matcher!(head_method, HEAD);
method_matcher!(options_method, OPTIONS);
method_matcher!(connect_method, CONNECT);
method_matcher!(patch_method, PATCH);
method_matcher!(trace_method, TRACE);

#[cfg(test)]
mod tests {
    use super::{any_method, get_method, method, patch_method, post_method};
    use crate::context::Context;
    use crate::matcher::{Halt, Matcher};
    use crate::request::Request;
    use http::Method;

    fn context(method: &str) -> Context {
        Context::new(Request::builder().method(method).uri("/").body(()).unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_method_matcher() {
        let mut ctx = context("POST");

        assert!(matches!(post_method().matches(&mut ctx).await, Ok(())));
        assert!(matches!(get_method().matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(patch_method().matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(matches!(any_method().matches(&mut ctx).await, Ok(())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_extension_method() {
        let mut ctx = context("PURGE");
        let purge = Method::from_bytes(b"PURGE").unwrap();

        assert!(matches!(method(purge).matches(&mut ctx).await, Ok(())));
        assert!(matches!(get_method().matches(&mut ctx).await, Err(Halt::NoMatch)));
    }
}
