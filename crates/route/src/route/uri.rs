use crate::RouteError;
use crate::context::Context;
use crate::lens::{Lens, Optic};
use crate::matcher::{Halt, MatchResult, Matcher};
use crate::trie::Edge;
use async_trait::async_trait;
use std::fmt;

/// One segment of a path pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Matches the segment text exactly.
    Literal(String),
    /// Matches one segment and parses it through the lens.
    Capture(Optic),
    /// Matches one segment, whatever it is.
    Any,
    /// Matches the rest of the path, optionally parsed through a lens.
    Rest(Option<Optic>),
}

impl Segment {
    pub fn rest(lens: impl Into<Optic>) -> Self {
        Segment::Rest(Some(lens.into()))
    }

    fn edge(&self) -> Edge {
        match self {
            Segment::Literal(literal) => Edge::Static(format!("/{literal}").into_bytes()),
            Segment::Capture(_) => Edge::Capture,
            Segment::Any => Edge::Discard,
            Segment::Rest(_) => Edge::Greedy,
        }
    }
}

/// `"_"` is [`Segment::Any`], `"*"` is `Segment::Rest(None)`, anything else a literal.
impl From<&str> for Segment {
    fn from(segment: &str) -> Self {
        match segment {
            "_" => Segment::Any,
            "*" => Segment::Rest(None),
            literal => Segment::Literal(literal.to_owned()),
        }
    }
}

impl From<String> for Segment {
    fn from(segment: String) -> Self {
        Segment::from(segment.as_str())
    }
}

impl From<Optic> for Segment {
    fn from(optic: Optic) -> Self {
        Segment::Capture(optic)
    }
}

impl<S: 'static, A: 'static> From<Lens<S, A>> for Segment {
    fn from(lens: Lens<S, A>) -> Self {
        Segment::Capture(lens.into())
    }
}

impl<S: 'static, A: 'static> From<&Lens<S, A>> for Segment {
    fn from(lens: &Lens<S, A>) -> Self {
        Segment::Capture(lens.into())
    }
}

/// A path pattern: the segments a request path must have, in order.
///
/// Patterns are written either with [`uri!`](crate::uri!) or parsed from the
/// textual form, where `:name` captures through the next lens, `_` matches any
/// single segment and a trailing `*` matches the rest of the path:
///
/// ```
/// use micro_route::route::Uri;
/// use micro_route::{lenses, uri};
///
/// #[derive(Debug, Default)]
/// struct Download {
///     user: u64,
///     path: String,
/// }
///
/// let (user, path) = lenses!(Download { user, path });
///
/// let parsed = Uri::parse("/users/:user/files/*", [user.clone().into(), path.clone().into()]).unwrap();
/// let built = uri!["users", user, "files", micro_route::route::Segment::rest(path)];
/// assert_eq!(parsed.to_string(), built.to_string());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Uri {
    segments: Vec<Segment>,
}

impl Uri {
    /// The root path `/`.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parses a textual pattern, binding `:name` captures to `lenses` in order.
    ///
    /// A trailing `*` takes one more lens when there is one left.
    pub fn parse<I>(pattern: &str, lenses: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Optic>,
    {
        let Some(path) = pattern.strip_prefix('/') else {
            return Err(RouteError::invalid_pattern(pattern, "must start with '/'"));
        };

        let mut lenses = lenses.into_iter();
        let mut segments = vec![];
        let mut expected = 0;
        let mut bound = 0;
        for segment in path.split('/').filter(|_| !path.is_empty()) {
            let segment = match segment {
                "*" => {
                    expected += 1;
                    let lens = lenses.next();
                    bound += usize::from(lens.is_some());
                    Segment::Rest(lens)
                }
                "_" => Segment::Any,
                capture if capture.starts_with(':') => {
                    expected += 1;
                    let Some(lens) = lenses.next() else {
                        return Err(RouteError::missing_lens(pattern, expected, bound));
                    };
                    bound += 1;
                    Segment::Capture(lens)
                }
                literal => Segment::Literal(literal.to_owned()),
            };
            segments.push(segment);
        }

        let unused = lenses.count();
        if unused > 0 {
            return Err(RouteError::missing_lens(pattern, expected, bound + unused));
        }

        let uri = Self { segments };
        uri.validate()?;
        Ok(uri)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Checks that literals are non-empty single segments and that a rest segment comes last.
    pub fn validate(&self) -> Result<(), RouteError> {
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) if literal.is_empty() => {
                    return Err(RouteError::invalid_pattern(self, "empty segment"));
                }
                Segment::Literal(literal) if literal.contains('/') => {
                    return Err(RouteError::invalid_pattern(self, format!("segment '{literal}' contains '/'")));
                }
                Segment::Rest(_) if index + 1 != self.segments.len() => {
                    return Err(RouteError::invalid_pattern(self, "'*' must be the last segment"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.segments.iter().map(Segment::edge)
    }

    /// The lens bound to each trie capture, in path order.
    pub(crate) fn slots(&self) -> Vec<Option<Optic>> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Capture(optic) => Some(Some(optic.clone())),
                Segment::Rest(optic) => Some(optic.clone()),
                Segment::Literal(_) | Segment::Any => None,
            })
            .collect()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "/{literal}")?,
                Segment::Capture(optic) => write!(f, "/:{}", optic.name())?,
                Segment::Any => f.write_str("/_")?,
                Segment::Rest(_) => f.write_str("/*")?,
            }
        }
        Ok(())
    }
}

/// Matches the pattern against the segments under the context's path cursor,
/// then requires that no segment remains.
#[async_trait]
impl Matcher for Uri {
    async fn matches(&self, ctx: &mut Context) -> MatchResult {
        let snapshot = ctx.snapshot();
        let result = self.walk(ctx);
        if result.is_err() {
            ctx.restore(snapshot);
        }
        result
    }
}

impl Uri {
    fn walk(&self, ctx: &mut Context) -> MatchResult {
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    if ctx.next_segment() != Some(literal.as_str()) {
                        return Err(Halt::NoMatch);
                    }
                    ctx.advance(1);
                }
                Segment::Capture(optic) => {
                    let Some(raw) = ctx.next_segment() else {
                        return Err(Halt::NoMatch);
                    };
                    let Ok(value) = optic.parse(raw) else {
                        return Err(Halt::NoMatch);
                    };
                    ctx.stage(optic, value);
                    ctx.advance(1);
                }
                Segment::Any => {
                    if ctx.next_segment().is_none() {
                        return Err(Halt::NoMatch);
                    }
                    ctx.advance(1);
                }
                Segment::Rest(optic) => {
                    let remaining = ctx.remaining_segments();
                    let consumed = remaining.len();
                    if let Some(optic) = optic {
                        let Ok(value) = optic.parse(&remaining.join("/")) else {
                            return Err(Halt::NoMatch);
                        };
                        ctx.stage(optic, value);
                    }
                    ctx.advance(consumed);
                }
            }
        }

        if ctx.next_segment().is_some() { Err(Halt::NoMatch) } else { Ok(()) }
    }
}

/// Builds a [`Uri`] from segments: string literals, lenses for captures,
/// `"_"` for any segment and `"*"` or [`Segment::rest`] for the rest of the path.
///
/// ```
/// use micro_route::{lens, uri};
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: u64,
/// }
///
/// let user = uri!["users", lens!(User, id)];
/// assert_eq!(user.to_string(), "/users/:id");
/// assert_eq!(uri![].to_string(), "/");
/// ```
#[macro_export]
macro_rules! uri {
    ($($segment:expr),* $(,)?) => {
        $crate::route::Uri::new(vec![$($crate::route::Segment::from($segment)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::{Segment, Uri};
    use crate::RouteError;
    use crate::context::Context;
    use crate::matcher::{Halt, Matcher};
    use crate::request::Request;
    use crate::trie::Edge;
    use crate::{lens, lenses};

    #[derive(Debug, Default)]
    struct Blob {
        bucket: String,
        key: String,
    }

    fn context(uri: &str) -> Context {
        Context::new(Request::builder().uri(uri).body(()).unwrap())
    }

    #[test]
    fn test_parse() {
        let (bucket, key) = lenses!(Blob { bucket, key });
        let uri = Uri::parse("/blobs/:bucket/_/*", [bucket.into(), key.into()]).unwrap();

        assert_eq!(uri.to_string(), "/blobs/:bucket/_/*");
        assert_eq!(uri.edges().collect::<Vec<_>>(), [Edge::segment("blobs"), Edge::Capture, Edge::Discard, Edge::Greedy]);
        assert_eq!(uri.slots().iter().map(|slot| slot.as_ref().map(|optic| optic.name())).collect::<Vec<_>>(), [Some("bucket"), Some("key")]);

        let root = Uri::parse("/", []).unwrap();
        assert!(root.segments().is_empty());
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn test_parse_rest_without_lens() {
        let bucket = lens!(Blob, bucket);
        let uri = Uri::parse("/blobs/:bucket/*", [bucket.into()]).unwrap();
        assert!(matches!(uri.segments().last(), Some(Segment::Rest(None))));
        assert_eq!(uri.slots().len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        let (bucket, key) = lenses!(Blob { bucket, key });

        assert!(matches!(Uri::parse("blobs", []), Err(RouteError::InvalidPattern { .. })));
        assert!(matches!(Uri::parse("/blobs//x", []), Err(RouteError::InvalidPattern { .. })));
        assert!(matches!(Uri::parse("/*/blobs", []), Err(RouteError::InvalidPattern { .. })));
        assert_eq!(Uri::parse("/:bucket/:key", [bucket.clone().into()]).unwrap_err(), RouteError::missing_lens("/:bucket/:key", 2, 1));
        assert_eq!(Uri::parse("/:bucket", [bucket.into(), key.into()]).unwrap_err(), RouteError::missing_lens("/:bucket", 1, 2));
    }

    #[test]
    fn test_macro_validation() {
        uri!["a", "_", "*"].validate().unwrap();
        assert!(matches!(uri!["a/b"].validate(), Err(RouteError::InvalidPattern { .. })));
        assert!(matches!(uri!["*", "a"].validate(), Err(RouteError::InvalidPattern { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_uri_as_matcher() {
        let (bucket, key) = lenses!(Blob { bucket, key });
        let uri = uri!["blobs", &bucket, Segment::rest(&key)];

        let mut ctx = context("/blobs/photos/2024/cat.png");
        uri.matches(&mut ctx).await.unwrap();
        let mut blob = Blob::default();
        ctx.decode(&mut blob).unwrap();
        assert_eq!(blob.bucket, "photos");
        assert_eq!(blob.key, "2024/cat.png");

        let exact = uri!["blobs", &bucket];
        let mut ctx = context("/blobs/photos/2024");
        assert!(matches!(exact.matches(&mut ctx).await, Err(Halt::NoMatch)));
        assert!(ctx.morphism().is_empty());
        assert_eq!(ctx.next_segment(), Some("blobs"));
    }
}
