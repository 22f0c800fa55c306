use crate::BodyError;
use bytes::{Bytes, BytesMut};
use http_body::Body as HttpBody;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use std::error::Error;
use std::fmt;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// The one-shot request body.
///
/// The stream is drained at most once: after the first [`read_all`](ReqBody::read_all)
/// every later read returns empty bytes.
pub struct ReqBody {
    inner: Option<BoxBody<Bytes, BoxError>>,
}

impl ReqBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        Self { inner: Some(BoxBody::new(body.map_err(|e| -> BoxError { e.into() }))) }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self::new(Full::new(bytes)) }
    }

    pub fn is_consumed(&self) -> bool {
        self.inner.is_none()
    }

    /// Drains the stream, failing with [`BodyError::TooLarge`] when more than
    /// `limit` bytes arrive.
    pub async fn read_all(&mut self, limit: Option<usize>) -> Result<Bytes, BodyError> {
        let Some(mut body) = self.inner.take() else {
            return Ok(Bytes::new());
        };

        let mut buf = BytesMut::new();
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(BodyError::io)?;
            let Ok(data) = frame.into_data() else {
                continue;
            };
            if let Some(limit) = limit
                && buf.len() + data.len() > limit
            {
                return Err(BodyError::too_large(limit));
            }
            buf.extend_from_slice(&data);
        }
        Ok(buf.freeze())
    }
}

impl Default for ReqBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ReqBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqBody").field("consumed", &self.is_consumed()).finish()
    }
}

impl From<()> for ReqBody {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

impl From<Bytes> for ReqBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<Vec<u8>> for ReqBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::once(Bytes::from(bytes))
    }
}

impl From<String> for ReqBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ReqBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}
