use crate::EncodeError;
use bytes::Bytes;
use serde::Serialize;
use std::io::Read;

/// A body source accepted by [`send`](super::send).
///
/// Text and bytes are written as is. [`Reader`] is drained. [`Entity`] is
/// encoded according to the response `Content-Type`.
pub trait Payload {
    fn encode(self, content_type: Option<&str>) -> Result<Bytes, EncodeError>;
}

impl Payload for String {
    fn encode(self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(self))
    }
}

impl Payload for &str {
    fn encode(self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Payload for Vec<u8> {
    fn encode(self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(self))
    }
}

impl Payload for &[u8] {
    fn encode(self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Payload for Bytes {
    fn encode(self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        Ok(self)
    }
}

/// A readable stream, drained completely into the body.
#[derive(Debug)]
pub struct Reader<R>(pub R);

impl<R: Read> Payload for Reader<R> {
    fn encode(mut self, _content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        let mut buf = Vec::new();
        self.0.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// A value encoded by content type: `*json*` as JSON, `*www-form*` as a flat
/// form, anything else as JSON.
#[derive(Debug)]
pub struct Entity<T>(pub T);

impl<T: Serialize> Payload for Entity<T> {
    fn encode(self, content_type: Option<&str>) -> Result<Bytes, EncodeError> {
        match content_type {
            Some(content_type) if content_type.contains("www-form") => Ok(Bytes::from(serde_urlencoded::to_string(&self.0)?)),
            _ => Ok(Bytes::from(serde_json::to_vec(&self.0)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, Payload, Reader};
    use crate::EncodeError;
    use bytes::Bytes;
    use serde::Serialize;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    #[derive(Serialize)]
    struct Pet {
        name: &'static str,
        kind: &'static str,
    }

    #[test]
    fn test_identity_payloads() {
        assert_eq!("echo".encode(Some("application/json")).unwrap(), "echo");
        assert_eq!(String::from("a").encode(None).unwrap(), "a");
        assert_eq!(vec![1u8, 2].encode(None).unwrap(), Bytes::from_static(&[1, 2]));
        assert_eq!(Reader(Cursor::new(b"stream".to_vec())).encode(None).unwrap(), "stream");
    }

    #[test]
    fn test_entity_by_content_type() {
        let pet = Pet { name: "Rex", kind: "dog" };
        assert_eq!(Entity(&pet).encode(Some("application/json")).unwrap(), r#"{"name":"Rex","kind":"dog"}"#);
        assert_eq!(Entity(&pet).encode(Some("application/problem+json")).unwrap(), r#"{"name":"Rex","kind":"dog"}"#);
        assert_eq!(Entity(&pet).encode(Some("application/x-www-form-urlencoded")).unwrap(), "name=Rex&kind=dog");
        assert_eq!(Entity(&pet).encode(None).unwrap(), r#"{"name":"Rex","kind":"dog"}"#);
    }

    #[test]
    fn test_form_requires_flat_value() {
        let mut nested = BTreeMap::new();
        nested.insert("a", vec![1, 2]);
        let err = Entity(&nested).encode(Some("application/x-www-form-urlencoded")).unwrap_err();
        assert!(matches!(err, EncodeError::Form { .. }));
    }
}
