use http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use tracing::warn;

/// Response headers.
///
/// Names compare case-insensitively and are kept lower case; transports that
/// need the wire casing apply [`canonical`] when writing them out. A name or
/// value `http` rejects is dropped with a warning.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self { map: HeaderMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Sets `name` to `value`, replacing every previous value of the header.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        if let Some((name, value)) = entry(name, value.into()) {
            self.map.insert(name, value);
        }
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        if let Some((name, value)) = entry(name, value.into()) {
            self.map.append(name, value);
        }
    }

    /// Sets `name` only when the header is not present yet.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<String>) {
        if !self.contains(name) {
            self.append(name, value);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.map.remove(name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(name, value)| (name.as_str(), text(value)))
    }

    /// Counts values, so a header set twice counts twice.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl From<Headers> for HeaderMap {
    fn from(headers: Headers) -> Self {
        headers.map
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn entry(name: &str, value: String) -> Option<(HeaderName, HeaderValue)> {
    match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        (Ok(name), Ok(value)) => Some((name, value)),
        (Err(e), _) => {
            warn!(name, cause = %e, "dropping response header with invalid name");
            None
        }
        (_, Err(e)) => {
            warn!(name, cause = %e, "dropping response header with invalid value");
            None
        }
    }
}

// values only ever come in as `String`, so their bytes are utf8
fn text(value: &HeaderValue) -> &str {
    std::str::from_utf8(value.as_bytes()).unwrap_or_default()
}

/// Canonical MIME header key: first letter and each letter following `-` upper case, the rest lower case.
pub fn canonical(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            mapped
        })
        .collect()
}
