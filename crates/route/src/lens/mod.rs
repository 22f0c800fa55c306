//! Typed field handles used to decode request pieces into a user struct.
//!
//! A [`Lens<S, A>`] names one field `A` of a struct `S` together with a pure
//! `parse` from raw text and an `assign` that writes a staged [`Value`] into a
//! target. Matchers hold the type erased form, [`Optic`], and stage
//! `(optic, value)` pairs into a [`Morphism`]; handlers apply the morphism to a
//! zeroed `S` to obtain the typed request.
//!
//! # Examples
//!
//! ```
//! use micro_route::lens::Morphism;
//! use micro_route::lenses;
//!
//! #[derive(Debug, Default)]
//! struct Search {
//!     user: String,
//!     page: Option<u32>,
//! }
//!
//! let (user, page) = lenses!(Search { user, page });
//!
//! let mut morphism = Morphism::new();
//! morphism.push((&user).into(), user.parse("joe").unwrap());
//! morphism.push((&page).into(), page.parse("2").unwrap());
//!
//! let mut search = Search::default();
//! morphism.apply(&mut search).unwrap();
//! assert_eq!(search.user, "joe");
//! assert_eq!(search.page, Some(2));
//! ```

mod field;
mod morphism;
mod value;

pub use field::Field;
pub use morphism::Morphism;
pub use value::Value;

use crate::LensError;
use serde::de::DeserializeOwned;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// How the raw text of a field is turned into the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// a single text token parsed by the field's [`Field`] implementation
    Scalar,
    /// an aggregate decoded from JSON text
    Json,
    /// an aggregate decoded from `application/x-www-form-urlencoded` text
    Form,
}

type ParseFn = fn(&str) -> Result<Value, LensError>;

struct FieldOptic<S, A> {
    name: &'static str,
    codec: Codec,
    get: fn(&S) -> &A,
    get_mut: fn(&mut S) -> &mut A,
    parse: ParseFn,
    decode: fn(&Value) -> Result<A, String>,
}

/// A typed handle on field `A` of struct `S`.
///
/// Lenses are built once at startup, usually with [`lens!`](crate::lens!) or
/// [`lenses!`](crate::lenses!), and are cheap to clone and share across threads.
pub struct Lens<S, A> {
    optic: Arc<FieldOptic<S, A>>,
}

impl<S: 'static, A: Field> Lens<S, A> {
    /// Creates a lens on a scalar field.
    pub fn new(name: &'static str, get: fn(&S) -> &A, get_mut: fn(&mut S) -> &mut A) -> Self {
        Self::with_codec(name, Codec::Scalar, get, get_mut, A::parse, decode_field::<A>)
    }
}

impl<S: 'static, A: DeserializeOwned + Send + Sync + 'static> Lens<S, A> {
    /// Creates a lens on an aggregate field carried as JSON text.
    pub fn json(name: &'static str, get: fn(&S) -> &A, get_mut: fn(&mut S) -> &mut A) -> Self {
        Self::with_codec(name, Codec::Json, get, get_mut, parse_raw, decode_json::<A>)
    }

    /// Creates a lens on an aggregate field carried as form-urlencoded text.
    pub fn form(name: &'static str, get: fn(&S) -> &A, get_mut: fn(&mut S) -> &mut A) -> Self {
        Self::with_codec(name, Codec::Form, get, get_mut, parse_raw, decode_form::<A>)
    }
}

impl<S, A> Lens<S, A> {
    fn with_codec(
        name: &'static str,
        codec: Codec,
        get: fn(&S) -> &A,
        get_mut: fn(&mut S) -> &mut A,
        parse: ParseFn,
        decode: fn(&Value) -> Result<A, String>,
    ) -> Self {
        Self { optic: Arc::new(FieldOptic { name, codec, get, get_mut, parse, decode }) }
    }

    pub fn name(&self) -> &'static str {
        self.optic.name
    }

    pub fn codec(&self) -> Codec {
        self.optic.codec
    }

    /// Decodes a raw text token into a staged value.
    pub fn parse(&self, raw: &str) -> Result<Value, LensError> {
        (self.optic.parse)(raw)
    }

    /// Writes a staged value into the field of `target`.
    pub fn assign(&self, target: &mut S, value: &Value) -> Result<(), LensError> {
        self.optic.assign(target, value)
    }

    pub fn get<'a>(&self, target: &'a S) -> &'a A {
        (self.optic.get)(target)
    }

    pub fn set(&self, target: &mut S, value: A) {
        *(self.optic.get_mut)(target) = value;
    }
}

impl<S, A> FieldOptic<S, A> {
    fn assign(&self, target: &mut S, value: &Value) -> Result<(), LensError> {
        let decoded = (self.decode)(value).map_err(|reason| LensError::decode(self.name, reason))?;
        *(self.get_mut)(target) = decoded;
        Ok(())
    }
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self { optic: Arc::clone(&self.optic) }
    }
}

impl<S, A> fmt::Debug for Lens<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("name", &self.optic.name)
            .field("codec", &self.optic.codec)
            .field("target", &type_name::<S>())
            .finish()
    }
}

fn parse_raw(raw: &str) -> Result<Value, LensError> {
    Ok(Value::Raw(raw.to_owned()))
}

fn decode_field<A: Field>(value: &Value) -> Result<A, String> {
    A::from_value(value).ok_or_else(|| format!("expected {}, found {value:?}", A::KIND))
}

fn decode_json<A: DeserializeOwned>(value: &Value) -> Result<A, String> {
    match value.as_str() {
        Some(text) => serde_json::from_str(text).map_err(|e| e.to_string()),
        None => Err(format!("expected json text, found {value:?}")),
    }
}

fn decode_form<A: DeserializeOwned>(value: &Value) -> Result<A, String> {
    match value.as_str() {
        Some(text) => serde_urlencoded::from_str(text).map_err(|e| e.to_string()),
        None => Err(format!("expected form text, found {value:?}")),
    }
}

trait ErasedOptic: Send + Sync {
    fn name(&self) -> &'static str;

    fn codec(&self) -> Codec;

    fn parse(&self, raw: &str) -> Result<Value, LensError>;

    fn apply(&self, target: &mut dyn Any, value: &Value) -> Result<(), LensError>;
}

impl<S: 'static, A: 'static> ErasedOptic for FieldOptic<S, A> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn codec(&self) -> Codec {
        self.codec
    }

    fn parse(&self, raw: &str) -> Result<Value, LensError> {
        (self.parse)(raw)
    }

    fn apply(&self, target: &mut dyn Any, value: &Value) -> Result<(), LensError> {
        let target = target.downcast_mut::<S>().ok_or_else(|| LensError::target(self.name, type_name::<S>()))?;
        self.assign(target, value)
    }
}

/// A lens with its struct and field types erased.
///
/// This is the form matchers hold: it can parse raw text and apply a staged
/// value to any `&mut dyn Any`, failing with [`LensError::Target`] when the
/// target is not the struct the lens was built for.
#[derive(Clone)]
pub struct Optic(Arc<dyn ErasedOptic>);

impl Optic {
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn codec(&self) -> Codec {
        self.0.codec()
    }

    pub fn parse(&self, raw: &str) -> Result<Value, LensError> {
        self.0.parse(raw)
    }

    pub fn apply(&self, target: &mut dyn Any, value: &Value) -> Result<(), LensError> {
        self.0.apply(target, value)
    }
}

impl fmt::Debug for Optic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Optic").field(&self.0.name()).finish()
    }
}

impl<S: 'static, A: 'static> From<Lens<S, A>> for Optic {
    fn from(lens: Lens<S, A>) -> Self {
        Optic(lens.optic)
    }
}

impl<S: 'static, A: 'static> From<&Lens<S, A>> for Optic {
    fn from(lens: &Lens<S, A>) -> Self {
        Optic(Arc::clone(&lens.optic) as Arc<dyn ErasedOptic>)
    }
}

/// Builds a [`Lens`] on a named field of a struct.
///
/// The optional third argument selects the codec for aggregate fields:
/// `json` or `form`. Without it the field must implement [`Field`].
///
/// ```
/// use micro_route::lens;
///
/// #[derive(Debug, Default)]
/// struct Order {
///     id: u64,
///     items: Vec<String>,
/// }
///
/// let id = lens!(Order, id);
/// let items = lens!(Order, items, json);
/// assert_eq!(id.name(), "id");
/// assert_eq!(items.name(), "items");
/// ```
#[macro_export]
macro_rules! lens {
    ($ty:ty, $field:ident) => {
        $crate::lens::Lens::<$ty, _>::new(stringify!($field), |s: &$ty| &s.$field, |s: &mut $ty| &mut s.$field)
    };
    ($ty:ty, $field:ident, json) => {
        $crate::lens::Lens::<$ty, _>::json(stringify!($field), |s: &$ty| &s.$field, |s: &mut $ty| &mut s.$field)
    };
    ($ty:ty, $field:ident, form) => {
        $crate::lens::Lens::<$ty, _>::form(stringify!($field), |s: &$ty| &s.$field, |s: &mut $ty| &mut s.$field)
    };
}

/// Builds a tuple of lenses, one per listed field, in the listed order.
///
/// ```
/// use micro_route::lenses;
///
/// #[derive(Debug, Default, serde::Deserialize)]
/// struct Profile {
///     name: String,
///     tags: Vec<String>,
/// }
///
/// #[derive(Debug, Default)]
/// struct Update {
///     id: u32,
///     profile: Profile,
/// }
///
/// let (id, profile) = lenses!(Update { id, profile: json });
/// assert_eq!(id.name(), "id");
/// assert_eq!(profile.name(), "profile");
/// ```
#[macro_export]
macro_rules! lenses {
    ($ty:ty { $($field:ident $(: $codec:ident)?),* $(,)? }) => {
        ( $( $crate::lens!($ty, $field $(, $codec)?), )* )
    };
}
