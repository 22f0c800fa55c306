//! Scalar field kinds a [`Lens`](super::Lens) can target without a codec.

use super::Value;
use crate::LensError;

/// A field type that decodes from a single text token.
///
/// `parse` must be pure and total: it returns a [`Value`] of the kind the field
/// stores, or a [`LensError::Parse`]. `from_value` narrows a staged value back
/// into the field type and returns `None` when the representation does not fit.
///
/// Newtypes over a supported scalar get an implementation from [`impl_field!`](crate::impl_field).
pub trait Field: Sized + Send + Sync + 'static {
    const KIND: &'static str;

    fn parse(raw: &str) -> Result<Value, LensError>;

    fn from_value(value: &Value) -> Option<Self>;
}

impl Field for String {
    const KIND: &'static str = "string";

    fn parse(raw: &str) -> Result<Value, LensError> {
        Ok(Value::Text(raw.to_owned()))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(ToOwned::to_owned)
    }
}

macro_rules! integer_field {
    ($($ty:ty),+) => {
        $(
            impl Field for $ty {
                const KIND: &'static str = stringify!($ty);

                fn parse(raw: &str) -> Result<Value, LensError> {
                    let parsed = raw.parse::<$ty>().map_err(|e| LensError::parse(Self::KIND, raw, e))?;
                    let wide = i64::try_from(parsed).map_err(|e| LensError::parse(Self::KIND, raw, e))?;
                    Ok(Value::Integer(wide))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Field for f64 {
    const KIND: &'static str = "f64";

    fn parse(raw: &str) -> Result<Value, LensError> {
        raw.parse::<f64>().map(Value::Double).map_err(|e| LensError::parse(Self::KIND, raw, e))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl Field for f32 {
    const KIND: &'static str = "f32";

    fn parse(raw: &str) -> Result<Value, LensError> {
        raw.parse::<f32>().map(|f| Value::Double(f64::from(f))).map_err(|e| LensError::parse(Self::KIND, raw, e))
    }

    #[allow(clippy::cast_possible_truncation, reason = "staged doubles of an f32 lens were parsed as f32")]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d as f32),
            _ => None,
        }
    }
}

impl Field for bool {
    const KIND: &'static str = "bool";

    fn parse(raw: &str) -> Result<Value, LensError> {
        raw.parse::<bool>().map(|b| Value::Integer(i64::from(b))).map_err(|e| LensError::parse(Self::KIND, raw, e))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl<A: Field> Field for Option<A> {
    const KIND: &'static str = A::KIND;

    fn parse(raw: &str) -> Result<Value, LensError> {
        A::parse(raw)
    }

    fn from_value(value: &Value) -> Option<Self> {
        A::from_value(value).map(Some)
    }
}

/// Implements [`Field`] for a tuple newtype by delegating to the wrapped scalar.
///
/// ```
/// use micro_route::impl_field;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct UserId(u64);
///
/// impl_field!(UserId => u64);
/// ```
#[macro_export]
macro_rules! impl_field {
    ($ty:ty => $inner:ty) => {
        impl $crate::lens::Field for $ty {
            const KIND: &'static str = <$inner as $crate::lens::Field>::KIND;

            fn parse(raw: &str) -> ::std::result::Result<$crate::lens::Value, $crate::LensError> {
                <$inner as $crate::lens::Field>::parse(raw)
            }

            fn from_value(value: &$crate::lens::Value) -> ::std::option::Option<Self> {
                <$inner as $crate::lens::Field>::from_value(value).map(Self)
            }
        }
    };
}
