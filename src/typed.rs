use std::convert::TryFrom;

use crate::value::{Type, Value};

/// Conversion from a config value to a Rust type, used by the typed
/// getters on [`Config`](crate::Config).
pub trait FromValue: Sized {
    /// The config type this Rust type is read from.
    fn conf_type() -> Type;

    /// `None` if the value has another type or does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value {
    ( $($rtype:ty => $dtype:ident),*) => {
        $(
            impl FromValue for $rtype {
                fn conf_type() -> Type {
                    Type::$dtype
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$dtype(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}
from_value!(bool => Bool, i64 => Long, f64 => Double, String => Text);

// Narrower integers are read from a long, if it fits.
macro_rules! from_long {
    ( $($rtype:ty),*) => {
        $(
            impl FromValue for $rtype {
                fn conf_type() -> Type {
                    Type::Long
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_long().and_then(|n| <$rtype>::try_from(n).ok())
                }
            }
        )*
    };
}
from_long!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f32 {
    fn conf_type() -> Type {
        Type::Double
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_double().map(|n| n as f32)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn conf_type() -> Type {
        Type::Array(Box::new(T::conf_type()))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.items().iter().map(T::from_value).collect()
    }
}
