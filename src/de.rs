//! Serde bridge: read a loaded configuration into a Rust struct.
//!
//! Compounds (and the root scope) look like maps, arrays like sequences.
//! Options the struct does not mention are ignored.
use std::slice;

use serde::de::{
    self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use crate::error::{Error, ErrorKind, Result};
use crate::scope::{ConfOption, Scope};
use crate::value::Value;

pub(crate) struct Deserializer<'a> {
    value: &'a Value,
}

impl<'a> Deserializer<'a> {
    pub fn new(value: &'a Value) -> Self {
        Deserializer { value }
    }
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Long(n) => visitor.visit_i64(*n),
            Value::Double(n) => visitor.visit_f64(*n),
            Value::Text(s) => visitor.visit_str(s),
            Value::Compound(scope) => visitor.visit_map(ScopeAccess::new(scope)),
            Value::Array(array) => visitor.visit_seq(ArrayAccess {
                iter: array.items().iter(),
            }),
        }
    }

    // Every declared option has a value.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    // Unit variants, spelled as text.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Text(s) => {
                let de: de::value::StrDeserializer<Error> = s.as_str().into_deserializer();
                visitor.visit_enum(de)
            }
            other => Err(Error::bare(
                ErrorKind::Value,
                format!("expected text for enum, found {}", other.type_of()),
            )),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

/// The root of a configuration, seen as a map.
pub(crate) struct ScopeDeserializer<'a> {
    scope: &'a Scope,
}

impl<'a> ScopeDeserializer<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        ScopeDeserializer { scope }
    }
}

impl<'de, 'a> de::Deserializer<'de> for ScopeDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(ScopeAccess::new(self.scope))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple tuple_struct
        map struct enum identifier ignored_any
    }
}

// The options of one scope as key/value pairs.
struct ScopeAccess<'a> {
    iter: slice::Iter<'a, ConfOption>,
    current: Option<&'a ConfOption>,
}

impl<'a> ScopeAccess<'a> {
    fn new(scope: &'a Scope) -> Self {
        ScopeAccess {
            iter: scope.iter(),
            current: None,
        }
    }
}

impl<'de, 'a> MapAccess<'de> for ScopeAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        let opt = match self.iter.next() {
            Some(opt) => opt,
            None => return Ok(None),
        };
        self.current = Some(opt);
        let key: de::value::StrDeserializer<Error> = opt.name().into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let opt = match self.current.take() {
            Some(opt) => opt,
            None => return Err(Error::bare(ErrorKind::Value, "BUG: value requested before key")),
        };
        debug!("deserialize option {}", opt.name());
        seed.deserialize(Deserializer::new(opt.value()))
            .map_err(|e| in_option(e, opt.name()))
    }
}

struct ArrayAccess<'a> {
    iter: slice::Iter<'a, Value>,
}

impl<'de, 'a> SeqAccess<'de> for ArrayAccess<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// helper
fn in_option(mut e: Error, name: &str) -> Error {
    e.msg = format!("{}: {}", name, e.msg);
    e
}
