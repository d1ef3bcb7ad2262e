use std::fmt;

use crate::scope::Scope;

/// Number of element slots an array grows by while it is being parsed.
pub(crate) const ARRAY_CHUNK: usize = 16;

/// The declared type of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Long,
    Double,
    Text,
    Compound,
    Array(Box<Type>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Long => f.write_str("long"),
            Type::Double => f.write_str("double"),
            Type::Text => f.write_str("text"),
            Type::Compound => f.write_str("compound"),
            Type::Array(elem) => write!(f, "array<{}>", elem),
        }
    }
}

/// A typed value. Compounds and arrays own everything below them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Compound(Scope),
    Array(ArrayValue),
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Long(_) => Type::Long,
            Value::Double(_) => Type::Double,
            Value::Text(_) => Type::Text,
            Value::Compound(_) => Type::Compound,
            Value::Array(a) => Type::Array(Box::new(a.elem_type())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Value::Long(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Scope> {
        match self {
            Value::Compound(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub(crate) fn option_count(&self) -> usize {
        match self {
            Value::Compound(scope) => scope.option_count(),
            Value::Array(a) => a.proto.option_count() + a.items.iter().map(Value::option_count).sum::<usize>(),
            _ => 0,
        }
    }
}

/// Array storage.
///
/// `proto` is the element prototype: every element is a deep copy of it
/// before parsed data is written in. For compound elements it is the
/// shared template scope; for nested arrays an empty array that carries
/// its own prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    proto: Box<Value>,
    pub(crate) items: Vec<Value>,
}

impl ArrayValue {
    pub(crate) fn new(proto: Value) -> ArrayValue {
        ArrayValue {
            proto: Box::new(proto),
            items: Vec::new(),
        }
    }

    pub fn elem_type(&self) -> Type {
        self.proto.type_of()
    }

    /// A fresh element, deep-copied from the prototype.
    pub fn new_element(&self) -> Value {
        (*self.proto).clone()
    }

    pub fn template(&self) -> Option<&Scope> {
        self.proto.as_compound()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.items.get(idx)
    }

    pub(crate) fn set_items(&mut self, items: Vec<Value>) {
        self.items = items;
    }
}

// Zero value of a scalar type, used as an element prototype.
pub(crate) fn zero_of(ty: &Type) -> Option<Value> {
    match ty {
        Type::Bool => Some(Value::Bool(false)),
        Type::Long => Some(Value::Long(0)),
        Type::Double => Some(Value::Double(0.0)),
        Type::Text => Some(Value::Text(String::new())),
        Type::Compound | Type::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_array_type() {
        let inner = ArrayValue::new(Value::Long(0));
        let outer = Value::Array(ArrayValue::new(Value::Array(inner)));
        assert_eq!(outer.type_of(), Type::Array(Box::new(Type::Array(Box::new(Type::Long)))));
        assert_eq!(outer.type_of().to_string(), "array<array<long>>");
    }

    #[test]
    fn new_element_is_independent() {
        let mut arr = ArrayValue::new(Value::Text("x".to_string()));
        let mut e = arr.new_element();
        if let Value::Text(s) = &mut e {
            s.push('y');
        }
        arr.set_items(vec![e]);
        assert_eq!(arr.new_element().as_str(), Some("x"));
        assert_eq!(arr.get(0).and_then(Value::as_str), Some("xy"));
    }
}
