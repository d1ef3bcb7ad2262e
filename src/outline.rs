//! Schema declaration.
//!
//! An [`Outline`] lists the options a configuration knows about: name,
//! comment, and default value (which fixes the type). It is turned into a
//! live [`Scope`] when a [`Config`](crate::Config) is created.
//!
//! ```
//! use libconf::{ArrayOutline, Elem, Outline};
//!
//! let outline = Outline::new()
//!     .long("workers", "Number of worker threads", 4)
//!     .text("greeting", "Printed at startup", "hello")
//!     .compound("server", "Listener settings", Outline::new()
//!         .text("address", "", "127.0.0.1")
//!         .long("port", "", 8080))
//!     .array("ratios", "", ArrayOutline::new(Elem::Double).item(0.5).item(1.5));
//! assert_eq!(outline.entries().len(), 4);
//! ```
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, ErrorKind, Result};
use crate::scope::{ConfOption, Scope};
use crate::value::{zero_of, ArrayValue, Type, Value};

/// Declared options for one scope.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    entries: Vec<Entry>,
}

/// One declared option.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub comment: String,
    pub value: OutlineValue,
}

/// A declared default. Its variant is the option's type.
#[derive(Debug, Clone)]
pub enum OutlineValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Compound(Outline),
    Array(ArrayOutline),
}

/// Element type of an array. Compound elements carry the template
/// every element is copied from.
#[derive(Debug, Clone)]
pub enum Elem {
    Bool,
    Long,
    Double,
    Text,
    Compound(Outline),
    Array(Box<Elem>),
}

impl Elem {
    pub fn to_type(&self) -> Type {
        match self {
            Elem::Bool => Type::Bool,
            Elem::Long => Type::Long,
            Elem::Double => Type::Double,
            Elem::Text => Type::Text,
            Elem::Compound(_) => Type::Compound,
            Elem::Array(inner) => Type::Array(Box::new(inner.to_type())),
        }
    }
}

/// A declared array: element type plus default items.
///
/// For compound elements a default item is an `Outline` whose entries
/// override the template defaults by name.
#[derive(Debug, Clone)]
pub struct ArrayOutline {
    elem: Elem,
    items: Vec<OutlineValue>,
}

impl ArrayOutline {
    pub fn new(elem: Elem) -> ArrayOutline {
        ArrayOutline {
            elem,
            items: Vec::new(),
        }
    }

    /// Add a default item.
    pub fn item(mut self, item: impl Into<OutlineValue>) -> ArrayOutline {
        self.items.push(item.into());
        self
    }

    /// Add several default items.
    pub fn items<I, T>(mut self, items: I) -> ArrayOutline
    where
        I: IntoIterator<Item = T>,
        T: Into<OutlineValue>,
    {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }
}

macro_rules! outline_value_from {
    ( $($rtype:ty => $variant:ident),*) => {
        $(
            impl From<$rtype> for OutlineValue {
                fn from(v: $rtype) -> OutlineValue {
                    OutlineValue::$variant(v.into())
                }
            }
        )*
    };
}
outline_value_from!(bool => Bool, i64 => Long, i32 => Long, f64 => Double);
outline_value_from!(String => Text, &str => Text, Outline => Compound, ArrayOutline => Array);

impl Outline {
    pub fn new() -> Outline {
        Outline::default()
    }

    /// Declare an option of any type.
    pub fn entry(mut self, name: impl Into<String>, comment: impl Into<String>, value: impl Into<OutlineValue>) -> Outline {
        self.entries.push(Entry {
            name: name.into(),
            comment: comment.into(),
            value: value.into(),
        });
        self
    }

    pub fn bool(self, name: impl Into<String>, comment: impl Into<String>, default: bool) -> Outline {
        self.entry(name, comment, OutlineValue::Bool(default))
    }

    pub fn long(self, name: impl Into<String>, comment: impl Into<String>, default: i64) -> Outline {
        self.entry(name, comment, OutlineValue::Long(default))
    }

    pub fn double(self, name: impl Into<String>, comment: impl Into<String>, default: f64) -> Outline {
        self.entry(name, comment, OutlineValue::Double(default))
    }

    pub fn text(self, name: impl Into<String>, comment: impl Into<String>, default: impl Into<String>) -> Outline {
        self.entry(name, comment, OutlineValue::Text(default.into()))
    }

    pub fn compound(self, name: impl Into<String>, comment: impl Into<String>, children: Outline) -> Outline {
        self.entry(name, comment, OutlineValue::Compound(children))
    }

    pub fn array(self, name: impl Into<String>, comment: impl Into<String>, array: ArrayOutline) -> Outline {
        self.entry(name, comment, OutlineValue::Array(array))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Build a live scope, every current value a copy of its default.
    pub fn instantiate(&self) -> Result<Scope> {
        let mut scope = Scope::new();
        for entry in &self.entries {
            if !is_ident(&entry.name) {
                return Err(schema_error(format!("invalid option name '{}'", entry.name)));
            }
            let default = instantiate_value(&entry.value)
                .map_err(|e| schema_error(format!("{}: {}", entry.name, e.msg)))?;
            scope.insert(ConfOption::new(entry.name.as_str(), entry.comment.as_str(), default))?;
        }
        Ok(scope)
    }
}

pub(crate) fn is_ident(name: &str) -> bool {
    static RE_IDENT: Lazy<Regex> = Lazy::new(|| {
        let re = r"^[_A-Za-z][-_0-9A-Za-z]*$";
        Regex::new(re).expect("could not compile RE_IDENT regexp")
    });
    RE_IDENT.is_match(name)
}

fn schema_error(msg: String) -> Error {
    Error::bare(ErrorKind::Schema, msg)
}

fn scalar(v: &OutlineValue) -> Option<Value> {
    match v {
        OutlineValue::Bool(b) => Some(Value::Bool(*b)),
        OutlineValue::Long(n) => Some(Value::Long(*n)),
        OutlineValue::Double(n) => Some(Value::Double(*n)),
        OutlineValue::Text(s) => Some(Value::Text(s.clone())),
        OutlineValue::Compound(_) | OutlineValue::Array(_) => None,
    }
}

fn instantiate_value(v: &OutlineValue) -> Result<Value> {
    match v {
        OutlineValue::Compound(outline) => Ok(Value::Compound(outline.instantiate()?)),
        OutlineValue::Array(array) => {
            let proto = prototype(&array.elem)?;
            let mut value = ArrayValue::new(proto);
            let items = array
                .items
                .iter()
                .map(|item| conform(&value.new_element(), item))
                .collect::<Result<Vec<_>>>()?;
            value.set_items(items);
            Ok(Value::Array(value))
        }
        _ => scalar(v).ok_or_else(|| schema_error(format!("unsupported default {:?}", v))),
    }
}

// The value every new array element is copied from.
fn prototype(elem: &Elem) -> Result<Value> {
    match elem {
        Elem::Compound(template) => Ok(Value::Compound(template.instantiate()?)),
        Elem::Array(inner) => Ok(Value::Array(ArrayValue::new(prototype(inner)?))),
        _ => zero_of(&elem.to_type())
            .ok_or_else(|| schema_error(format!("unsupported element type {}", elem.to_type()))),
    }
}

// Shape a declared item like `expected`: a template copy for compounds,
// an array sharing the same prototype for nested arrays.
fn conform(expected: &Value, item: &OutlineValue) -> Result<Value> {
    match (expected, item) {
        (Value::Compound(template), OutlineValue::Compound(patch)) => {
            let mut scope = template.clone();
            for entry in patch.entries() {
                let opt = scope.find_mut(&entry.name).ok_or_else(|| {
                    schema_error(format!("template has no option '{}'", entry.name))
                })?;
                let default = conform(opt.default(), &entry.value)?;
                opt.set_default(default);
            }
            Ok(Value::Compound(scope))
        }
        (Value::Array(proto), OutlineValue::Array(array)) => {
            if array.elem.to_type() != proto.elem_type() {
                return Err(schema_error(format!(
                    "item of type array<{}> does not match array<{}>",
                    array.elem.to_type(),
                    proto.elem_type()
                )));
            }
            let mut value = proto.clone();
            let items = array
                .items
                .iter()
                .map(|item| conform(&proto.new_element(), item))
                .collect::<Result<Vec<_>>>()?;
            value.set_items(items);
            Ok(Value::Array(value))
        }
        _ => match scalar(item) {
            Some(v) if v.type_of() == expected.type_of() => Ok(v),
            _ => Err(schema_error(format!(
                "default of type {} does not match {}",
                outline_type(item),
                expected.type_of()
            ))),
        },
    }
}

fn outline_type(v: &OutlineValue) -> Type {
    match v {
        OutlineValue::Bool(_) => Type::Bool,
        OutlineValue::Long(_) => Type::Long,
        OutlineValue::Double(_) => Type::Double,
        OutlineValue::Text(_) => Type::Text,
        OutlineValue::Compound(_) => Type::Compound,
        OutlineValue::Array(a) => Type::Array(Box::new(a.elem.to_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiate_copies_defaults() {
        let scope = Outline::new()
            .long("count", "how many", 3)
            .compound("outer", "", Outline::new().long("inner", "", 5))
            .instantiate()
            .unwrap();
        let count = scope.find("count").unwrap();
        assert_eq!(count.value(), count.default());
        assert_eq!(count.comment(), "how many");
        assert_eq!(scope.lookup("outer.inner").unwrap().value(), &Value::Long(5));
    }

    #[test]
    fn invalid_names() {
        for name in &["", "a.b", "has space", "9lives", "x=y"] {
            let err = Outline::new().long(*name, "", 1).instantiate().unwrap_err();
            assert_eq!(err.kind, ErrorKind::Schema, "name {:?}", name);
        }
        assert!(Outline::new().long("dash-ok_1", "", 1).instantiate().is_ok());
    }

    #[test]
    fn duplicate_name_in_compound() {
        let err = Outline::new()
            .compound("c", "", Outline::new().bool("x", "", true).long("x", "", 1))
            .instantiate()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);
        assert!(err.msg.contains("duplicate"));
    }

    #[test]
    fn array_defaults_checked() {
        let err = Outline::new()
            .array("a", "", ArrayOutline::new(Elem::Long).item("text"))
            .instantiate()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);

        let scope = Outline::new()
            .array(
                "matrix",
                "",
                ArrayOutline::new(Elem::Array(Box::new(Elem::Long)))
                    .item(ArrayOutline::new(Elem::Long).items(vec![1i64, 2]))
                    .item(ArrayOutline::new(Elem::Long).item(3i64)),
            )
            .instantiate()
            .unwrap();
        let matrix = scope.find("matrix").unwrap().value().as_array().unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.get(0).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn compound_items_patch_template() {
        let template = Outline::new().long("port", "", 80).text("host", "", "localhost");
        let scope = Outline::new()
            .array(
                "servers",
                "",
                ArrayOutline::new(Elem::Compound(template))
                    .item(Outline::new().long("port", "", 8080))
                    .item(Outline::new()),
            )
            .instantiate()
            .unwrap();
        let servers = scope.find("servers").unwrap().default().as_array().unwrap();
        let first = servers.get(0).unwrap().as_compound().unwrap();
        assert_eq!(first.find("port").unwrap().default(), &Value::Long(8080));
        assert_eq!(first.find("host").unwrap().default().as_str(), Some("localhost"));
        let second = servers.get(1).unwrap().as_compound().unwrap();
        assert_eq!(second.find("port").unwrap().value(), &Value::Long(80));
        let template = servers.template().unwrap();
        assert_eq!(template.find("port").unwrap().default(), &Value::Long(80));

        let err = Outline::new()
            .array(
                "servers",
                "",
                ArrayOutline::new(Elem::Compound(Outline::new().long("port", "", 80)))
                    .item(Outline::new().long("nope", "", 1)),
            )
            .instantiate()
            .unwrap_err();
        assert!(err.msg.contains("template has no option 'nope'"));
    }
}
