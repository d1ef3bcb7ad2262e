use std::collections::HashMap;
use std::slice;

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Type, Value};

/// One declared option: its default and its current value.
///
/// The current value starts out as an independent copy of the default
/// and is overwritten in place when a config file assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfOption {
    name: String,
    comment: String,
    default: Value,
    pub(crate) value: Value,
    pub(crate) line: u32,
}

impl ConfOption {
    pub(crate) fn new(name: impl Into<String>, comment: impl Into<String>, default: Value) -> ConfOption {
        ConfOption {
            name: name.into(),
            comment: comment.into(),
            value: default.clone(),
            default,
            line: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn type_of(&self) -> Type {
        self.default.type_of()
    }

    /// Source line of the last assignment, if the option was ever assigned.
    pub fn line(&self) -> Option<u32> {
        if self.line == 0 {
            None
        } else {
            Some(self.line)
        }
    }

    pub(crate) fn set(&mut self, value: Value, line: u32) {
        debug_assert_eq!(value.type_of(), self.type_of());
        self.value = value;
        self.line = line;
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default.clone();
        self.line = 0;
    }

    // Used by the outline to patch the defaults of array element templates.
    pub(crate) fn set_default(&mut self, default: Value) {
        self.value = default.clone();
        self.default = default;
    }
}

/// One nesting level of options: the top of a file, or the inside of a
/// compound. Names are unique within a scope. Iteration follows
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    index: HashMap<String, usize>,
    options: Vec<ConfOption>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    pub(crate) fn insert(&mut self, option: ConfOption) -> Result<()> {
        if self.index.contains_key(&option.name) {
            return Err(Error::bare(
                ErrorKind::Schema,
                format!("duplicate option name '{}'", option.name),
            ));
        }
        self.index.insert(option.name.clone(), self.options.len());
        self.options.push(option);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ConfOption> {
        self.index.get(name).map(|&idx| &self.options[idx])
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut ConfOption> {
        match self.index.get(name) {
            Some(&idx) => Some(&mut self.options[idx]),
            None => None,
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, ConfOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Number of options in this scope and every scope below it.
    pub fn option_count(&self) -> usize {
        self.options
            .iter()
            .map(|opt| 1 + opt.default.option_count())
            .sum()
    }

    /// Find an option by dotted path, e.g. `"server.tls.cert"`.
    ///
    /// Every segment but the last must name a compound option.
    pub fn lookup(&self, path: &str) -> Result<&ConfOption> {
        let mut scope = self;
        let mut rest = path;
        loop {
            let (name, tail) = match rest.split_once('.') {
                Some((name, tail)) => (name, Some(tail)),
                None => (rest, None),
            };
            let opt = scope.find(name).ok_or_else(|| {
                Error::bare(ErrorKind::Lookup, format!("option '{}' not found", path))
            })?;
            let tail = match tail {
                Some(tail) => tail,
                None => return Ok(opt),
            };
            match opt.value {
                Value::Compound(ref child) => {
                    scope = child;
                    rest = tail;
                }
                _ => {
                    return Err(Error::bare(
                        ErrorKind::Lookup,
                        format!("option '{}' is not a compound, cannot resolve '{}'", name, path),
                    ))
                }
            }
        }
    }

    /// Copy every default back into its current value.
    pub fn reset(&mut self) {
        self.options.iter_mut().for_each(ConfOption::reset);
    }
}

impl<'a> IntoIterator for &'a Scope {
    type Item = &'a ConfOption;
    type IntoIter = slice::Iter<'a, ConfOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
