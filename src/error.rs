use serde::de;
use std::fmt;

use crate::scanner::TokenPos;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, broadly.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Unterminated string, brace or bracket, malformed include, too deep.
    /// Parsing of the rest of the current buffer is abandoned.
    Structural,
    /// A literal that does not match the declared type.
    Value,
    /// Unknown option name, or a path segment that is not a compound.
    Lookup,
    /// File not found, unreadable, glob failure.
    Resource,
    /// Mistake in the schema declared by the host.
    Schema,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::Structural => "structural error",
            ErrorKind::Value => "value error",
            ErrorKind::Lookup => "lookup error",
            ErrorKind::Resource => "resource error",
            ErrorKind::Schema => "schema error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub pos: TokenPos,
    pub msg: String,
    pub file_name: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>, pos: TokenPos) -> Error {
        Error {
            kind,
            pos,
            msg: msg.into(),
            file_name: "config-text".to_string(),
        }
    }

    /// An error that is not tied to a position in a file.
    pub fn bare(kind: ErrorKind, msg: impl Into<String>) -> Error {
        Error::new(kind, msg, TokenPos::none())
    }

    pub(crate) fn in_file(mut self, file_name: impl Into<String>) -> Error {
        self.file_name = file_name.into();
        self
    }

    /// Source line, if the error has one.
    pub fn line(&self) -> Option<u32> {
        if self.pos.line == 0 {
            None
        } else {
            Some(self.pos.line)
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::bare(ErrorKind::Value, msg.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.line == 0 {
            write!(f, "{}: {}", self.file_name, self.msg)
        } else {
            write!(f, "{}:{}:{}: {}", self.file_name, self.pos.line, self.pos.column, self.msg)
        }
    }
}

impl std::error::Error for Error {}
