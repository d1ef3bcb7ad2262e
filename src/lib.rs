//! Schema-driven configuration files.
//!
//! The host declares every option up front as an [`Outline`]: name,
//! comment, type and default. A [`Config`] binds that schema to a file.
//! Loading the file assigns what it mentions and reports everything else
//! as [`Diagnostics`]; options the file leaves out keep their defaults.
//! The same schema can also write a commented default file that reads
//! back to exactly the declared defaults.
//!
//! ```text
//! # Listen port
//! port = 8080
//! server = {
//!     name = "www"
//!     aliases = ["web", 'www2']
//! }
//! #include "conf.d/*.conf"
//! ```
#[macro_use]
extern crate log;

mod cfg;
mod de;
mod diag;
mod error;
mod gen;
mod include;
mod outline;
mod parser;
mod registry;
mod scanner;
mod scope;
mod typed;
mod value;

pub use cfg::{Builder, Config};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, ErrorKind, Result};
pub use include::MAX_INCLUDE_DEPTH;
pub use outline::{ArrayOutline, Elem, Entry, Outline, OutlineValue};
pub use parser::MAX_NESTING;
pub use registry::Registry;
pub use scanner::{Mode, TokenPos};
pub use scope::{ConfOption, Scope};
pub use typed::FromValue;
pub use value::{ArrayValue, Type, Value};
