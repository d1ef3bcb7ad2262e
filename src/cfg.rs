use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::de::ScopeDeserializer;
use crate::diag::Diagnostics;
use crate::error::{Error, ErrorKind, Result};
use crate::gen::Generator;
use crate::include::{preprocess, read_file};
use crate::outline::Outline;
use crate::parser::Parser;
use crate::scanner::Mode;
use crate::scope::{ConfOption, Scope};
use crate::typed::FromValue;
use crate::value::Value;

/// Builder for a [`Config`].
///
/// ```no_run
/// use libconf::{Builder, Mode, Outline};
///
/// let outline = Outline::new().long("workers", "Worker threads", 4);
/// let mut config = Builder::new()
///     .mode(Mode::Slash)
///     .name("main")
///     .build("/etc/app.conf", &outline)?;
/// for diag in &config.load() {
///     eprintln!("{}", diag);
/// }
/// let workers: i64 = config.get_as("workers").unwrap();
/// # Ok::<(), libconf::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct Builder {
    mode: Mode,
    name: Option<String>,
}

impl Builder {
    /// Create a new builder.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Comment syntax of the config file. Default is `Mode::Hash`.
    pub fn mode(mut self, mode: Mode) -> Builder {
        self.mode = mode;
        self
    }

    /// Name of the configuration, for hosts that keep several.
    pub fn name(mut self, name: impl Into<String>) -> Builder {
        self.name = Some(name.into());
        self
    }

    /// Bind `file` to a fresh instance of `outline`.
    pub fn build(self, file: impl Into<PathBuf>, outline: &Outline) -> Result<Config> {
        let root = outline.instantiate()?;
        let file = file.into();
        debug!("config {:?}: {} options", file, root.option_count());
        Ok(Config {
            file,
            name: self.name,
            mode: self.mode,
            root,
        })
    }
}

/// A configuration file bound to its schema.
///
/// Every option starts out at its default. `load` overwrites what the
/// file assigns; the getters read current values by dotted path.
#[derive(Debug, Clone)]
pub struct Config {
    file: PathBuf,
    name: Option<String>,
    mode: Mode,
    root: Scope,
}

impl Config {
    /// Same as `Builder::new().build(file, outline)`.
    pub fn new(file: impl Into<PathBuf>, outline: &Outline) -> Result<Config> {
        Builder::new().build(file, outline)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// Load the file this configuration is bound to.
    pub fn load(&mut self) -> Diagnostics {
        let file = self.file.clone();
        self.load_file(file)
    }

    /// Load `path`. Values are reset to their defaults first. If the
    /// file can not be read, the current values are left alone.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Diagnostics {
        let path = path.as_ref();
        match read_file(path) {
            Ok(text) => self.load_str(&text, &path.to_string_lossy()),
            Err(e) => {
                let mut diags = Diagnostics::new();
                diags.push(e);
                diags
            }
        }
    }

    /// Load configuration text. `source_name` is used in diagnostics and
    /// as the base for relative includes.
    pub fn load_str(&mut self, text: &str, source_name: &str) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.root.reset();
        let pp = preprocess(text, source_name, &mut diags);
        Parser::new(&pp.text, self.mode, &pp.map, &mut diags).parse(&mut self.root);
        debug!("{}: loaded, {} diagnostics", source_name, diags.len());
        diags
    }

    /// Copy every default back into its current value.
    pub fn reset(&mut self) {
        self.root.reset();
    }

    /// Find an option by dotted path.
    pub fn lookup(&self, path: &str) -> Result<&ConfOption> {
        self.root.lookup(path).map_err(|e| self.in_file(e))
    }

    /// Current value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        match self.lookup(path) {
            Ok(opt) => Some(opt.value()),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    /// Current value converted to `T`. `None` if the path does not
    /// exist or the option has another type.
    pub fn get_as<T: FromValue>(&self, path: &str) -> Option<T> {
        match self.value_as(path) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    /// Like `get_as`, but says why the value is not there.
    pub fn value_as<T: FromValue>(&self, path: &str) -> Result<T> {
        let value = self.lookup(path)?.value();
        T::from_value(value).ok_or_else(|| {
            let msg = if value.type_of() == T::conf_type() {
                format!("option '{}' is out of range", path)
            } else {
                format!("option '{}' is {}, can not be read as {}", path, value.type_of(), T::conf_type())
            };
            self.in_file(Error::bare(ErrorKind::Value, msg))
        })
    }

    /// Elements of the array at a dotted path.
    pub fn get_array(&self, path: &str) -> Option<&[Value]> {
        self.get(path).and_then(Value::as_array).map(|a| a.items())
    }

    /// Elements of the array at a dotted path, converted to `T`.
    pub fn get_array_as<T: FromValue>(&self, path: &str) -> Option<Vec<T>> {
        self.get_array(path)?.iter().map(T::from_value).collect()
    }

    /// Read the whole configuration into a struct.
    pub fn deserialize<T>(&self) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        T::deserialize(ScopeDeserializer::new(&self.root)).map_err(|e| self.in_file(e))
    }

    /// Text of a config file holding every declared default.
    pub fn generate_default(&self) -> Result<String> {
        Generator::generate(&self.root, self.mode).map_err(|e| self.in_file(e))
    }

    /// Write the defaults to the file this configuration is bound to.
    pub fn generate_default_file(&self) -> Result<()> {
        self.generate_default_file_to(&self.file)
    }

    /// Write the defaults to `path`.
    pub fn generate_default_file_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.generate_default()?;
        fs::write(path, text).map_err(|e| {
            Error::bare(ErrorKind::Resource, format!("{}: {}", path.to_string_lossy(), e))
        })?;
        debug!("wrote default config to {:?}", path);
        Ok(())
    }

    fn in_file(&self, e: Error) -> Error {
        e.in_file(self.file.to_string_lossy())
    }
}
