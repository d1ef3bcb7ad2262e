use std::collections::HashMap;
use std::path::PathBuf;

use crate::cfg::{Builder, Config};
use crate::diag::Diagnostics;
use crate::error::{Error, ErrorKind, Result};
use crate::outline::Outline;
use crate::scanner::Mode;
use crate::value::Value;

/// Several named configurations, each bound to its own file and schema.
#[derive(Debug, Default)]
pub struct Registry {
    mode: Mode,
    configs: HashMap<String, Config>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Comment syntax for configurations created after this call.
    pub fn with_mode(mode: Mode) -> Registry {
        Registry {
            mode,
            configs: HashMap::new(),
        }
    }

    /// Create configuration `name` from `outline`, bound to `file`.
    pub fn init(&mut self, name: &str, file: impl Into<PathBuf>, outline: &Outline) -> Result<&mut Config> {
        if self.configs.contains_key(name) {
            return Err(Error::bare(
                ErrorKind::Schema,
                format!("configuration '{}' already exists", name),
            ));
        }
        let config = Builder::new().mode(self.mode).name(name).build(file, outline)?;
        debug!("registry: init {} -> {:?}", name, config.file());
        Ok(self.configs.entry(name.to_string()).or_insert(config))
    }

    /// Load the file bound to configuration `name`.
    pub fn load(&mut self, name: &str) -> Result<Diagnostics> {
        Ok(self.config_mut(name)?.load())
    }

    /// Current value of `path` in configuration `name`.
    pub fn get(&self, name: &str, path: &str) -> Option<&Value> {
        self.configs.get(name)?.get(path)
    }

    pub fn config(&self, name: &str) -> Result<&Config> {
        self.configs.get(name).ok_or_else(|| unknown(name))
    }

    pub fn config_mut(&mut self, name: &str) -> Result<&mut Config> {
        self.configs.get_mut(name).ok_or_else(|| unknown(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Config> {
        self.configs.remove(name)
    }

    pub fn clear(&mut self) {
        self.configs.clear();
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

fn unknown(name: &str) -> Error {
    Error::bare(ErrorKind::Lookup, format!("no configuration named '{}'", name))
}
