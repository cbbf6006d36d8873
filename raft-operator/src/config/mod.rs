use super::*;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod schema;
mod source;
pub use schema::{AgentConfig, Ports};

/// A configuration problem and where it comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedError {
    /// `None` if the problem is in the merged result rather than in one file.
    pub file: Option<PathBuf>,
    /// Line and column, both 1-based.
    pub position: Option<(usize, usize)>,
    pub key: Option<String>,
    pub message: String,
}

impl LocatedError {
    fn in_file(file: &Path, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.to_path_buf()),
            position: None,
            key: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for LocatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}", file.display())?,
            None => write!(f, "<merged>")?,
        }
        if let Some((line, column)) = self.position {
            write!(f, ":{line}:{column}")?;
        }
        write!(f, ": ")?;
        if let Some(key) = &self.key {
            write!(f, "{key}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

/// Every problem found in a set of configuration sources.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Deref)]
pub struct ValidationErrors(Vec<LocatedError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Builds an agent configuration from files and directories.
///
/// Directories contribute their `*.json` files in alphabetical order.
/// Sources are merged in the given order and later sources win on conflicting keys.
pub struct Builder {
    sources: Vec<PathBuf>,
}

impl Builder {
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Read and merge all sources without checking them against the schema.
    pub fn merge(&self) -> Result<MergedConfig> {
        if self.sources.is_empty() {
            return Err(Error::InvalidRequest(
                "must specify at least one config file or directory".to_string(),
            ));
        }

        let mut errors = vec![];
        let files = source::expand(&self.sources, &mut errors);
        let mut merged = MergedConfig::default();
        for file in files {
            match source::load(&file) {
                Ok(object) => merged.apply(file, object),
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(ValidationErrors(errors).into());
        }
        debug!("merged {} config files", merged.files.len());
        Ok(merged)
    }

    pub fn build_and_validate(&self) -> Result<AgentConfig> {
        self.merge()?.validate()
    }
}

/// Result of merging configuration sources.
#[derive(Clone, Debug, Default)]
pub struct MergedConfig {
    value: Map<String, Value>,
    /// The file that last defined each top-level key.
    origins: HashMap<String, PathBuf>,
    files: Vec<PathBuf>,
}

impl MergedConfig {
    fn apply(&mut self, file: PathBuf, object: Map<String, Value>) {
        for key in object.keys() {
            self.origins.insert(key.clone(), file.clone());
        }
        merge_objects(&mut self.value, object);
        self.files.push(file);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Files in the order they were merged.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn origin(&self, key: &str) -> Option<&Path> {
        let top = key.split('.').next()?;
        self.origins.get(top).map(PathBuf::as_path)
    }

    fn locate(&self, key: &str, message: impl Into<String>) -> LocatedError {
        LocatedError {
            file: self.origin(key).map(Path::to_path_buf),
            position: None,
            key: Some(key.to_string()),
            message: message.into(),
        }
    }

    /// Check the merged configuration against the agent schema.
    pub fn validate(self) -> Result<AgentConfig> {
        let config: AgentConfig = serde_json::from_value(Value::Object(self.value.clone()))
            .map_err(|e| {
                ValidationErrors(vec![LocatedError {
                    file: None,
                    position: None,
                    key: None,
                    message: e.to_string(),
                }])
            })?;

        let mut errors = vec![];
        for key in config.unknown_keys() {
            errors.push(self.locate(key, "unknown configuration key"));
        }
        for (key, message) in config.check() {
            errors.push(self.locate(key, message));
        }
        if !errors.is_empty() {
            return Err(ValidationErrors(errors).into());
        }
        Ok(config)
    }
}

/// Nested objects merge key by key. Any other value is replaced by the later one.
fn merge_objects(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, value) in src {
        match (dst.get_mut(&key), value) {
            (Some(Value::Object(dst)), Value::Object(src)) => merge_objects(dst, src),
            (_, value) => {
                dst.insert(key, value);
            }
        }
    }
}
