//! Auxiliary value providers.
//!
//! An auxiliary getter supplies a flat mapping of keys to optional values
//! from somewhere other than the process environment: a dotenv file, a
//! directory of secret files, or any custom callable. Getters are evaluated
//! in registration order on every resolution, so repeated resolutions see
//! live external state.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A flat mapping produced by one source, in source order.
///
/// A `None` value means the source explicitly has no value for the key.
pub type SourceMap = IndexMap<String, Option<String>>;

type GetterFn = dyn Fn() -> Result<SourceMap> + Send + Sync;

/// A registered auxiliary getter.
///
/// Arguments are bound into the closure at registration time, so every
/// getter is invoked the same way.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{AdditionalGetter, SourceMap};
///
/// let getter = AdditionalGetter::new("static", || {
///     let mut values = SourceMap::new();
///     values.insert("timeout".to_string(), Some("30".to_string()));
///     Ok(values)
/// });
///
/// let values = getter.invoke().unwrap();
/// assert_eq!(values["timeout"], Some("30".to_string()));
/// ```
#[derive(Clone)]
pub struct AdditionalGetter {
    name: String,
    invoke: Arc<GetterFn>,
}

impl AdditionalGetter {
    /// Register a custom getter under a diagnostic name.
    pub fn new<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> Result<SourceMap> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            invoke: Arc::new(getter),
        }
    }

    /// Getter reading a dotenv file. See [`read_env_file`].
    pub fn env_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(format!("env_file:{}", path.display()), move || {
            read_env_file(&path)
        })
    }

    /// Getter reading the dotenv file named by an environment variable.
    /// See [`read_env_file_from_named_env_var`].
    pub fn env_file_from_var(var: impl Into<String>) -> Self {
        let var = var.into();
        Self::new(format!("env_file_from_var:{var}"), move || {
            read_env_file_from_named_env_var(&var)
        })
    }

    /// Getter reading a secrets directory. See [`read_filesystem_directory`].
    pub fn secrets_dir(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(format!("secrets_dir:{}", path.display()), move || {
            read_filesystem_directory(&path)
        })
    }

    /// The diagnostic name of this getter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the getter.
    ///
    /// # Errors
    ///
    /// Returns whatever error the getter raises, unchanged.
    pub fn invoke(&self) -> Result<SourceMap> {
        (self.invoke)()
    }
}

impl fmt::Debug for AdditionalGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdditionalGetter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Read a dotenv file without exporting its variables.
///
/// Entries keep file order; variable substitution follows `dotenvy`.
///
/// # Errors
///
/// Returns [`Error::EnvFile`] if the file is missing, unreadable or
/// malformed.
pub fn read_env_file(path: &Path) -> Result<SourceMap> {
    let to_error = |source| Error::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let mut values = SourceMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_error)? {
        let (key, value) = item.map_err(to_error)?;
        values.insert(key, Some(value));
    }

    log::debug!("read {} entries from {}", values.len(), path.display());
    Ok(values)
}

/// Read the dotenv file whose path is stored in the environment variable `var`.
///
/// # Errors
///
/// Returns [`Error::MissingEnvVar`] if `var` is unset, otherwise the errors
/// of [`read_env_file`].
pub fn read_env_file_from_named_env_var(var: &str) -> Result<SourceMap> {
    let path = env::var_os(var).ok_or_else(|| Error::MissingEnvVar {
        name: var.to_string(),
    })?;
    read_env_file(Path::new(&path))
}

/// Read a secrets directory: one value per regular file.
///
/// Keys are file names, values the trimmed UTF-8 contents. A missing
/// directory yields an empty mapping. Sub-directories and files with
/// non-UTF-8 names are skipped. Entries are ordered by file name.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory listing or a file cannot be read.
pub fn read_filesystem_directory(directory: &Path) -> Result<SourceMap> {
    let mut values = SourceMap::new();
    if !directory.is_dir() {
        log::debug!("secrets directory {} not found", directory.display());
        return Ok(values);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            files.push((name, entry.path()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, path) in files {
        let contents = fs::read_to_string(&path)?;
        values.insert(name, Some(contents.trim().to_string()));
    }

    log::debug!(
        "read {} secrets from {}",
        values.len(),
        directory.display()
    );
    Ok(values)
}
