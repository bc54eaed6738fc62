//! Environment handed to the dispatcher and inherited by the test runner

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};

/// Name of the executable search path variable
pub const PATH_VAR: &str = "PATH";

/// An owned set of environment variables.
///
/// Names and values are kept as raw `OsString`s so nothing from the host is
/// lost on the way to the child. The dispatcher never mutates the process
/// environment; branch side effects such as the `PATH` prefix land here and
/// are passed to the child verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Map of environment variable names to values, ordered by name
    pub vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Create a new empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment, including entries that are
    /// not valid UTF-8.
    #[must_use]
    pub fn from_system() -> Self {
        Self {
            vars: env::vars_os().collect(),
        }
    }

    /// Get a raw environment variable value
    #[must_use]
    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(|v| v.as_os_str())
    }

    /// Get an environment variable value, if it is valid UTF-8
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    /// Set an environment variable
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Remove an environment variable, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<OsString> {
        self.vars.remove(OsStr::new(key))
    }

    /// Check if an environment variable exists
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(OsStr::new(key))
    }

    /// Iterate over all variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Put `dir` in front of `PATH` and return the new value.
    ///
    /// The existing `PATH` is kept byte for byte. An unset or empty `PATH`
    /// becomes just `dir`.
    pub fn prepend_path(&mut self, dir: &str) -> OsString {
        let mut new_path = OsString::from(dir);
        if let Some(current) = self.get_os(PATH_VAR)
            && !current.is_empty()
        {
            new_path.push(":");
            new_path.push(current);
        }
        self.set(PATH_VAR, new_path.clone());
        new_path
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
