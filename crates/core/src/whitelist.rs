//! Package whitelist consumed by the (disabled) macOS packaging step

use crate::{Error, Result};
use std::path::Path;

/// Default whitelist file name, relative to the working directory
pub const DEFAULT_WHITELIST: &str = "osx-whitelist.txt";

/// Split whitelist contents into package names.
///
/// One name per line; surrounding whitespace and blank lines are dropped.
#[must_use]
pub fn parse(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Read the whitelist at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load(path: &Path) -> Result<Option<Vec<String>>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(parse(&contents))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(e, Some(path.to_path_buf()), "read package whitelist")),
    }
}
