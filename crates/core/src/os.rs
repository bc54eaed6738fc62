//! Target operating system selection from the CI environment

use crate::environment::Environment;
use std::fmt;

/// Variable the CI platform uses to announce the build OS
pub const DEFAULT_OS_VAR: &str = "TRAVIS_OS_NAME";

/// The only value that selects the test branch
pub const LINUX: &str = "linux";

/// Which branch the dispatcher takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOs {
    /// The variable is exactly `"linux"`
    Linux,
    /// Anything else, with the raw value (`None` when unset)
    Other(Option<String>),
}

impl TargetOs {
    /// Read `var` from `env` and classify it.
    #[must_use]
    pub fn detect(env: &Environment, var: &str) -> Self {
        let value = env.get_os(var).map(|v| v.to_string_lossy());
        Self::from_value(value.as_deref())
    }

    /// Classify a raw value. Comparison is an exact string match: no trimming,
    /// no case folding, and an empty value is not `linux`.
    #[must_use]
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(LINUX) => Self::Linux,
            other => Self::Other(other.map(ToString::to_string)),
        }
    }

    /// Whether this target runs the test suite
    #[must_use]
    pub const fn runs_tests(&self) -> bool {
        matches!(self, Self::Linux)
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => f.write_str(LINUX),
            Self::Other(Some(value)) => write!(f, "{value:?}"),
            Self::Other(None) => f.write_str("<unset>"),
        }
    }
}
