//! The CI dispatcher: pick a branch from the environment and act on it

use crate::environment::Environment;
use crate::os::{DEFAULT_OS_VAR, TargetOs};
use crate::runner::{self, DEFAULT_SCRIPT};
use crate::whitelist::{self, DEFAULT_WHITELIST};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Toolchain directory put in front of `PATH` on non-Linux builds
pub const DEFAULT_CONDA_BIN: &str = "/anaconda/bin";

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Environment variable that names the build OS
    pub os_var: String,
    /// Test runner, relative to `working_dir` unless absolute
    pub script: PathBuf,
    /// Directory the runner is executed in and the whitelist is read from
    pub working_dir: PathBuf,
    /// Directory prepended to `PATH` on the non-Linux branch
    pub conda_bin: String,
    /// Package whitelist, relative to `working_dir` unless absolute
    pub whitelist: PathBuf,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            os_var: DEFAULT_OS_VAR.to_string(),
            script: PathBuf::from(DEFAULT_SCRIPT),
            working_dir: PathBuf::from("."),
            conda_bin: DEFAULT_CONDA_BIN.to_string(),
            whitelist: PathBuf::from(DEFAULT_WHITELIST),
        }
    }
}

/// What a dispatch did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum Outcome {
    /// The test runner was executed
    TestsRan {
        /// Absolute path of the script that ran
        script: PathBuf,
        /// Its exit code
        exit_code: i32,
    },
    /// `PATH` was prefixed; nothing was executed
    PathPrepared {
        /// The resulting `PATH`, lossily converted for reporting
        path: String,
        /// Packages named by the whitelist, if one exists
        #[serde(skip_serializing_if = "Option::is_none")]
        whitelist: Option<Vec<String>>,
    },
}

impl Outcome {
    /// Exit code the dispatcher should terminate with
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TestsRan { exit_code, .. } => *exit_code,
            Self::PathPrepared { .. } => 0,
        }
    }

    /// Whether the dispatch counts as a success
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code() == 0
    }
}

/// Single-shot, stateless CI dispatcher
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the given settings
    #[must_use]
    pub const fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// The settings this dispatcher runs with
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Classify `env` and run the matching branch.
    ///
    /// On the Linux branch the test runner inherits `env`. On every other
    /// branch `env` comes back with the toolchain directory in front of `PATH`.
    pub fn run(&self, env: &mut Environment) -> Result<Outcome> {
        let target = TargetOs::detect(env, &self.config.os_var);
        debug!(os_var = %self.config.os_var, target = %target, "Selected dispatch branch");

        if target.runs_tests() {
            self.run_tests(env)
        } else {
            Ok(self.prepare_path(env))
        }
    }

    fn run_tests(&self, env: &Environment) -> Result<Outcome> {
        let script = runner::resolve_script(&self.config.working_dir, &self.config.script)?;
        let exit_code = runner::run_script(&script, &self.config.working_dir, env)?;
        if exit_code != 0 {
            warn!(script = %script.display(), exit_code, "Test runner failed");
        }
        Ok(Outcome::TestsRan { script, exit_code })
    }

    fn prepare_path(&self, env: &mut Environment) -> Outcome {
        let path = env.prepend_path(&self.config.conda_bin).to_string_lossy().into_owned();
        info!(conda_bin = %self.config.conda_bin, "Prepended toolchain directory to PATH");

        // The packaging step is disabled; only report what it would build.
        let whitelist_path = self.config.working_dir.join(&self.config.whitelist);
        let whitelist = match whitelist::load(&whitelist_path) {
            Ok(Some(packages)) => {
                debug!(
                    whitelist = %whitelist_path.display(),
                    packages = %packages.join(" "),
                    "Package build disabled; skipping whitelisted packages"
                );
                Some(packages)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable package whitelist");
                None
            }
        };

        Outcome::PathPrepared { path, whitelist }
    }
}
