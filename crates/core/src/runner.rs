//! Runs the external test-runner script and reports its exit status

use crate::environment::Environment;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Default test runner, relative to the working directory
pub const DEFAULT_SCRIPT: &str = "run_tests_travis.sh";

/// Resolve `script` against `working_dir` into an absolute path.
///
/// The path is made absolute so spawning does not depend on how the platform
/// combines a relative program with `current_dir`.
pub fn resolve_script(working_dir: &Path, script: &Path) -> Result<PathBuf> {
    let joined = working_dir.join(script);
    std::path::absolute(&joined)
        .map_err(|e| Error::io(e, Some(joined), "resolve test runner path"))
}

/// Run `script` with no arguments and return its exit code.
///
/// The child runs in `working_dir`, sees exactly `environment`, and inherits
/// stdio. This blocks until the child exits.
pub fn run_script(script: &Path, working_dir: &Path, environment: &Environment) -> Result<i32> {
    tracing::info!(script = %script.display(), cwd = %working_dir.display(), "Running test runner");

    let mut cmd = Command::new(script);
    cmd.current_dir(working_dir)
        .env_clear()
        .envs(environment.iter())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = cmd.status().map_err(|e| {
        tracing::debug!(error = %e, kind = ?e.kind(), "Test runner failed to start");
        Error::spawn(script, e)
    })?;

    let code = exit_code(status);
    tracing::info!(exit_code = code, "Test runner finished");
    Ok(code)
}

/// Exit code of a finished child, using the shell's `128 + signal` convention
/// for children killed by a signal.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    crate::error::EXIT_FAILURE
}
