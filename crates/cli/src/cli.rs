use crate::tracing::LogLevel;
use ci_dispatch_core::dispatch::DEFAULT_CONDA_BIN;
use ci_dispatch_core::os::DEFAULT_OS_VAR;
use ci_dispatch_core::runner::DEFAULT_SCRIPT;
use ci_dispatch_core::whitelist::DEFAULT_WHITELIST;
use ci_dispatch_core::{DispatchConfig, Dispatcher, Environment, Outcome};
use clap::Parser;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Successful exit code
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(ci_dispatch::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The dispatcher itself failed; the exit code comes from the error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dispatch(#[from] ci_dispatch_core::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Map an error to the process exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Dispatch(e) => e.exit_code(),
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match &err {
                CliError::Config { .. } => "config",
                CliError::Dispatch(_) => "dispatch",
            },
            "exit_code": exit_code_for(&err),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error: {err}"),
        }
    } else {
        eprintln!("{:?}", miette::Report::new(err));
    }
}

/// Print the outcome envelope in JSON mode
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_outcome(outcome: &Outcome, json_mode: bool) {
    if !json_mode {
        return;
    }
    match serde_json::to_string(&OkEnvelope::new(outcome)) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize outcome: {e}"),
    }
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ci-dispatch")]
#[command(
    about = "Run the test suite on Linux CI workers; prepare the toolchain PATH everywhere else"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        value_name = "NAME",
        help = "Use this OS name instead of reading --os-var from the environment"
    )]
    pub os_name: Option<String>,

    #[arg(
        long,
        value_name = "VAR",
        env = "CI_DISPATCH_OS_VAR",
        default_value = DEFAULT_OS_VAR,
        help = "Environment variable naming the build OS"
    )]
    pub os_var: String,

    #[arg(
        long,
        value_name = "PATH",
        env = "CI_DISPATCH_SCRIPT",
        default_value = DEFAULT_SCRIPT,
        help = "Test runner to execute on Linux, relative to the working directory"
    )]
    pub script: PathBuf,

    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        env = "CI_DISPATCH_WORKING_DIR",
        default_value = ".",
        help = "Directory holding the test runner and package whitelist"
    )]
    pub working_dir: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        env = "CI_DISPATCH_CONDA_BIN",
        default_value = DEFAULT_CONDA_BIN,
        help = "Directory prepended to PATH on non-Linux builds"
    )]
    pub conda_bin: String,

    #[arg(
        long,
        value_name = "PATH",
        env = "CI_DISPATCH_WHITELIST",
        default_value = DEFAULT_WHITELIST,
        help = "Package whitelist, relative to the working directory"
    )]
    pub whitelist: PathBuf,

    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, help = "Output logs and the dispatch outcome in JSON format")]
    pub json: bool,
}

impl Cli {
    /// Validate the arguments and build the dispatcher settings
    pub fn to_config(&self) -> Result<DispatchConfig, CliError> {
        if self.os_var.is_empty() || self.os_var.contains('=') || self.os_var.contains('\0') {
            return Err(CliError::config_with_help(
                format!("invalid OS variable name '{}'", self.os_var),
                "Pass a plain variable name such as TRAVIS_OS_NAME",
            ));
        }

        if !self.working_dir.is_dir() {
            return Err(CliError::config_with_help(
                format!(
                    "working directory '{}' does not exist or is not a directory",
                    self.working_dir.display()
                ),
                "Pass an existing directory with --working-dir",
            ));
        }

        Ok(DispatchConfig {
            os_var: self.os_var.clone(),
            script: self.script.clone(),
            working_dir: self.working_dir.clone(),
            conda_bin: self.conda_bin.clone(),
            whitelist: self.whitelist.clone(),
        })
    }

    /// Run the dispatcher against `env`.
    ///
    /// `--os-name` is written into `env` first, so the test runner sees the
    /// same value the branch was chosen on.
    pub fn dispatch(&self, mut env: Environment) -> Result<Outcome, CliError> {
        let config = self.to_config()?;
        if let Some(os_name) = &self.os_name {
            env.set(config.os_var.clone(), os_name.clone());
        }
        Ok(Dispatcher::new(config).run(&mut env)?)
    }
}

/// Parse process arguments
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLI_ENV_VARS: [&str; 5] = [
        "CI_DISPATCH_OS_VAR",
        "CI_DISPATCH_SCRIPT",
        "CI_DISPATCH_WORKING_DIR",
        "CI_DISPATCH_CONDA_BIN",
        "CI_DISPATCH_WHITELIST",
    ];

    fn parse_clean(args: &[&str]) -> Result<Cli, clap::Error> {
        temp_env::with_vars_unset(CLI_ENV_VARS, || Cli::try_parse_from(args))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = parse_clean(&["ci-dispatch"]).unwrap();

        assert_eq!(cli.os_name, None);
        assert_eq!(cli.os_var, "TRAVIS_OS_NAME");
        assert_eq!(cli.script, PathBuf::from("run_tests_travis.sh"));
        assert_eq!(cli.working_dir, PathBuf::from("."));
        assert_eq!(cli.conda_bin, "/anaconda/bin");
        assert_eq!(cli.whitelist, PathBuf::from("osx-whitelist.txt"));
        assert_eq!(cli.level, LogLevel::Warn);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = parse_clean(&[
            "ci-dispatch",
            "--os-name",
            "osx",
            "--os-var",
            "BUILD_OS",
            "--script",
            "ci/test.sh",
            "-C",
            "/tmp",
            "--conda-bin",
            "/opt/conda/bin",
            "--whitelist",
            "packages.txt",
            "-l",
            "debug",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.os_name.as_deref(), Some("osx"));
        assert_eq!(cli.os_var, "BUILD_OS");
        assert_eq!(cli.script, PathBuf::from("ci/test.sh"));
        assert_eq!(cli.working_dir, PathBuf::from("/tmp"));
        assert_eq!(cli.conda_bin, "/opt/conda/bin");
        assert_eq!(cli.whitelist, PathBuf::from("packages.txt"));
        assert_eq!(cli.level, LogLevel::Debug);
        assert!(cli.json);
    }

    #[test]
    fn test_cli_empty_os_name_is_accepted() {
        let cli = parse_clean(&["ci-dispatch", "--os-name", ""]).unwrap();
        assert_eq!(cli.os_name.as_deref(), Some(""));
    }

    #[test]
    fn test_cli_env_fallbacks() {
        let cli = temp_env::with_vars(
            [
                ("CI_DISPATCH_SCRIPT", Some("ci/run.sh")),
                ("CI_DISPATCH_CONDA_BIN", Some("/opt/miniconda/bin")),
                ("CI_DISPATCH_OS_VAR", Some("RUNNER_OS")),
            ],
            || Cli::try_parse_from(["ci-dispatch"]),
        )
        .unwrap();

        assert_eq!(cli.script, PathBuf::from("ci/run.sh"));
        assert_eq!(cli.conda_bin, "/opt/miniconda/bin");
        assert_eq!(cli.os_var, "RUNNER_OS");
    }

    #[test]
    fn test_cli_flag_beats_env() {
        let cli = temp_env::with_var("CI_DISPATCH_SCRIPT", Some("from-env.sh"), || {
            Cli::try_parse_from(["ci-dispatch", "--script", "from-flag.sh"])
        })
        .unwrap();
        assert_eq!(cli.script, PathBuf::from("from-flag.sh"));
    }

    #[test]
    fn test_invalid_log_level() {
        let result = parse_clean(&["ci-dispatch", "--level", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_positional_arguments_rejected() {
        let result = parse_clean(&["ci-dispatch", "extra"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag() {
        let err = parse_clean(&["ci-dispatch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_to_config() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse_clean(&["ci-dispatch", "-C", dir]).unwrap();

        let config = cli.to_config().unwrap();
        assert_eq!(config.working_dir, temp_dir.path());
        assert_eq!(config.os_var, "TRAVIS_OS_NAME");
    }

    #[test]
    fn test_to_config_rejects_bad_os_var() {
        for var in ["", "A=B"] {
            let cli = parse_clean(&["ci-dispatch", "--os-var", var]).unwrap();
            let err = cli.to_config().unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
            assert_eq!(exit_code_for(&err), EXIT_CLI);
        }
    }

    #[test]
    fn test_to_config_rejects_missing_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let cli = parse_clean(&["ci-dispatch", "-C", missing.to_str().unwrap()]).unwrap();

        let err = cli.to_config().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(exit_code_for(&err), EXIT_CLI);
    }

    #[test]
    fn test_dispatch_os_name_override() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse_clean(&["ci-dispatch", "-C", dir, "--os-name", "osx"]).unwrap();

        let env: Environment = [("TRAVIS_OS_NAME", "linux"), ("PATH", "/bin")]
            .into_iter()
            .collect();
        let outcome = cli.dispatch(env).unwrap();

        assert_eq!(
            outcome,
            Outcome::PathPrepared {
                path: "/anaconda/bin:/bin".to_string(),
                whitelist: None,
            }
        );
    }

    #[test]
    fn test_dispatch_error_keeps_core_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse_clean(&["ci-dispatch", "-C", dir, "--os-name", "linux"]).unwrap();

        let err = cli.dispatch(Environment::new()).unwrap_err();
        assert!(matches!(err, CliError::Dispatch(_)));
        assert_eq!(exit_code_for(&err), 127);
    }

    #[test]
    fn test_envelopes() {
        let envelope = OkEnvelope::new("data");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"data\":\"data\""));

        let envelope = ErrorEnvelope::new("boom");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"error\":\"boom\""));
    }

    #[test]
    fn test_config_error_display() {
        let err = CliError::config_with_help("bad input", "try this");
        assert!(err.to_string().contains("CLI/configuration error"));
        assert!(err.to_string().contains("bad input"));
        assert_eq!(exit_code_for(&err), EXIT_CLI);
        assert_eq!(EXIT_OK, 0);
    }
}
