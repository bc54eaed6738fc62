//! ci-dispatch binary
//!
//! Invoked by the CI platform with no arguments. Exits with the test runner's
//! status on Linux workers and 0 everywhere else.

// CLI binary needs to output to stderr - this is intentional
#![allow(clippy::print_stderr)]

use ci_dispatch::cli::{self, Cli, exit_code_for, render_error, render_outcome};
use ci_dispatch::command_span;
use ci_dispatch::tracing::{TracingConfig, TracingFormat, init_tracing};
use ci_dispatch_core::Environment;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Warning: {e}");
    }

    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let span = command_span!("dispatch", os_var = cli.os_var.as_str());
    let _guard = span.enter();

    match cli.dispatch(Environment::from_system()) {
        Ok(outcome) => {
            tracing::debug!(exit_code = outcome.exit_code(), "Dispatch finished");
            render_outcome(&outcome, cli.json);
            outcome.exit_code()
        }
        Err(err) => {
            let code = exit_code_for(&err);
            tracing::debug!(exit_code = code, "Dispatch failed");
            render_error(err, cli.json);
            code
        }
    }
}
