// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! Environment-driven CI dispatch.
//!
//! The dispatcher reads one variable (`TRAVIS_OS_NAME` by default) from an
//! [`Environment`] and takes one of two branches:
//!
//! - `"linux"`: run `run_tests_travis.sh` from the working directory and report
//!   its exit code verbatim.
//! - anything else, including unset or empty: put `/anaconda/bin` in front of
//!   `PATH` and exit 0. Nothing is executed.
//!
//! ```no_run
//! use ci_dispatch_core::{Dispatcher, Environment};
//!
//! let mut env = Environment::from_system();
//! let outcome = Dispatcher::default().run(&mut env)?;
//! std::process::exit(outcome.exit_code());
//! # Ok::<(), ci_dispatch_core::Error>(())
//! ```

pub mod dispatch;
pub mod environment;
pub mod error;
pub mod os;
pub mod runner;
pub mod whitelist;

pub use dispatch::{DispatchConfig, Dispatcher, Outcome};
pub use environment::Environment;
pub use error::{Error, Result};
pub use os::TargetOs;
