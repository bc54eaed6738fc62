// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! ci-dispatch CLI
//!
//! Thin command-line layer over [`ci_dispatch_core`]: flag and environment
//! configuration, tracing setup, and error rendering.

/// CLI argument parsing, exit codes and output envelopes.
pub mod cli;
/// Tracing initialization and span helpers.
pub mod tracing;
