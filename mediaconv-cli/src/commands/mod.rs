//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `convert` command.
pub mod convert;

/// Module containing the implementation of the `check` command.
pub mod check;
