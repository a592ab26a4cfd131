//! secstruct CLI - command-line front end for the filing pipeline.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command, DetectArgs, ProcessArgs, ProviderKind, SplitArgs};
