//! Command-line parser.
//!
//! Turns the raw argument vector into the leaf [`Command`](super::command::Command)
//! to run plus its [`Context`](super::context::Context).
//!
//! # Module Structure
//!
//! - [`core`] - Parse driver: global flags, session init, command descent
//! - [`helpers`] - Option splitting, flag application, command lookup and suggestions
//! - [`checks`] - Required, empty and choice checks run after the tokens are consumed
//!
//! # Phases
//!
//! 1. Global flags, up to the first non-option token (the command name).
//! 2. Command descent: option tokens apply to the flags accumulated so far,
//!    other tokens select subcommands or, at a leaf, become positional args.
//! 3. Checks: required flags (positional shorthand and previous args),
//!    empty values, pairwise validation, then choices. The first failing
//!    category aborts the parse.

mod checks;
mod core;
mod helpers;

pub(crate) use core::ngsi_run;
