//! Command-line engine: typed flags, a declarative command tree and the
//! parser that walks it.
//!
//! # Flow
//!
//! ```text
//! argv ─▶ Token ─▶ global flags ─▶ InitCmd ─▶ command descent ─▶ checks
//!                                    │                              │
//!                                    ▼                              ▼
//!                             config + logging            Context (flags, args)
//!                                                                   │
//!                                                                   ▼
//!                                              client creation ─▶ action ─▶ save
//! ```
//!
//! # Module Structure
//!
//! - [`token`] - cursor over the argument vector
//! - [`flag`] - String/Bool/Int64 flag values and help rendering
//! - [`command`] - [`App`] and [`Command`] blueprints
//! - [`context`] - parse result handed to actions
//! - [`parser`] - global flags, descent and post-parse checks
//! - [`validation`] - pairwise option constraints
//! - [`previous_args`] - host/service/path/token memory
//! - [`help`] / [`completion`] - help pages and bash completion hints
//! - [`dispatch`] - [`App::run`] / [`App::parse`] and client creation
//! - [`entrypoint`] - process-level wrapper used by the binary

pub mod command;
pub mod common_flags;
pub mod completion;
pub mod context;
pub mod dispatch;
pub mod entrypoint;
pub mod flag;
pub mod help;
pub(crate) mod init;
pub(crate) mod parser;
pub mod previous_args;
pub mod token;
pub mod validation;

pub use command::{ActionFn, App, Command};
pub use completion::BASH_COMPLETION;
pub use context::{Args, Context};
pub use flag::{BoolFlag, Flag, Int64Flag, StringFlag};
pub use token::Token;
pub use validation::{ValidationFlag, ValidationMode};
