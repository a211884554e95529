//! # ngsi
//!
//! Command-line engine for FIWARE NGSI tooling: typed flags, nested command
//! trees, positional shorthand for required flags, remembered previous
//! arguments, help pages and bash completion.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use ngsi::cli::{App, Command, StringFlag};
//! use ngsi::config::MemoryStore;
//! use ngsi::session::Session;
//!
//! let app = App::new("ngsi", "0.13.0").command(
//!     Command::new("hello")
//!         .flag(StringFlag::new("name").alias("n"))
//!         .required_flags(&["name"])
//!         .action(|ctx, session, _client| {
//!             session.print(format!("hello {}\n", ctx.string("name")));
//!             Ok(())
//!         }),
//! );
//!
//! let mut session = Session::sink().with_store(MemoryStore::default());
//! let args: Vec<String> = ["ngsi", "hello", "world"].iter().map(|s| s.to_string()).collect();
//! app.run(&args, &mut session).unwrap();
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! ngsi settings list --all
//! ngsi server get orion
//! ngsi resolve --host orion --service openiot
//! ngsi --serial
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod session;
pub mod settings;

pub use error::{NgsiError, Result};
