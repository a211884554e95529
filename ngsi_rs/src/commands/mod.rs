//! Command set bundled with the `ngsi` binary.
//!
//! - `settings`: inspect and edit remembered previous args
//! - `server`: read the server registry
//! - `resolve`: build a client for a host and show what it targets

mod resolve;
mod server;
mod settings;

use crate::cli::command::App;
use crate::cli::common_flags::global_flags;

pub const USAGE: &str = "command-line tool for FIWARE Open APIs";

/// The app run by the `ngsi` binary.
pub fn ngsi_app() -> App {
    App::new("ngsi", env!("CARGO_PKG_VERSION"))
        .usage(USAGE)
        .flags(global_flags())
        .command(resolve::command())
        .command(server::command())
        .command(settings::command())
}
