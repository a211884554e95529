//! Shared CLI entry point for the `ngsi` binary.
//!
//! Builds the process session over the real stdout/stderr, runs the app and
//! turns the outcome into an exit code, logging the error chain on failure.

use std::io::{self, BufWriter};

use tracing::{error, info};

use crate::commands;
use crate::error;
use crate::session::Session;

use super::command::App;

/// Run the bundled command set over `args` (program name first).
pub fn run(args: Vec<String>) -> i32 {
    let mut session = Session::new(Box::new(BufWriter::new(io::stdout())), Box::new(io::stderr()));
    let app = commands::ngsi_app();
    run_with(&app, &args, &mut session)
}

/// Run `app` against an existing session and map the result to an exit code.
pub fn run_with(app: &App, args: &[String], session: &mut Session) -> i32 {
    let code = match app.run(args, session) {
        Ok(()) => {
            info!("normal termination");
            0
        }
        Err(e) => {
            error!("{}", e.tagged());
            for cause in e.causes() {
                info!("{}", error::message(cause));
            }
            info!("abnormal termination");
            1
        }
    };
    session.flush();
    code
}
