use std::any::Any;
use std::io::{self, Write};
use std::panic;

use anyhow::Context;

use ngsi::cli::entrypoint::run;
use ngsi::logging;

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Quietly exit when downstream closes the pipe (e.g. piping to `head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() -> anyhow::Result<()> {
    install_broken_pipe_handler();
    logging::init();

    let code = run(std::env::args().collect());
    io::stdout().flush().context("failed to flush stdout")?;
    std::process::exit(code)
}
