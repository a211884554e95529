//! `ngsi server` - read the server registry.

use crate::cli::command::Command;
use crate::cli::common_flags::{json_flag, pretty_flag};
use crate::cli::context::Context;
use crate::cli::flag::StringFlag;
use crate::client::Client;
use crate::error::{NgsiError, Result};
use crate::server::{ServerRecord, ServerRegistry};
use crate::session::Session;

pub(super) fn command() -> Command {
    Command::new("server")
        .category("MANAGEMENT")
        .usage("manage config for server")
        .subcommand(
            Command::new("list")
                .usage("list servers")
                .flag(json_flag())
                .flag(pretty_flag())
                .action(list),
        )
        .subcommand(
            Command::new("get")
                .usage("get server")
                .flag(
                    StringFlag::new("host")
                        .alias("h")
                        .usage("server host alias")
                        .previous_args()
                        .skip_ref_host(),
                )
                .flag(json_flag())
                .flag(pretty_flag())
                .required_flags(&["host"])
                .action(get),
        )
}

/// Compact JSON, indented with `--pretty`.
fn to_json<T: serde::Serialize>(ctx: &Context<'_>, value: &T, func: &'static str) -> Result<String> {
    let rendered = if ctx.bool("pretty") {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|e| NgsiError::with_source(func, 2, e.to_string(), e))
}

fn list(ctx: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    const FUNC: &str = "serverList";

    let out = if ctx.bool("json") || ctx.bool("pretty") {
        to_json(ctx, &session.servers, FUNC)?
    } else {
        session.servers.aliases().join(" ")
    };
    session.print(format!("{}\n", out));
    Ok(())
}

fn get(ctx: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    const FUNC: &str = "serverGet";

    let host = ctx.string("host");
    let record = session
        .servers
        .lookup(&host, true)
        .map_err(|e| NgsiError::with_source(FUNC, 1, format!("{} not found", host), e))?;

    let out = if ctx.bool("json") || ctx.bool("pretty") {
        format!("{}\n", to_json(ctx, &record, FUNC)?)
    } else {
        server_info(&record)
    };
    session.print(out);
    Ok(())
}

fn server_info(record: &ServerRecord) -> String {
    let mut out = format!("serverType {}\nserverHost {}\n", record.kind(), record.host());
    let items = [
        ("FIWARE-Service", &record.tenant),
        ("FIWARE-ServicePath", &record.scope),
        ("Context", &record.context),
        ("SafeString", &record.safe_string),
        ("IdmType", &record.idm_type),
        ("IdmHost", &record.idm_host),
        ("Token", &record.token),
        ("APIPath", &record.api_path),
    ];
    for (key, value) in items {
        if !value.is_empty() {
            out.push_str(&format!("{} {}\n", key, value));
        }
    }
    out
}
