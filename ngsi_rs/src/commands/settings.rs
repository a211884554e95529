//! `ngsi settings` - inspect and edit the remembered previous args.

use crate::cli::command::Command;
use crate::cli::context::Context;
use crate::cli::flag::{BoolFlag, StringFlag};
use crate::cli::validation::ValidationFlag;
use crate::client::Client;
use crate::error::{NgsiError, Result};
use crate::session::Session;

pub(super) fn command() -> Command {
    Command::new("settings")
        .category("MANAGEMENT")
        .usage("manage settings")
        .subcommand(
            Command::new("list")
                .usage("List settings")
                .flag(BoolFlag::new("all").usage("all items"))
                .action(list),
        )
        .subcommand(
            Command::new("delete")
                .usage("Delete setting")
                .flag(StringFlag::new("items").alias("i").usage("setting `ITEMS` (comma separated)"))
                .required_flags(&["items"])
                .action(delete),
        )
        .subcommand(Command::new("clear").usage("Clear settings").action(clear))
        .subcommand(
            Command::new("previousArgs")
                .usage("Set PreviousArgs mode")
                .flag(BoolFlag::new("off").alias("d").usage("off (disable)"))
                .flag(BoolFlag::new("on").alias("e").usage("on (enable)"))
                .validate(ValidationFlag::xnor("on", "off"))
                .action(previous_args),
        )
}

/// Persist now so the post-action flush has nothing left to write.
fn save(session: &mut Session, func: &'static str, errno: u32) -> Result<()> {
    session.save_config().map_err(|e| NgsiError::wrap(func, errno, e))?;
    session.updated = false;
    Ok(())
}

fn list(ctx: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    let all = ctx.bool("all");

    let mut out = String::new();
    if !session.settings.use_previous_args {
        out.push_str("PreviousArgs off\n");
    }
    for (key, value) in session.settings.display_items() {
        if all || !value.is_empty() {
            out.push_str(&format!("{}: {}\n", key, value));
        }
    }
    session.print(out);
    Ok(())
}

fn delete(ctx: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    const FUNC: &str = "settingsDelete";

    let mut settings = session.settings.clone();
    for item in ctx.string("items").split(',') {
        if !settings.delete_item(item) {
            return Err(NgsiError::new(FUNC, 2, format!("{} not found", item.to_lowercase())));
        }
    }
    session.settings = settings;
    save(session, FUNC, 3)
}

fn clear(_: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    session.settings.clear_values();
    save(session, "settingsClear", 1)
}

fn previous_args(ctx: &Context<'_>, session: &mut Session, _: Option<&Client>) -> Result<()> {
    session.settings.use_previous_args = ctx.bool("on");
    session.settings.clear_values();
    save(session, "settingsPreviousArgs", 2)
}
