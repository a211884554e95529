//! Help and version output.
//!
//! Section builders return plain strings so they can be asserted on
//! directly; the `print_*` wrappers write them to the session's stdout.

use std::collections::BTreeMap;

use crate::session::Session;
use crate::settings::Settings;

use super::command::{App, Command};
use super::context::Context;
use super::flag::Flag;
use super::token::Token;

/// Category pinned after every other one in the command list.
const PINNED_LAST_CATEGORY: &str = "MANAGEMENT";

const HELP_USAGE: &str = "Shows a list of commands or help for one command";

// ============================================================================
// Version
// ============================================================================

/// Handle `--version`/`-v`/`--serial` as the first token after the program
/// name. The token is put back when it is anything else.
pub fn print_version(app: &App, token: &mut Token<'_>, session: &mut Session) -> bool {
    match token.next_arg() {
        Some("--version" | "-v") => {
            session.print(format!("ngsi version {}\n", app.version));
            true
        }
        Some("--serial") => {
            if let Some(serial) = serial_number(&app.version) {
                session.print(serial);
            }
            true
        }
        _ => {
            token.prev();
            false
        }
    }
}

/// `MMmmpp` rendering of a `major.minor.patch` version.
pub fn serial_number(version: &str) -> Option<String> {
    let mut parts = version.splitn(3, '.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    let patch = parts.next()?;
    let digits = patch.find(|c: char| !c.is_ascii_digit()).unwrap_or(patch.len());
    let patch: u32 = patch[..digits].parse().ok()?;
    Some(format!("{:02}{:02}{:02}", major, minor, patch))
}

// ============================================================================
// Pages
// ============================================================================

/// Top-level help page.
pub fn app_help(ctx: &Context<'_>, settings: &Settings) -> String {
    let mut msg = format!("NAME:\n   ngsi - {}\n\n", ctx.app.usage);
    msg.push_str(&format!(
        "USAGE:\n   {} [global options] command [options] [arguments...]\n\n",
        ctx.command_name
    ));
    msg.push_str(&format!("VERSION:\n   ngsi version {}\n\n", ctx.app.version));
    msg.push_str(&command_list(&ctx.app.commands));
    msg.push_str(&command_flags("GLOBAL OPTIONS", &ctx.global_flags));
    msg.push_str(&previous_args(settings));
    msg
}

/// Help page for the last command of the walked chain.
pub fn command_help(ctx: &Context<'_>, settings: &Settings) -> String {
    let Some((cmd, root)) = ctx.commands.last().zip(ctx.commands.first()) else {
        return app_help(ctx, settings);
    };
    let chain = ctx.chain();

    let mut msg = format!("NAME:\n   ngsi {} - {}\n\n", chain, cmd.usage);
    let tail = if cmd.has_subcommands() {
        "[options] [command] [arguments...]"
    } else {
        "[options] [arguments...]"
    };
    msg.push_str(&format!(
        "USAGE:\n   {} [global options] {} {}\n\n",
        ctx.command_name, chain, tail
    ));
    msg.push_str(&format!("CATEGORY:\n   {}\n\n", root.category));
    msg.push_str(&sub_command_list(cmd));
    msg.push_str(&command_flags("OPTIONS", &ctx.flags));
    msg.push_str(&command_flags("GLOBAL OPTIONS", &ctx.global_flags));
    msg.push_str(&previous_args(settings));
    msg
}

pub fn print_help(ctx: &Context<'_>, session: &mut Session) {
    let msg = app_help(ctx, &session.settings);
    session.print(msg);
}

pub fn print_command_help(ctx: &Context<'_>, session: &mut Session) {
    let msg = command_help(ctx, &session.settings);
    session.print(msg);
}

// ============================================================================
// Sections
// ============================================================================

fn category_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a == PINNED_LAST_CATEGORY, b == PINNED_LAST_CATEGORY) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.to_uppercase().cmp(&b.to_uppercase()),
    }
}

/// COMMANDS section of the top-level page, grouped by category.
pub fn command_list(commands: &[Command]) -> String {
    let mut msg = String::from("COMMANDS:\n");
    msg.push_str(&format!("   help, h  {}\n", HELP_USAGE));

    let mut groups: BTreeMap<&str, Vec<&Command>> = BTreeMap::new();
    for cmd in commands.iter().filter(|c| !c.hidden) {
        groups.entry(cmd.category.as_str()).or_default().push(cmd);
    }
    let mut names: Vec<&str> = groups.keys().copied().collect();
    names.sort_by(|a, b| category_order(a, b));

    for name in names {
        let cmds = &groups[name];
        let width = cmds.iter().map(|c| c.name.len()).max().unwrap_or(0);
        msg.push_str(&format!("   {}:\n", name));
        for cmd in cmds {
            msg.push_str(&format!("     {:<width$}  {}\n", cmd.name, cmd.usage));
        }
    }
    msg.push('\n');
    msg
}

/// COMMANDS section of a command page: leaves first, then nested groups.
pub fn sub_command_list(cmd: &Command) -> String {
    if !cmd.has_subcommands() {
        return String::new();
    }
    let visible = || cmd.subcommands.iter().filter(|c| !c.hidden);

    let width = visible()
        .filter(|c| !c.has_subcommands())
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("help, h".len());

    let mut msg = String::from("COMMANDS:\n");
    for sub in visible().filter(|c| !c.has_subcommands()) {
        msg.push_str(&format!("   {:<width$}  {}\n", sub.name, sub.usage));
    }
    msg.push_str(&format!("   {:<width$}  {}\n", "help, h", HELP_USAGE));

    let width = visible()
        .filter(|c| c.has_subcommands())
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);
    let mut category: Option<&str> = None;
    for sub in visible().filter(|c| c.has_subcommands()) {
        if category != Some(sub.category.as_str()) {
            category = Some(sub.category.as_str());
            msg.push_str(&format!("   {}:\n", sub.category));
        }
        msg.push_str(&format!("     {:<width$}  {}\n", sub.name, sub.usage));
    }

    msg.push('\n');
    msg
}

/// Flag table titled `title`; empty when there are no flags.
pub fn command_flags(title: &str, flags: &[Flag]) -> String {
    if flags.is_empty() {
        return String::new();
    }
    let visible = || flags.iter().filter(|f| !f.is_hidden());
    let width = visible().map(|f| f.name_list().len()).max().unwrap_or(0);

    let mut msg = format!("{}:\n", title);
    for f in visible() {
        msg.push_str(&format!("   {:<width$}  {}\n", f.name_list(), f.usage_text()));
    }
    msg.push('\n');
    msg
}

/// PREVIOUS ARGS section.
pub fn previous_args(settings: &Settings) -> String {
    let mut msg = String::from("PREVIOUS ARGS:\n");
    if !settings.use_previous_args {
        msg.push_str("   off\n");
        msg.push_str("   (To enable it, run 'ngsi settings previousArgs --on')\n");
        return msg;
    }

    let items = settings.display_items();
    let width = items
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, _)| k.len())
        .max()
        .unwrap_or(0);
    if width == 0 {
        msg.push_str("   None\n");
        return msg;
    }
    for (label, value) in items.iter().filter(|(_, v)| !v.is_empty()) {
        msg.push_str(&format!("   {:<width$}  {}\n", label, value));
    }
    msg.push_str("   (To clear args, run 'ngsi settings clear')\n");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::flag::{BoolFlag, StringFlag};
    use pretty_assertions::assert_eq;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn version_short_circuits() {
        let app = App::new("ngsi", "0.9.0");
        for flag in ["--version", "-v"] {
            let (mut s, out, _) = Session::capture();
            let a = args(&[flag, "settings"]);
            let mut t = Token::new(&a);
            assert!(print_version(&app, &mut t, &mut s));
            assert_eq!(out.contents(), "ngsi version 0.9.0\n");
        }
    }

    #[test]
    fn serial_is_six_digits_without_newline() {
        let app = App::new("ngsi", "0.9.0");
        let (mut s, out, _) = Session::capture();
        let a = args(&["--serial"]);
        let mut t = Token::new(&a);
        assert!(print_version(&app, &mut t, &mut s));
        assert_eq!(out.contents(), "000900");
        assert_eq!(serial_number("1.12.3-rc1").as_deref(), Some("011203"));
        assert_eq!(serial_number("dev"), None);
    }

    #[test]
    fn other_tokens_are_put_back() {
        let app = App::new("ngsi", "0.9.0");
        let (mut s, out, _) = Session::capture();
        let a = args(&["settings", "list"]);
        let mut t = Token::new(&a);
        assert!(!print_version(&app, &mut t, &mut s));
        assert_eq!(t.peek(), Some("settings"));
        assert_eq!(out.contents(), "");

        let empty: Vec<String> = Vec::new();
        let mut t = Token::new(&empty);
        assert!(!print_version(&app, &mut t, &mut s));
        assert_eq!(t.peek(), None);
    }

    #[test]
    fn commands_grouped_with_pinned_category_last() {
        let cmds = vec![
            Command::new("settings").category("MANAGEMENT").usage("manage settings"),
            Command::new("resolve").category("CONVENIENCE").usage("resolve host"),
            Command::new("server").category("MANAGEMENT").usage("manage servers"),
            Command::new("secret").category("CONVENIENCE").hidden(),
            Command::new("get").category("alpha").usage("get"),
        ];
        let expected = "COMMANDS:
   help, h  Shows a list of commands or help for one command
   alpha:
     get  get
   CONVENIENCE:
     resolve  resolve host
   MANAGEMENT:
     settings  manage settings
     server    manage servers

";
        assert_eq!(command_list(&cmds), expected);
    }

    #[test]
    fn sub_command_list_pads_to_help_entry() {
        let cmd = Command::new("settings")
            .subcommand(Command::new("list").usage("List settings"))
            .subcommand(Command::new("delete").usage("Delete settings"))
            .subcommand(Command::new("hide").hidden());
        let expected = "COMMANDS:
   list     List settings
   delete   Delete settings
   help, h  Shows a list of commands or help for one command

";
        assert_eq!(sub_command_list(&cmd), expected);
        assert_eq!(sub_command_list(&Command::new("leaf")), "");
    }

    #[test]
    fn nested_groups_follow_leaves() {
        let cmd = Command::new("admin")
            .subcommand(Command::new("log").usage("log level"))
            .subcommand(
                Command::new("appliance")
                    .category("SUB")
                    .usage("manage appliances")
                    .subcommand(Command::new("list")),
            );
        let expected = "COMMANDS:
   log      log level
   help, h  Shows a list of commands or help for one command
   SUB:
     appliance  manage appliances

";
        assert_eq!(sub_command_list(&cmd), expected);
    }

    #[test]
    fn flag_table_skips_hidden() {
        let flags: Vec<Flag> = vec![
            StringFlag::new("host").alias("h").usage("broker or server host `VALUE`").required().into(),
            StringFlag::new("oAuthToken").hidden().into(),
            BoolFlag::new("help").usage("show help").into(),
        ];
        let expected = "OPTIONS:
   --host VALUE, -h VALUE  broker or server host VALUE (required)
   --help                  show help (default: false)

";
        assert_eq!(command_flags("OPTIONS", &flags), expected);
        assert_eq!(command_flags("OPTIONS", &[]), "");
    }

    #[test]
    fn previous_args_states() {
        let off = Settings::batch();
        assert_eq!(
            previous_args(&off),
            "PREVIOUS ARGS:\n   off\n   (To enable it, run 'ngsi settings previousArgs --on')\n"
        );
        assert_eq!(previous_args(&Settings::default()), "PREVIOUS ARGS:\n   None\n");

        let s = Settings {
            host: "orion".into(),
            tenant: "openiot".into(),
            ..Settings::default()
        };
        let expected = "PREVIOUS ARGS:
   Host            orion
   FIWARE-Service  openiot
   (To clear args, run 'ngsi settings clear')
";
        assert_eq!(previous_args(&s), expected);
    }

    #[test]
    fn command_page_layout() {
        let app = App::new("ngsi", "0.9.0").command(
            Command::new("settings")
                .category("MANAGEMENT")
                .usage("manage settings")
                .subcommand(Command::new("clear").usage("Clear settings")),
        );
        let mut ctx = Context::new(&app);
        ctx.command_name = "ngsi".into();
        ctx.commands.push(&app.commands[0]);
        ctx.commands.push(&app.commands[0].subcommands[0]);
        ctx.flags = vec![BoolFlag::new("help").usage("show help").into()];
        ctx.global_flags = vec![BoolFlag::new("batch").alias("B").usage("don't use previous args (batch)").into()];

        let expected = "NAME:
   ngsi settings clear - Clear settings

USAGE:
   ngsi [global options] settings clear [options] [arguments...]

CATEGORY:
   MANAGEMENT

OPTIONS:
   --help  show help (default: false)

GLOBAL OPTIONS:
   --batch, -B  don't use previous args (batch) (default: false)

PREVIOUS ARGS:
   None
";
        assert_eq!(command_help(&ctx, &Settings::default()), expected);
    }
}
