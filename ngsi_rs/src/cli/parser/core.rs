//! Parse driver: program name, version short-circuit, global flags,
//! session init, then command descent.

use tracing::{debug, info};

use crate::cli::command::{App, Command};
use crate::cli::common_flags::{help_flag, version_flag};
use crate::cli::completion::{BASH_COMPLETION, hint_cmd_list, hint_flag_list};
use crate::cli::context::Context;
use crate::cli::dispatch::create_new_client;
use crate::cli::flag::remove_flag;
use crate::cli::help::{print_command_help, print_help, print_version};
use crate::cli::init::init_session;
use crate::cli::token::Token;
use crate::cli::validation::validation;
use crate::error::{NgsiError, Result};
use crate::session::Session;

use super::checks::{check_choices, check_empty, required};
use super::helpers::{is_option, parse_opt, search_sub_command, suggest_similar_command};

/// Parse `args` (program name first) into the leaf command to run.
///
/// `Ok(None)` means the invocation was fully handled here: help, version or
/// completion output was printed and nothing is left to dispatch.
pub(crate) fn ngsi_run<'a>(
    app: &'a App,
    args: &[String],
    session: &mut Session,
) -> Result<Option<(&'a Command, Context<'a>)>> {
    const FUNC: &str = "ngsiRun";

    let mut ctx = Context::new(app);
    let mut token = Token::new(args);

    let Some(program) = token.next_arg() else {
        return Err(NgsiError::new(FUNC, 1, "command name error"));
    };
    ctx.command_name = program.to_string();

    if token.peek() == Some(BASH_COMPLETION) {
        session.print(hint_cmd_list(&app.commands));
        return Ok(None);
    }

    if print_version(app, &mut token, session) {
        return Ok(None);
    }

    parse_global_flag(&mut ctx, &mut token, session).map_err(|e| NgsiError::wrap(FUNC, 2, e))?;
    if ctx.bash_completion {
        return Ok(None);
    }

    init_session(&ctx, session).map_err(|e| NgsiError::wrap(FUNC, 3, e))?;
    ctx.flags.clear();

    let name = match token.next_arg() {
        None | Some("help" | "h") => {
            print_help(&ctx, session);
            return Ok(None);
        }
        Some(BASH_COMPLETION) => {
            session.print(hint_cmd_list(&app.commands));
            return Ok(None);
        }
        Some(name) => name,
    };

    remove_flag(&mut ctx.global_flags, "help");
    remove_flag(&mut ctx.global_flags, "version");

    let Some(command) =
        run_cmd(&mut ctx, &mut token, name, session).map_err(|e| NgsiError::wrap(FUNC, 4, e))?
    else {
        return Ok(None);
    };

    ctx.server_list = command.server_list.as_deref();
    create_new_client(&mut ctx, session).map_err(|e| NgsiError::wrap(FUNC, 5, e))?;

    Ok(Some((command, ctx)))
}

/// Global flags up to the first non-option token.
fn parse_global_flag(ctx: &mut Context<'_>, token: &mut Token<'_>, session: &mut Session) -> Result<()> {
    const FUNC: &str = "parseGlobalFlag";

    ctx.global_flags = ctx.app.flags.iter().map(|f| f.copy(true)).collect();
    ctx.global_flags.push(help_flag());
    ctx.global_flags.push(version_flag());

    while let Some(arg) = token.next_arg() {
        if arg == BASH_COMPLETION {
            token.prev();
            break;
        }
        if token.peek() == Some(BASH_COMPLETION) && arg.starts_with('-') {
            session.print(hint_flag_list(&ctx.global_flags, arg));
            ctx.bash_completion = true;
            return Ok(());
        }
        match is_option(arg) {
            Some((name, alias)) => parse_opt(&mut ctx.global_flags, token, name, alias)
                .map_err(|e| NgsiError::wrap(FUNC, 1, e))?,
            None => {
                token.prev();
                break;
            }
        }
    }

    // session init reads the globals through the regular accessors
    ctx.flags = ctx.global_flags.clone();
    Ok(())
}

/// Find the top-level command `name` and descend into it.
fn run_cmd<'a>(
    ctx: &mut Context<'a>,
    token: &mut Token<'_>,
    name: &str,
    session: &mut Session,
) -> Result<Option<&'a Command>> {
    const FUNC: &str = "runCmd";

    let app = ctx.app;
    let Some(cmd) = app.find_command(name) else {
        if let Some(suggestion) = suggest_similar_command(name, &app.commands) {
            info!("did you mean '{}'?", suggestion);
        }
        return Err(NgsiError::new(FUNC, 2, format!("{} not found", name)));
    };

    let cmd = parse_cmd_flag(ctx, token, cmd, session).map_err(|e| NgsiError::wrap(FUNC, 1, e))?;
    if ctx.help_command {
        print_command_help(ctx, session);
        return Ok(None);
    }
    if ctx.bash_completion {
        return Ok(None);
    }
    Ok(cmd)
}

fn descend<'a>(ctx: &mut Context<'a>, cmd: &'a Command) {
    remove_flag(&mut ctx.flags, "help");
    ctx.flags.extend(cmd.flags.iter().map(|f| f.copy(true)));
    ctx.flags.push(help_flag());
    ctx.required_flags.extend(cmd.required_flags.iter().cloned());
    ctx.commands.push(cmd);
}

/// Consume the remaining tokens for `cmd`, walking into subcommands, then
/// run the post-parse checks.
///
/// Flags and required flags accumulate across every level walked.
fn parse_cmd_flag<'a>(
    ctx: &mut Context<'a>,
    token: &mut Token<'_>,
    cmd: &'a Command,
    session: &mut Session,
) -> Result<Option<&'a Command>> {
    const FUNC: &str = "parseCmdFlag";

    let mut cmd = cmd;
    ctx.flags.clear();
    descend(ctx, cmd);

    if matches!(token.peek(), None | Some("help" | "h")) && cmd.has_subcommands() {
        ctx.help_command = true;
        return Ok(None);
    }

    while let Some(arg) = token.next_arg() {
        if arg == BASH_COMPLETION {
            session.print(hint_cmd_list(&cmd.subcommands));
            ctx.bash_completion = true;
            return Ok(None);
        }
        if token.peek() == Some(BASH_COMPLETION) && arg.starts_with('-') {
            session.print(hint_flag_list(&ctx.flags, arg));
            ctx.bash_completion = true;
            return Ok(None);
        }

        if let Some((name, alias)) = is_option(arg) {
            parse_opt(&mut ctx.flags, token, name, alias).map_err(|e| NgsiError::wrap(FUNC, 1, e))?;
            if ctx.is_set("help") {
                ctx.help_command = true;
                return Ok(None);
            }
        } else if cmd.has_subcommands() {
            cmd = search_sub_command(&cmd.subcommands, arg)
                .ok_or_else(|| NgsiError::new(FUNC, 2, format!("{} not found", arg)))?;
            debug!("subcommand {}", arg);
            descend(ctx, cmd);
        } else {
            ctx.args.push(arg);
        }
    }

    if required(ctx, session) {
        return Err(NgsiError::new(FUNC, 3, "missing required options"));
    }
    if check_empty(&ctx.flags, session) {
        return Err(NgsiError::new(FUNC, 4, "option values are empty"));
    }
    validation(cmd.option_flags.as_ref(), ctx).map_err(|e| NgsiError::wrap(FUNC, 5, e))?;
    if check_choices(&ctx.flags, session) {
        return Err(NgsiError::new(FUNC, 6, "option values error"));
    }

    Ok(Some(cmd))
}
