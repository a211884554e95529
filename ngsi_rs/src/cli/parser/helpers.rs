//! Token-level helpers shared by the global and per-command flag phases.

use strsim::levenshtein;

use crate::cli::command::Command;
use crate::cli::flag::Flag;
use crate::cli::token::Token;
use crate::error::{NgsiError, Result};

/// Split an option token into `(long name, short alias)`.
///
/// `--host` gives `("host", "")`, `-h` gives `("", "h")`. Bare `-`/`--` and
/// non-option tokens return `None`.
pub(crate) fn is_option(arg: &str) -> Option<(&str, &str)> {
    if let Some(name) = arg.strip_prefix("--") {
        return (!name.is_empty()).then_some((name, ""));
    }
    match arg.strip_prefix('-') {
        Some(alias) if !alias.is_empty() => Some(("", alias)),
        _ => None,
    }
}

/// Apply the option `name`/`alias` to the matching flag, consuming its value
/// from `token`.
///
/// Bool flags take the following token only when it reads as a boolean;
/// otherwise the token is put back and the flag becomes true.
pub(crate) fn parse_opt(flags: &mut [Flag], token: &mut Token<'_>, name: &str, alias: &str) -> Result<()> {
    const FUNC: &str = "parseOpt";

    let Some(flag) = flags.iter_mut().find(|f| f.matches(name, alias)) else {
        let mut shown = String::new();
        if !name.is_empty() {
            shown.push_str("--");
            shown.push_str(name);
        }
        if !alias.is_empty() {
            shown.push('-');
            shown.push_str(alias);
        }
        return Err(NgsiError::new(FUNC, 4, format!("unknown flag: {}", shown)));
    };

    match flag {
        Flag::String(_) => {
            let v = token
                .next_arg()
                .ok_or_else(|| NgsiError::new(FUNC, 1, "value missing"))?;
            flag.set_value(v)
        }
        Flag::Int64(_) => {
            let v = token
                .next_arg()
                .ok_or_else(|| NgsiError::new(FUNC, 2, "value missing"))?;
            flag.set_value(v).map_err(|e| NgsiError::wrap(FUNC, 3, e))
        }
        Flag::Bool(_) => {
            if let Some(v) = token.peek() {
                token.next_arg();
                if flag.set_value(v).is_ok() {
                    return Ok(());
                }
                token.prev();
            }
            flag.set_value(true)
        }
    }
}

pub(crate) fn search_sub_command<'a>(cmds: &'a [Command], name: &str) -> Option<&'a Command> {
    cmds.iter().find(|c| c.name == name)
}

/// Closest command name within Levenshtein distance 2.
pub(crate) fn suggest_similar_command<'a>(input: &str, cmds: &'a [Command]) -> Option<&'a str> {
    let input = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for cmd in cmds.iter().filter(|c| !c.hidden) {
        let distance = levenshtein(&input, &cmd.name.to_lowercase());
        if distance <= 2 && best.is_none_or(|(_, d)| distance < d) {
            best = Some((&cmd.name, distance));
        }
    }

    best.map(|(name, _)| name)
}
