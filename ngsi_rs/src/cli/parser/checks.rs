//! Post-parse checks, run in order once the tokens are exhausted:
//! required flags (with positional shorthand and previous args), empty
//! values, then choices. Pairwise rules live in [`crate::cli::validation`].
//!
//! Each check writes one diagnostic line per violating flag to the error
//! sink and reports whether anything failed.

use crate::cli::context::Context;
use crate::cli::flag::Flag;
use crate::cli::previous_args::reconcile;
use crate::error::sprint_msg;
use crate::session::Session;

/// Reconcile required flags with positional arguments and previous args.
///
/// Positional shorthand applies only when none of the command's required
/// flags were named and the positional count matches exactly; positional
/// values are assigned in declaration order.
pub(crate) fn required(ctx: &mut Context<'_>, session: &mut Session) -> bool {
    const FUNC: &str = "required";

    let required = ctx.required_flags.clone();
    let mut missing = false;

    let positional =
        !required.is_empty() && !ctx.is_set_or(required.as_slice()) && ctx.args.len() == required.len();
    if positional {
        let values: Vec<String> = ctx.args.iter().map(str::to_string).collect();
        for (name, value) in required.iter().zip(&values) {
            match ctx.flag_mut(name) {
                Some(flag) => {
                    if let Err(e) = flag.set_value(value) {
                        session.eprint(format!("--{}: {}\n", name, e));
                        missing = true;
                    }
                }
                None => {
                    session.eprint(sprint_msg(FUNC, 1, &format!("--{}: not found\n", name)));
                    missing = true;
                }
            }
        }
        ctx.args.clear();
    }

    if reconcile(&mut ctx.flags, &mut session.settings, &session.servers) {
        session.updated = true;
    }

    if !required.is_empty() && !positional {
        if !ctx.args.is_empty() {
            missing = true;
        }
        for name in &required {
            if !ctx.is_set(name) {
                session.eprint(sprint_msg(FUNC, 4, &format!("--{} not found\n", name)));
                missing = true;
            }
        }
    }

    for flag in &ctx.flags {
        if flag.is_required() && !flag.is_set() {
            session.eprint(sprint_msg(FUNC, 2, &format!("--{} not found\n", flag.name())));
            missing = true;
        }
        if let Flag::String(f) = flag
            && f.name == "data"
            && f.set
            && f.value.is_empty()
            && !f.value_empty
        {
            session.eprint(sprint_msg(FUNC, 3, "data is empty\n"));
            missing = true;
        }
    }

    missing
}

/// Set string flags must carry a value unless they allow empty ones.
pub(crate) fn check_empty(flags: &[Flag], session: &mut Session) -> bool {
    const FUNC: &str = "checkEmpty";

    let mut failed = false;
    for f in flags.iter().filter_map(Flag::as_string) {
        if f.set && f.value.is_empty() && !f.value_empty {
            session.eprint(sprint_msg(FUNC, 1, &format!("--{}: value is empty\n", f.name)));
            failed = true;
        }
    }
    failed
}

/// Message shown when `--name` holds a value outside `choices`.
pub(crate) fn choices_message(choices: &[String], name: &str) -> String {
    match choices {
        [] => format!("no choices for --{}\n", name),
        [only] => format!("specify {} to --{}\n", only, name),
        [a, b] => format!("specify either {} or {} to --{}\n", a, b, name),
        [head @ .., last] => format!(
            "specify one of {} and {} to --{}\n",
            head.join(", "),
            last,
            name
        ),
    }
}

/// Set string flags with a choice list must match one entry, ignoring case.
pub(crate) fn check_choices(flags: &[Flag], session: &mut Session) -> bool {
    const FUNC: &str = "checkChoices";

    let mut failed = false;
    for f in flags.iter().filter_map(Flag::as_string) {
        let Some(choices) = &f.choices else {
            continue;
        };
        if !f.set {
            continue;
        }
        let value = f.value.to_lowercase();
        if !choices.iter().any(|c| *c == value) {
            session.eprint(sprint_msg(FUNC, 1, &choices_message(choices, &f.name)));
            failed = true;
        }
    }
    failed
}
