//! Bash completion hints.
//!
//! The shell script installed for `ngsi` re-invokes the binary with
//! [`BASH_COMPLETION`] appended; the parser then prints newline-separated
//! candidates instead of running anything.

use super::command::Command;
use super::flag::Flag;

/// Trigger token appended by the completion script.
pub const BASH_COMPLETION: &str = "--generate-bash-completion";

/// Names of `cmds`, one per line.
pub fn hint_cmd_list(cmds: &[Command]) -> String {
    cmds.iter().map(|c| format!("{}\n", c.name)).collect()
}

/// Flags completing the partial option `arg`.
///
/// Set and hidden flags are skipped. An exact match yields nothing. Short
/// aliases are only offered while `arg` is not already in long form.
pub fn hint_flag_list(flags: &[Flag], arg: &str) -> String {
    let candidates = || flags.iter().filter(|f| !f.is_set() && !f.is_hidden());

    let mut hint = String::new();
    for f in candidates() {
        let name = format!("--{}", f.name());
        if name == arg {
            return String::new();
        }
        if name.starts_with(arg) {
            hint.push_str(&name);
            hint.push('\n');
        }
    }

    if !arg.starts_with("--") {
        for f in candidates() {
            for alias in f.aliases() {
                let name = format!("-{}", alias);
                if name == arg {
                    return String::new();
                }
                if name.starts_with(arg) {
                    hint.push_str(&name);
                    hint.push('\n');
                }
            }
        }
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::flag::{BoolFlag, StringFlag};

    fn flags() -> Vec<Flag> {
        vec![
            StringFlag::new("host").alias("h").into(),
            StringFlag::new("service").alias("s").into(),
            StringFlag::new("oAuthToken").hidden().into(),
            BoolFlag::new("pretty").alias("P").into(),
            BoolFlag::new("help").into(),
        ]
    }

    #[test]
    fn exact_match_yields_nothing() {
        assert_eq!(hint_flag_list(&flags(), "--host"), "");
        assert_eq!(hint_flag_list(&flags(), "-s"), "");
    }

    #[test]
    fn unique_prefix_yields_one_line() {
        assert_eq!(hint_flag_list(&flags(), "--se"), "--service\n");
        assert_eq!(hint_flag_list(&flags(), "--p"), "--pretty\n");
    }

    #[test]
    fn shared_prefix_lists_all_in_order() {
        assert_eq!(hint_flag_list(&flags(), "--h"), "--host\n--help\n");
    }

    #[test]
    fn single_dash_offers_long_names_then_aliases() {
        assert_eq!(
            hint_flag_list(&flags(), "-"),
            "--host\n--service\n--pretty\n--help\n-h\n-s\n-P\n"
        );
    }

    #[test]
    fn hidden_and_set_flags_are_skipped() {
        let mut f = flags();
        f[0].set_value("orion").unwrap();
        assert_eq!(hint_flag_list(&f, "--h"), "--help\n");
        assert_eq!(hint_flag_list(&f, "--o"), "");
    }

    #[test]
    fn command_names_one_per_line() {
        let cmds = vec![Command::new("settings"), Command::new("server").hidden()];
        assert_eq!(hint_cmd_list(&cmds), "settings\nserver\n");
        assert_eq!(hint_cmd_list(&[]), "");
    }
}
