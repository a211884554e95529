//! Declarative command tree.
//!
//! An [`App`] holds the global flags and the top-level commands; each
//! [`Command`] may carry subcommands to any depth. Only leaves have an
//! action. The tree is a read-only blueprint: parsing clones flags out of
//! it and never writes back.

use crate::client::Client;
use crate::error::Result;
use crate::session::Session;

use super::context::Context;
use super::flag::Flag;
use super::validation::ValidationFlag;

/// Leaf command body.
pub type ActionFn = fn(&Context<'_>, &mut Session, Option<&Client>) -> Result<()>;

#[derive(Clone, Default)]
pub struct Command {
    pub name: String,
    pub usage: String,
    pub category: String,
    pub subcommands: Vec<Command>,
    pub flags: Vec<Flag>,
    /// Flags that may also be given positionally, in this order.
    pub required_flags: Vec<String>,
    pub option_flags: Option<ValidationFlag>,
    /// Server types allowed to run this command (`brokerv2`, `brokerld`, `comet`, ...).
    pub server_list: Option<Vec<String>>,
    pub hidden: bool,
    pub action: Option<ActionFn>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn flag(mut self, flag: impl Into<Flag>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn required_flags(mut self, names: &[&str]) -> Self {
        self.required_flags = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn validate(mut self, rule: ValidationFlag) -> Self {
        self.option_flags = Some(rule);
        self
    }

    pub fn server_list(mut self, types: &[&str]) -> Self {
        self.server_list = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn subcommand(mut self, cmd: Command) -> Self {
        self.subcommands.push(cmd);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn action(mut self, action: ActionFn) -> Self {
        self.action = Some(action);
        self
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }
}

/// Root of the command forest.
#[derive(Clone, Default)]
pub struct App {
    pub name: String,
    pub usage: String,
    pub version: String,
    pub flags: Vec<Flag>,
    pub commands: Vec<Command>,
}

impl App {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn flags(mut self, flags: Vec<Flag>) -> Self {
        self.flags = flags;
        self
    }

    pub fn command(mut self, cmd: Command) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }
}
