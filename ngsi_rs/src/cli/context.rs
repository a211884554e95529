//! Per-invocation parse state and the accessors actions read flags through.

use crate::client::Client;

use super::command::{App, Command};
use super::flag::{Flag, StringFlag};

/// Positional arguments left after flag parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<String>);

impl Args {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub(crate) fn push(&mut self, arg: &str) {
        self.0.push(arg.to_string());
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// State built while parsing one invocation, discarded after dispatch.
pub struct Context<'a> {
    pub app: &'a App,
    /// Program name (`argv[0]`).
    pub command_name: String,
    /// Flags of the command chain walked so far.
    pub flags: Vec<Flag>,
    pub global_flags: Vec<Flag>,
    /// Accumulated across every level of the chain.
    pub required_flags: Vec<String>,
    pub args: Args,
    pub commands: Vec<&'a Command>,
    pub server_list: Option<&'a [String]>,
    pub help_command: bool,
    pub bash_completion: bool,
    pub client: Option<Client>,
    pub client2: Option<Client>,
}

impl<'a> Context<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            command_name: String::new(),
            flags: Vec::new(),
            global_flags: Vec::new(),
            required_flags: Vec::new(),
            args: Args::default(),
            commands: Vec::new(),
            server_list: None,
            help_command: false,
            bash_completion: false,
            client: None,
            client2: None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name() == name)
    }

    pub fn flag_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.name() == name)
    }

    pub fn string_flag(&self, name: &str) -> Option<&StringFlag> {
        self.flag(name).and_then(Flag::as_string)
    }

    /// Value as text; empty for unknown flags.
    pub fn string(&self, name: &str) -> String {
        self.flag(name).map(Flag::value_string).unwrap_or_default()
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.flag(name), Some(Flag::Bool(f)) if f.value)
    }

    pub fn int64(&self, name: &str) -> i64 {
        match self.flag(name) {
            Some(Flag::Int64(f)) => f.value,
            _ => 0,
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flag(name).is_some_and(Flag::is_set)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flag(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.flag(name).is_some_and(Flag::is_required)
    }

    pub fn flag_names(&self) -> Vec<&str> {
        self.flags.iter().map(Flag::name).collect()
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn is_set_or<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.is_set(n.as_ref()))
    }

    pub fn is_set_and<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.is_set(n.as_ref()))
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Destination client built from `--host2`.
    pub fn client2(&self) -> Option<&Client> {
        self.client2.as_ref()
    }

    /// Names of the walked command chain, space separated.
    pub fn chain(&self) -> String {
        self.commands
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::flag::{BoolFlag, Int64Flag};

    fn ctx(app: &App) -> Context<'_> {
        let mut c = Context::new(app);
        let mut limit: Flag = Int64Flag::new("limit").into();
        limit.set_value("25").unwrap();
        let mut pretty: Flag = BoolFlag::new("pretty").into();
        pretty.set_value(true).unwrap();
        c.flags = vec![
            StringFlag::new("id").value("urn:1").required().into(),
            limit,
            pretty,
        ];
        c
    }

    #[test]
    fn typed_accessors() {
        let app = App::default();
        let c = ctx(&app);
        assert_eq!(c.string("id"), "urn:1");
        assert_eq!(c.string("limit"), "25");
        assert_eq!(c.string("pretty"), "true");
        assert_eq!(c.string("missing"), "");
        assert_eq!(c.int64("limit"), 25);
        assert_eq!(c.int64("id"), 0);
        assert!(c.bool("pretty"));
        assert!(!c.bool("limit"));
    }

    #[test]
    fn set_state_queries() {
        let app = App::default();
        let c = ctx(&app);
        assert!(!c.is_set("id"));
        assert!(c.is_set("limit"));
        assert!(c.is_set_or(&["id", "limit"]));
        assert!(!c.is_set_and(&["id", "limit"]));
        assert!(c.is_set_and(&["pretty", "limit"]));
        assert!(c.is_required("id"));
        assert!(c.has_flag("pretty"));
        assert!(!c.has_flag("host"));
        assert_eq!(c.flag_names(), vec!["id", "limit", "pretty"]);
        assert!(c.string_flag("limit").is_none());
        assert!(c.string_flag("id").is_some());
    }

    #[test]
    fn args_accessors() {
        let mut a = Args::default();
        assert!(a.is_empty());
        a.push("one");
        a.push("two");
        assert_eq!(a.len(), 2);
        assert_eq!(a.first(), Some("one"));
        assert_eq!(a.get(1), Some("two"));
        assert_eq!(a.get(2), None);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["one", "two"]);
        a.clear();
        assert!(a.is_empty());
    }
}
