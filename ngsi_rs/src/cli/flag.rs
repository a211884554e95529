//! Typed command-line flags.
//!
//! Flags are declared once as blueprints (see [`super::common_flags`]) and
//! cloned with [`Flag::copy`] before a parse touches them, so the same
//! command tree can be run repeatedly inside one process.

use crate::error::{NgsiError, Result};

/// Raw value handed to [`Flag::set_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    Str(&'a str),
    Bool(bool),
    Int(i64),
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(v: &'a str) -> Self {
        RawValue::Str(v)
    }
}

impl<'a> From<&'a String> for RawValue<'a> {
    fn from(v: &'a String) -> Self {
        RawValue::Str(v.as_str())
    }
}

impl From<bool> for RawValue<'_> {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<i64> for RawValue<'_> {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<i32> for RawValue<'_> {
    fn from(v: i32) -> Self {
        RawValue::Int(i64::from(v))
    }
}

// ============================================================================
// String
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringFlag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub value: String,
    pub hidden: bool,
    pub set: bool,
    pub required: bool,
    /// Resolving this flag builds the broker client before the action runs.
    pub init_client: bool,
    pub skip_get_token: bool,
    /// An explicitly empty value is accepted.
    pub value_empty: bool,
    /// Participates in previous-args memory.
    pub previous_args: bool,
    /// Host lookup must not follow alias references.
    pub skip_ref_host: bool,
    pub choices: Option<Vec<String>>,
}

impl StringFlag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn init_client(mut self) -> Self {
        self.init_client = true;
        self
    }

    pub fn skip_get_token(mut self) -> Self {
        self.skip_get_token = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.value_empty = true;
        self
    }

    pub fn previous_args(mut self) -> Self {
        self.previous_args = true;
        self
    }

    pub fn skip_ref_host(mut self) -> Self {
        self.skip_ref_host = true;
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Store `value` and mark the flag as set.
    pub fn assign(&mut self, value: &str) {
        self.value = value.to_string();
        self.set = true;
    }

    fn set_value(&mut self, v: RawValue<'_>) -> Result<()> {
        match v {
            RawValue::Str(s) => {
                self.assign(s);
                Ok(())
            }
            _ => Err(NgsiError::new("StringFlagSetValue", 1, "type error")),
        }
    }
}

// ============================================================================
// Bool
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolFlag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub value: bool,
    pub hidden: bool,
    pub set: bool,
    pub required: bool,
}

impl BoolFlag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn set_value(&mut self, v: RawValue<'_>) -> Result<()> {
        const FUNC: &str = "BoolFlagSetValue";
        let b = match v {
            RawValue::Bool(b) => b,
            RawValue::Str(s) => match s.to_lowercase().as_str() {
                "true" | "on" => true,
                "false" | "off" => false,
                _ => {
                    return Err(NgsiError::new(
                        FUNC,
                        2,
                        format!("{} is not boolean value", s),
                    ));
                }
            },
            RawValue::Int(_) => return Err(NgsiError::new(FUNC, 1, "type error")),
        };
        self.value = b;
        self.set = true;
        Ok(())
    }
}

// ============================================================================
// Int64
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Int64Flag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub value: i64,
    pub hidden: bool,
    pub set: bool,
    pub required: bool,
}

impl Int64Flag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn set_value(&mut self, v: RawValue<'_>) -> Result<()> {
        const FUNC: &str = "Int64FlagSetValue";
        self.value = match v {
            RawValue::Int(n) => n,
            RawValue::Str(s) => s
                .parse::<i64>()
                .map_err(|_| NgsiError::new(FUNC, 2, format!("{} is not number", s)))?,
            RawValue::Bool(_) => return Err(NgsiError::new(FUNC, 1, "type error")),
        };
        self.set = true;
        Ok(())
    }
}

// ============================================================================
// Flag
// ============================================================================

/// A flag of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    String(StringFlag),
    Bool(BoolFlag),
    Int64(Int64Flag),
}

impl From<StringFlag> for Flag {
    fn from(f: StringFlag) -> Self {
        Flag::String(f)
    }
}

impl From<BoolFlag> for Flag {
    fn from(f: BoolFlag) -> Self {
        Flag::Bool(f)
    }
}

impl From<Int64Flag> for Flag {
    fn from(f: Int64Flag) -> Self {
        Flag::Int64(f)
    }
}

impl Flag {
    pub fn name(&self) -> &str {
        match self {
            Flag::String(f) => &f.name,
            Flag::Bool(f) => &f.name,
            Flag::Int64(f) => &f.name,
        }
    }

    pub fn aliases(&self) -> &[String] {
        match self {
            Flag::String(f) => &f.aliases,
            Flag::Bool(f) => &f.aliases,
            Flag::Int64(f) => &f.aliases,
        }
    }

    fn raw_usage(&self) -> &str {
        match self {
            Flag::String(f) => &f.usage,
            Flag::Bool(f) => &f.usage,
            Flag::Int64(f) => &f.usage,
        }
    }

    pub fn is_hidden(&self) -> bool {
        match self {
            Flag::String(f) => f.hidden,
            Flag::Bool(f) => f.hidden,
            Flag::Int64(f) => f.hidden,
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            Flag::String(f) => f.set,
            Flag::Bool(f) => f.set,
            Flag::Int64(f) => f.set,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Flag::String(f) => f.required,
            Flag::Bool(f) => f.required,
            Flag::Int64(f) => f.required,
        }
    }

    pub fn is_init_client(&self) -> bool {
        matches!(self, Flag::String(f) if f.init_client)
    }

    pub fn allow_empty(&self) -> bool {
        matches!(self, Flag::String(f) if f.value_empty)
    }

    /// True when `name` equals the long name or `alias` is one of the aliases.
    /// Empty arguments never match.
    pub fn matches(&self, name: &str, alias: &str) -> bool {
        if !name.is_empty() && self.name() == name {
            return true;
        }
        !alias.is_empty() && self.aliases().iter().any(|a| a == alias)
    }

    /// Owned clone of a blueprint. `reset` clears the set bit; `copy(false)`
    /// keeps the source's set bit as is rather than forcing it on.
    pub fn copy(&self, reset: bool) -> Flag {
        let mut nf = self.clone();
        if reset {
            nf.set_set(false);
        }
        nf
    }

    fn set_set(&mut self, set: bool) {
        match self {
            Flag::String(f) => f.set = set,
            Flag::Bool(f) => f.set = set,
            Flag::Int64(f) => f.set = set,
        }
    }

    pub fn set_value<'v>(&mut self, v: impl Into<RawValue<'v>>) -> Result<()> {
        let v = v.into();
        match self {
            Flag::String(f) => f.set_value(v),
            Flag::Bool(f) => f.set_value(v),
            Flag::Int64(f) => f.set_value(v),
        }
    }

    pub fn as_string(&self) -> Option<&StringFlag> {
        match self {
            Flag::String(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_string_mut(&mut self) -> Option<&mut StringFlag> {
        match self {
            Flag::String(f) => Some(f),
            _ => None,
        }
    }

    /// Current value rendered as text (`true`/`false` for bools, base 10 for ints).
    pub fn value_string(&self) -> String {
        match self {
            Flag::String(f) => f.value.clone(),
            Flag::Bool(f) => f.value.to_string(),
            Flag::Int64(f) => f.value.to_string(),
        }
    }

    /// Left column of help output, e.g. `--host VALUE, -h VALUE`.
    pub fn name_list(&self) -> String {
        let default_arg = match self {
            Flag::Bool(_) => "",
            _ => " VALUE",
        };
        let usage = self.raw_usage();
        let arg = match (usage.find('`'), usage.rfind('`')) {
            (Some(s), Some(e)) if s < e => format!(" {}", &usage[s + 1..e]),
            _ => default_arg.to_string(),
        };

        let mut n = format!("--{}{}", self.name(), arg);
        for alias in self.aliases() {
            n.push_str(&format!(", -{}{}", alias, arg));
        }
        n
    }

    /// Right column of help output.
    pub fn usage_text(&self) -> String {
        let mut u = self.raw_usage().replace('`', "");
        if let Flag::Bool(f) = self {
            u = format!("{} (default: {})", u, f.value);
        }
        if self.is_required() {
            u.push_str(" (required)");
        }
        u
    }
}

/// Drop every flag called `name`.
pub fn remove_flag(flags: &mut Vec<Flag>, name: &str) {
    flags.retain(|f| f.name() != name);
}
