//! Flag blueprints shared by the app and its commands.
//!
//! Each function returns a fresh value; commands embed them in their
//! declarations and the parser copies them again before use.

use crate::session::{DEFAULT_MARGIN, DEFAULT_MAX_COUNT, DEFAULT_TIMEOUT};

use super::flag::{BoolFlag, Flag, Int64Flag, StringFlag};

const LOG_LEVELS: &[&str] = &["off", "err", "info", "debug"];

/// App-level flags accepted before the command name.
pub fn global_flags() -> Vec<Flag> {
    vec![
        StringFlag::new("syslog")
            .usage("syslog logging `LEVEL` (off, err, info, debug)")
            .choices(LOG_LEVELS)
            .into(),
        StringFlag::new("stderr")
            .usage("stderr logging `LEVEL` (err, info, debug)")
            .choices(LOG_LEVELS)
            .into(),
        StringFlag::new("config")
            .usage("configuration `FILE` name")
            .allow_empty()
            .into(),
        StringFlag::new("configDir")
            .usage("configuration `DIR` name")
            .hidden()
            .into(),
        StringFlag::new("cache").usage("cache `FILE` name").into(),
        Int64Flag::new("margin")
            .usage("I/O time out (second)")
            .value(DEFAULT_MARGIN)
            .hidden()
            .into(),
        Int64Flag::new("timeout")
            .usage("I/O time out (second)")
            .value(DEFAULT_TIMEOUT)
            .hidden()
            .into(),
        Int64Flag::new("maxCount")
            .usage("maxCount")
            .value(DEFAULT_MAX_COUNT)
            .hidden()
            .into(),
        BoolFlag::new("batch")
            .alias("B")
            .usage("don't use previous args (batch)")
            .into(),
        StringFlag::new("cmdName").hidden().into(),
        BoolFlag::new("insecureSkipVerify")
            .usage("TLS/SSL skip certificate verification")
            .into(),
    ]
}

/// Injected at every level so `--help` is always accepted.
pub fn help_flag() -> Flag {
    BoolFlag::new("help").usage("show help").into()
}

pub fn version_flag() -> Flag {
    BoolFlag::new("version")
        .alias("v")
        .usage("print the version")
        .into()
}

/// Host that must resolve to a client before the action runs.
pub fn host_required_flag() -> StringFlag {
    StringFlag::new("host")
        .alias("h")
        .usage("broker or server host `VALUE`")
        .required()
        .init_client()
        .previous_args()
}

pub fn host_flag() -> StringFlag {
    StringFlag::new("host")
        .alias("h")
        .usage("broker or server host `VALUE`")
}

pub fn tenant_flag() -> StringFlag {
    StringFlag::new("service")
        .alias("s")
        .usage("FIWARE Service `VALUE`")
        .allow_empty()
}

pub fn scope_flag() -> StringFlag {
    StringFlag::new("path")
        .alias("p")
        .usage("FIWARE ServicePath `VALUE`")
        .allow_empty()
}

pub fn oauth_token_flag() -> StringFlag {
    StringFlag::new("oAuthToken")
        .usage("OAuth token `VALUE`")
        .hidden()
        .allow_empty()
}

pub fn json_flag() -> BoolFlag {
    BoolFlag::new("json").alias("j").usage("JSON format")
}

pub fn pretty_flag() -> BoolFlag {
    BoolFlag::new("pretty").alias("P").usage("pretty format")
}
