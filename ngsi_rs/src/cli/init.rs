//! Session initialisation from the parsed global flags.
//!
//! Runs after global flags and before command descent: selects and loads the
//! configuration, then resolves logging, tuning and cache options, each with
//! the same precedence (flag, then previous args, then default). A value
//! given by flag is remembered and marks the session dirty.

use tracing::{debug, info};

use crate::config::{JsonFileStore, resolve_config_path};
use crate::error::{NgsiError, Result};
use crate::logging::{self, LogLevel};
use crate::session::{DEFAULT_MARGIN, DEFAULT_MAX_COUNT, DEFAULT_TIMEOUT, Session};
use crate::settings::Settings;

use super::context::Context;

pub(crate) fn init_session(ctx: &Context<'_>, session: &mut Session) -> Result<()> {
    const FUNC: &str = "InitCmd";

    if ctx.is_set("batch") {
        session.batch = ctx.bool("batch");
    }

    if ctx.is_set("configDir") && (ctx.is_set("config") || ctx.is_set("cache")) {
        return Err(NgsiError::new(
            FUNC,
            1,
            "configDir cannot be specified with config or cache at the same time",
        ));
    }

    if session.store.is_none() {
        let config = ctx.is_set("config").then(|| ctx.string("config"));
        let config_dir = ctx.is_set("configDir").then(|| ctx.string("configDir"));
        let store = match resolve_config_path(config.as_deref(), config_dir.as_deref())
            .map_err(|e| NgsiError::wrap(FUNC, 2, e))?
        {
            Some(path) => JsonFileStore::new(path),
            None => JsonFileStore::disabled(),
        };
        session.store = Some(Box::new(store));
    }
    session.load_config().map_err(|e| NgsiError::wrap(FUNC, 2, e))?;
    if session.batch {
        session.settings = Settings::batch();
    }

    init_stderr_option(ctx, session).map_err(|e| NgsiError::wrap(FUNC, 3, e))?;
    init_syslog_option(ctx, session).map_err(|e| NgsiError::wrap(FUNC, 4, e))?;
    init_hidden_options(ctx, session);

    session.insecure_skip_verify = ctx.bool("insecureSkipVerify");

    info!("{}", ctx.app.version);

    init_cache_file_option(ctx, session);
    Ok(())
}

/// Level from `name` flag, else the remembered one, else `default`.
fn resolve_level(ctx: &Context<'_>, remembered: &mut String, updated: &mut bool, name: &str, default: &str) -> String {
    let mut level = if remembered.is_empty() {
        default.to_string()
    } else {
        remembered.clone()
    };
    if ctx.is_set(name) {
        level = ctx.string(name);
        *remembered = level.clone();
        *updated = true;
    }
    level
}

fn init_stderr_option(ctx: &Context<'_>, session: &mut Session) -> Result<()> {
    const FUNC: &str = "initStderrOption";

    let s = resolve_level(ctx, &mut session.settings.stderr, &mut session.updated, "stderr", "err");
    let level: LogLevel = s
        .parse()
        .map_err(|e| NgsiError::with_source(FUNC, 1, "stderr logLevel error", e))?;
    session.stderr_level = level;
    logging::set_stderr_level(level);
    Ok(())
}

fn init_syslog_option(ctx: &Context<'_>, session: &mut Session) -> Result<()> {
    const FUNC: &str = "initSyslogOption";

    let s = resolve_level(ctx, &mut session.settings.syslog, &mut session.updated, "syslog", "off");
    let level: LogLevel = s
        .parse()
        .map_err(|e| NgsiError::with_source(FUNC, 1, "syslog logLevel error", e))?;
    session.syslog_level = level;
    if level != LogLevel::Off {
        debug!("syslog level {} requested, no syslog sink attached", level);
    }
    Ok(())
}

fn clamp_or(value: i64, min: i64, max: i64, default: i64) -> i64 {
    if (min..=max).contains(&value) {
        value
    } else {
        default
    }
}

fn init_hidden_options(ctx: &Context<'_>, session: &mut Session) {
    if ctx.is_set("margin") {
        session.margin = clamp_or(ctx.int64("margin"), 10, 600, DEFAULT_MARGIN);
    }
    if ctx.is_set("timeout") {
        session.timeout = clamp_or(ctx.int64("timeout"), 10, 600, DEFAULT_TIMEOUT);
    }
    if ctx.is_set("maxCount") {
        session.max_count = clamp_or(ctx.int64("maxCount"), 1, 3000, DEFAULT_MAX_COUNT);
    }
}

fn init_cache_file_option(ctx: &Context<'_>, session: &mut Session) {
    if ctx.is_set("cache") {
        session.settings.cache_file = ctx.string("cache");
        session.updated = true;
    }
    let cache = &session.settings.cache_file;
    session.cache_file = (!cache.is_empty()).then(|| cache.clone());
}
