//! Previous-args memory: remembered host, tenant, scope and token reused as
//! flag defaults across invocations.
//!
//! Precedence, highest first:
//! 1. value given on the current command line
//! 2. tenant/scope of the resolved host's server record (`service`/`path` only)
//! 3. stored previous args
//! 4. flag default
//!
//! The stored record is always rewritten as a whole from the final flag
//! values; a host switch is the only path that drops remembered tenant and
//! scope.

use tracing::debug;

use crate::server::ServerRegistry;
use crate::settings::Settings;

use super::flag::{Flag, StringFlag};

/// Flags mirrored into [`Settings`], by flag name.
const REMEMBERED: [&str; 4] = ["host", "service", "path", "oAuthToken"];

fn stored_slot<'s>(stored: &'s mut Settings, name: &str) -> Option<&'s mut String> {
    match name {
        "host" => Some(&mut stored.host),
        "service" => Some(&mut stored.tenant),
        "path" => Some(&mut stored.scope),
        "oAuthToken" => Some(&mut stored.token),
        _ => None,
    }
}

fn string_flag<'f>(flags: &'f [Flag], name: &str) -> Option<&'f StringFlag> {
    flags.iter().find(|f| f.name() == name).and_then(Flag::as_string)
}

fn string_flag_mut<'f>(flags: &'f mut [Flag], name: &str) -> Option<&'f mut StringFlag> {
    flags
        .iter_mut()
        .find(|f| f.name() == name)
        .and_then(Flag::as_string_mut)
}

/// Backfill unset flags from the stored record. Empty stored values are
/// never copied.
fn copy_stored_to_flags(flags: &mut [Flag], stored: &Settings) {
    for name in REMEMBERED {
        let value = match name {
            "host" => &stored.host,
            "service" => &stored.tenant,
            "path" => &stored.scope,
            _ => &stored.token,
        };
        backfill(flags, name, value);
    }
}

fn backfill(flags: &mut [Flag], name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Some(f) = string_flag_mut(flags, name)
        && !f.set
    {
        f.assign(value);
    }
}

/// Fill unset `service`/`path` from the server record `host` resolves to.
fn copy_record_to_flags(flags: &mut [Flag], registry: &dyn ServerRegistry, skip_ref_host: bool) {
    let Some(host) = string_flag(flags, "host").map(|f| f.value.clone()) else {
        return;
    };
    if host.is_empty() {
        return;
    }
    if let Ok(record) = registry.lookup(&host, skip_ref_host) {
        backfill(flags, "service", &record.tenant);
        backfill(flags, "path", &record.scope);
    }
}

/// Rebuild the stored record from the flags. Absent or unset flags clear
/// their slot.
fn copy_flags_to_stored(flags: &[Flag], stored: &mut Settings) {
    for name in REMEMBERED {
        let value = match string_flag(flags, name) {
            Some(f) if f.set => f.value.clone(),
            _ => String::new(),
        };
        if let Some(slot) = stored_slot(stored, name) {
            *slot = value;
        }
    }
}

/// Reconcile `flags` with the remembered `stored` settings.
///
/// Returns true when `stored` was rewritten and should be persisted.
/// Does nothing when previous args are disabled or the command has no
/// `host` flag.
pub fn reconcile(flags: &mut [Flag], stored: &mut Settings, registry: &dyn ServerRegistry) -> bool {
    if !stored.use_previous_args {
        return false;
    }
    let Some(host) = string_flag(flags, "host").cloned() else {
        return false;
    };

    if host.previous_args {
        if host.set && host.value != stored.host {
            debug!("host switch: {} -> {}", stored.host, host.value);
            copy_record_to_flags(flags, registry, host.skip_ref_host);
        } else {
            backfill(flags, "host", &stored.host);
            copy_record_to_flags(flags, registry, host.skip_ref_host);
            copy_stored_to_flags(flags, stored);
        }
        copy_flags_to_stored(flags, stored);
        true
    } else if host.set {
        copy_record_to_flags(flags, registry, host.skip_ref_host);
        copy_flags_to_stored(flags, stored);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{ServerRecord, ServerTable};

    fn flags(host_marked: bool) -> Vec<Flag> {
        let mut host = StringFlag::new("host").alias("h");
        if host_marked {
            host = host.previous_args();
        }
        vec![
            host.into(),
            StringFlag::new("service").alias("s").allow_empty().into(),
            StringFlag::new("path").alias("p").allow_empty().into(),
            StringFlag::new("oAuthToken").hidden().allow_empty().into(),
        ]
    }

    fn set(flags: &mut [Flag], name: &str, value: &str) {
        string_flag_mut(flags, name).unwrap().assign(value);
    }

    fn value(flags: &[Flag], name: &str) -> String {
        string_flag(flags, name).unwrap().value.clone()
    }

    fn stored() -> Settings {
        Settings {
            host: "orion-ld".into(),
            tenant: "old".into(),
            scope: "/old".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn host_switch_overwrites_stored_record() {
        let mut f = flags(true);
        set(&mut f, "host", "orion");
        let mut s = stored();
        assert!(reconcile(&mut f, &mut s, &ServerTable::new()));
        assert_eq!(s.host, "orion");
        assert_eq!(s.tenant, "");
        assert_eq!(s.scope, "");
        assert_eq!(value(&f, "service"), "");
    }

    #[test]
    fn same_host_backfills_then_rewrites() {
        let mut f = flags(true);
        set(&mut f, "path", "/new");
        let mut s = stored();
        assert!(reconcile(&mut f, &mut s, &ServerTable::new()));
        assert_eq!(value(&f, "host"), "orion-ld");
        assert_eq!(value(&f, "service"), "old");
        assert_eq!(value(&f, "path"), "/new");
        assert_eq!(s.host, "orion-ld");
        assert_eq!(s.tenant, "old");
        assert_eq!(s.scope, "/new");
    }

    #[test]
    fn empty_stored_host_is_not_copied() {
        let mut f = flags(true);
        let mut s = Settings::default();
        reconcile(&mut f, &mut s, &ServerTable::new());
        assert!(!string_flag(&f, "host").unwrap().set);
        assert!(!string_flag(&f, "service").unwrap().set);
    }

    #[test]
    fn remembered_host_picks_up_its_record_tenant() {
        let mut table = ServerTable::new();
        let mut rec = ServerRecord::broker("http://orion-ld:1026", "ld");
        rec.tenant = "openiot".into();
        table.insert("orion-ld", rec);

        let mut f = flags(true);
        let mut s = Settings {
            host: "orion-ld".into(),
            ..Settings::default()
        };
        assert!(reconcile(&mut f, &mut s, &table));
        assert_eq!(value(&f, "host"), "orion-ld");
        assert_eq!(value(&f, "service"), "openiot");
        assert!(!string_flag(&f, "path").unwrap().set);
        assert!(!string_flag(&f, "oAuthToken").unwrap().set);
        assert_eq!(s.tenant, "openiot");
    }

    #[test]
    fn registry_tenant_beats_stored_but_not_command_line() {
        let mut table = ServerTable::new();
        let mut rec = ServerRecord::broker("http://orion:1026", "v2");
        rec.tenant = "registry".into();
        rec.scope = "/registry".into();
        table.insert("orion", rec);

        let mut f = flags(true);
        set(&mut f, "host", "orion");
        set(&mut f, "path", "/cli");
        let mut s = stored();
        reconcile(&mut f, &mut s, &table);
        assert_eq!(value(&f, "service"), "registry");
        assert_eq!(value(&f, "path"), "/cli");
        assert_eq!(s.tenant, "registry");
        assert_eq!(s.scope, "/cli");
    }

    #[test]
    fn unmarked_host_writes_through_only() {
        let mut f = flags(false);
        let mut s = stored();
        assert!(!reconcile(&mut f, &mut s, &ServerTable::new()));
        assert!(!string_flag(&f, "service").unwrap().set);
        assert_eq!(s, stored());

        set(&mut f, "host", "orion");
        assert!(reconcile(&mut f, &mut s, &ServerTable::new()));
        assert_eq!(s.host, "orion");
        assert_eq!(s.tenant, "");
    }

    #[test]
    fn disabled_or_hostless_is_a_no_op() {
        let mut f = flags(true);
        let mut s = Settings {
            use_previous_args: false,
            ..stored()
        };
        assert!(!reconcile(&mut f, &mut s, &ServerTable::new()));
        assert!(!string_flag(&f, "host").unwrap().set);

        let mut f: Vec<Flag> = vec![StringFlag::new("service").into()];
        let mut s = stored();
        assert!(!reconcile(&mut f, &mut s, &ServerTable::new()));
        assert_eq!(s, stored());
    }
}
