//! Running a parsed invocation: client construction, the server-type gate,
//! the leaf action and the best-effort previous-args flush.

use tracing::{debug, warn};

use crate::client::{Client, ClientRequest};
use crate::error::{NgsiError, Result, sprint_msg};
use crate::session::Session;

use super::command::{App, Command};
use super::completion::BASH_COMPLETION;
use super::context::Context;
use super::help::print_command_help;
use super::parser::ngsi_run;

impl App {
    /// Parse and dispatch `args` (program name first).
    ///
    /// Parse errors are swallowed when the completion trigger ends `args`,
    /// so a half-typed command line never prints an error while completing.
    pub fn run(&self, args: &[String], session: &mut Session) -> Result<()> {
        const FUNC: &str = "Run";

        let parsed = match ngsi_run(self, args, session) {
            Ok(parsed) => parsed,
            Err(e) => {
                if args.last().map(String::as_str) == Some(BASH_COMPLETION) {
                    return Ok(());
                }
                return Err(NgsiError::wrap(FUNC, 1, e));
            }
        };
        let Some((command, ctx)) = parsed else {
            return Ok(());
        };
        if command.has_subcommands() {
            print_command_help(&ctx, session);
            return Ok(());
        }

        let result = match command.action {
            Some(action) => action(&ctx, session, ctx.client()),
            None => Err(NgsiError::new(FUNC, 3, format!("{}: action not found", ctx.chain()))),
        };

        if let Err(e) = session.save_previous_args() {
            warn!("previous args not saved: {}", e.tagged());
            session.eprint(sprint_msg(FUNC, 2, &format!("{}\n", e.message)));
        }
        result
    }

    /// Parse `args` without dispatching.
    pub fn parse<'a>(&'a self, args: &[String], session: &mut Session) -> Result<Option<(&'a Command, Context<'a>)>> {
        ngsi_run(self, args, session).map_err(|e| NgsiError::wrap("Parse", 1, e))
    }
}

/// Resolve the target host and build the clients the command asked for.
///
/// The host comes from `--host`, falling back to the remembered one. A host
/// different from the remembered one replaces it and drops the remembered
/// tenant and scope.
pub(crate) fn create_new_client(ctx: &mut Context<'_>, session: &mut Session) -> Result<()> {
    const FUNC: &str = "createNewClient";

    if let Some(host) = ctx.string_flag("host").cloned() {
        session.host = if host.value.is_empty() {
            session.settings.host.clone()
        } else {
            host.value.clone()
        };

        if session.settings.host != session.host {
            debug!("remembered host {} -> {}", session.settings.host, session.host);
            session.settings.host = session.host.clone();
            session.settings.tenant.clear();
            session.settings.scope.clear();
            session.updated = true;
        }

        if host.init_client {
            let client = new_client(ctx, session, host.skip_get_token, false)
                .map_err(|e| NgsiError::wrap(FUNC, 1, e))?;
            ctx.client = Some(client);
        }
    }

    if ctx.is_set("host2") {
        session.destination = ctx.string("host2");
        let client = new_client(ctx, session, false, true).map_err(|e| NgsiError::wrap(FUNC, 2, e))?;
        ctx.client2 = Some(client);
    }
    Ok(())
}

/// Per-client flag values; `…2` flags feed the destination client.
fn client_request(ctx: &Context<'_>, host: &str, skip_get_token: bool, dest: bool) -> ClientRequest {
    let suffix = if dest { "2" } else { "" };
    let value = |name: &str| {
        let name = format!("{}{}", name, suffix);
        ctx.is_set(&name).then(|| ctx.string(&name))
    };
    ClientRequest {
        host: host.to_string(),
        tenant: value("service"),
        scope: value("path"),
        token: value("oAuthToken"),
        skip_get_token,
        destination: dest,
    }
}

/// Build one client and check it against the command's server list.
pub(crate) fn new_client(ctx: &Context<'_>, session: &Session, skip_get_token: bool, dest: bool) -> Result<Client> {
    const FUNC: &str = "newClient";

    let host = if dest { &session.destination } else { &session.host };
    let request = client_request(ctx, host, skip_get_token, dest);

    let client = session.client_factory.new_client(session, &request).map_err(|e| {
        let mut msg = e.message.clone();
        if dest {
            msg.push_str(" (destination)");
        }
        NgsiError::with_source(FUNC, 2, msg, e)
    })?;

    if let Some(list) = ctx.server_list {
        let gate = client.gate_type();
        if !list.iter().any(|t| t.eq_ignore_ascii_case(&gate)) {
            let has = |t: &str| list.iter().any(|l| l.eq_ignore_ascii_case(t));
            if gate == "brokerld" && has("brokerv2") {
                return Err(NgsiError::new(FUNC, 3, "only available on NGSIv2"));
            }
            if gate == "brokerv2" && has("brokerld") {
                return Err(NgsiError::new(FUNC, 4, "only available on NGSI-LD"));
            }
            return Err(NgsiError::new(
                FUNC,
                5,
                format!("not supported by {}", client.server.kind()),
            ));
        }
    }

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::common_flags::{global_flags, host_required_flag, scope_flag, tenant_flag};
    use crate::client::ClientFactory;
    use crate::cli::flag::StringFlag;
    use crate::config::{MemoryStore, StoredConfig};
    use crate::server::{ServerRecord, ServerTable};
    use crate::settings::Settings;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn show(ctx: &Context<'_>, session: &mut Session, client: Option<&Client>) -> Result<()> {
        let client = client.ok_or_else(|| NgsiError::new("show", 1, "no client"))?;
        session.print(format!(
            "{} {} {} {}\n",
            client.url,
            client.ngsi_type,
            client.tenant,
            ctx.args().len()
        ));
        Ok(())
    }

    fn fail(_: &Context<'_>, _: &mut Session, _: Option<&Client>) -> Result<()> {
        Err(NgsiError::new("fail", 1, "boom"))
    }

    fn app() -> App {
        App::new("ngsi", "0.9.0")
            .flags(global_flags())
            .command(
                Command::new("show")
                    .flag(host_required_flag())
                    .flag(tenant_flag())
                    .flag(scope_flag())
                    .flag(StringFlag::new("host2"))
                    .flag(StringFlag::new("service2"))
                    .server_list(&["brokerv2"])
                    .action(show),
            )
            .command(Command::new("ld").flag(host_required_flag()).server_list(&["brokerld"]).action(show))
            .command(Command::new("fail").flag(host_required_flag()).action(fail))
            .command(Command::new("bare"))
            .command(Command::new("group").subcommand(Command::new("leaf").action(|_, _, _| Ok(()))))
    }

    fn config() -> StoredConfig {
        let mut servers = ServerTable::new();
        servers.insert("orion", ServerRecord::broker("http://orion:1026", "v2"));
        let mut ld = ServerRecord::broker("http://orion-ld:1026", "ld");
        ld.tenant = "openiot".into();
        servers.insert("orion-ld", ld);
        let mut comet = ServerRecord::broker("http://comet:8666", "");
        comet.server_type = "comet".into();
        servers.insert("comet", comet);
        StoredConfig {
            servers,
            ..StoredConfig::default()
        }
    }

    #[test]
    fn action_receives_client_and_previous_args_are_saved() {
        let store = MemoryStore::new(config());
        let (s, out, _) = Session::capture();
        let mut s = s.with_store(store.clone());
        app().run(&args(&["ngsi", "show", "--host", "orion", "-s", "smart"]), &mut s).unwrap();
        assert_eq!(out.contents(), "http://orion:1026 v2 smart 0\n");

        let saved = store.snapshot().settings;
        assert_eq!(saved.host, "orion");
        assert_eq!(saved.tenant, "smart");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn remembered_host_is_reused() {
        let mut cfg = config();
        cfg.settings = Settings {
            host: "orion".into(),
            tenant: "remembered".into(),
            ..Settings::default()
        };
        let (s, out, _) = Session::capture();
        let mut s = s.with_store(MemoryStore::new(cfg));
        app().run(&args(&["ngsi", "show"]), &mut s).unwrap();
        assert_eq!(out.contents(), "http://orion:1026 v2 remembered 0\n");
    }

    #[test]
    fn server_list_gate() {
        let cases = [
            (vec!["ngsi", "show", "--host", "orion-ld"], "newClient003 only available on NGSIv2"),
            (vec!["ngsi", "ld", "--host", "orion"], "newClient004 only available on NGSI-LD"),
            (vec!["ngsi", "show", "--host", "comet"], "newClient005 not supported by comet"),
        ];
        for (a, expected) in cases {
            let mut s = Session::sink().with_store(MemoryStore::new(config()));
            let err = app().run(&args(&a), &mut s).unwrap_err();
            let innermost = err.causes().last().map(crate::error::message).unwrap();
            assert_eq!(innermost, expected, "{a:?}");
        }
    }

    struct Refusing;

    impl ClientFactory for Refusing {
        fn new_client(&self, _: &Session, request: &ClientRequest) -> Result<Client> {
            Err(NgsiError::new("refuse", 1, format!("refused {}", request.host)))
        }
    }

    #[test]
    fn factory_errors_are_wrapped() {
        let mut s = Session::sink()
            .with_store(MemoryStore::new(config()))
            .with_client_factory(Refusing);
        let err = app().run(&args(&["ngsi", "show", "--host", "orion"]), &mut s).unwrap_err();
        assert_eq!(err.message, "refused orion");
        let chain: Vec<String> = err.causes().map(crate::error::message).collect();
        assert!(chain.contains(&"newClient002 refused orion".to_string()), "{chain:?}");
        assert!(chain.contains(&"createNewClient001 refused orion".to_string()), "{chain:?}");
    }

    #[test]
    fn destination_errors_are_marked() {
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let a = args(&["ngsi", "show", "--host", "orion", "--host2", "nowhere"]);
        let err = app().run(&a, &mut s).unwrap_err();
        assert_eq!(err.message, "error host: nowhere (destination)");
    }

    #[test]
    fn destination_client_uses_suffixed_flags() {
        let app = app();
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let a = args(&["ngsi", "show", "--host", "orion", "--host2", "localhost:1026", "--service2", "dest"]);
        let (_, ctx) = app.parse(&a, &mut s).unwrap().unwrap();
        let c2 = ctx.client2().unwrap();
        assert!(c2.destination);
        assert_eq!(c2.url, "http://localhost:1026");
        assert_eq!(c2.tenant, "dest");
        assert_eq!(ctx.client().unwrap().tenant, "");
    }

    #[test]
    fn destination_client_is_gated_by_the_server_list() {
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let a = args(&["ngsi", "show", "--host", "orion", "--host2", "orion-ld"]);
        let err = app().run(&a, &mut s).unwrap_err();
        assert_eq!(err.message, "only available on NGSIv2");
        let chain: Vec<String> = err.causes().map(crate::error::message).collect();
        assert!(chain.iter().any(|m| m.starts_with("createNewClient002")), "{chain:?}");
    }

    #[test]
    fn save_failure_does_not_fail_the_command() {
        let (s, _, err) = Session::capture();
        let mut s = s.with_store(MemoryStore::new(config()).failing());
        app().run(&args(&["ngsi", "show", "--host", "orion"]), &mut s).unwrap();
        assert_eq!(err.contents(), "Run002 read-only store\n");
    }

    #[test]
    fn action_errors_are_returned_after_saving() {
        let store = MemoryStore::new(config());
        let mut s = Session::sink().with_store(store.clone());
        let err = app().run(&args(&["ngsi", "fail", "--host", "orion"]), &mut s).unwrap_err();
        assert_eq!(err.tagged(), "fail001 boom");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn missing_action_and_group_help() {
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let err = app().run(&args(&["ngsi", "bare"]), &mut s).unwrap_err();
        assert_eq!(err.tagged(), "Run003 bare: action not found");

        let (s, out, _) = Session::capture();
        let mut s = s.with_store(MemoryStore::new(config()));
        app().run(&args(&["ngsi", "group"]), &mut s).unwrap();
        assert!(out.contents().starts_with("NAME:\n   ngsi group - \n"));
    }

    #[test]
    fn errors_are_swallowed_while_completing() {
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let a = args(&["ngsi", "nope", BASH_COMPLETION]);
        app().run(&a, &mut s).unwrap();

        let err = app().run(&args(&["ngsi", "nope"]), &mut s).unwrap_err();
        assert_eq!(err.tagged(), "Run001 nope not found");
    }

    #[test]
    fn parse_wraps_errors() {
        let app = app();
        let mut s = Session::sink().with_store(MemoryStore::new(config()));
        let err = app.parse(&args(&["ngsi", "nope"]), &mut s).err().unwrap();
        assert_eq!(err.tagged(), "Parse001 nope not found");
    }
}
