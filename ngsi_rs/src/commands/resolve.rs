//! `ngsi resolve` - show the broker endpoint a host resolves to.

use crate::cli::command::Command;
use crate::cli::common_flags::{host_required_flag, oauth_token_flag, scope_flag, tenant_flag};
use crate::cli::context::Context;
use crate::client::Client;
use crate::error::{NgsiError, Result};
use crate::session::Session;

pub(super) fn command() -> Command {
    Command::new("resolve")
        .category("CONVENIENCE")
        .usage("resolve a host to its broker endpoint")
        .flag(host_required_flag())
        .flag(tenant_flag())
        .flag(scope_flag())
        .flag(oauth_token_flag())
        .server_list(&["brokerv2", "brokerld"])
        .action(resolve)
}

fn resolve(_: &Context<'_>, session: &mut Session, client: Option<&Client>) -> Result<()> {
    let client = client.ok_or_else(|| NgsiError::new("resolve", 1, "client not found"))?;

    let mut out = format!("URL: {}\nNGSI: {}\n", client.url, client.ngsi_type);
    if !client.tenant.is_empty() {
        out.push_str(&format!("FIWARE-Service: {}\n", client.tenant));
    }
    if !client.scope.is_empty() {
        out.push_str(&format!("FIWARE-ServicePath: {}\n", client.scope));
    }
    session.print(out);
    Ok(())
}
