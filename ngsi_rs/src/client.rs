//! Broker clients handed to command actions.
//!
//! Building a client resolves the target host (registered alias or literal
//! address) and the request headers it will carry. No network I/O happens
//! here; transports consume the resolved [`Client`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{NgsiError, Result};
use crate::server::{ServerRecord, ServerRegistry, is_http};
use crate::session::Session;

static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(([1-9]?[0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([1-9]?[0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])(:[1-9][0-9]*)*$",
    )
    .expect("valid IP address pattern")
});

static LOCALHOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^localhost(:[1-9][0-9]{0,3})*$").expect("valid localhost pattern"));

const NGSI_LD_TYPES: &[&str] = &["ngsi-ld", "ld"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgsiType {
    V2,
    Ld,
}

impl NgsiType {
    pub fn as_str(self) -> &'static str {
        match self {
            NgsiType::V2 => "v2",
            NgsiType::Ld => "ld",
        }
    }
}

impl fmt::Display for NgsiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved broker endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub url: String,
    pub server: ServerRecord,
    pub ngsi_type: NgsiType,
    pub tenant: String,
    pub scope: String,
    pub token: String,
    pub skip_get_token: bool,
    pub insecure_skip_verify: bool,
    pub timeout_secs: i64,
    /// Built from `--host2`.
    pub destination: bool,
}

impl Client {
    /// Type used by command gates: `brokerv2`/`brokerld` for brokers, the
    /// record's server type otherwise.
    pub fn gate_type(&self) -> String {
        let kind = self.server.kind();
        if kind == "broker" {
            format!("{}{}", kind, self.ngsi_type)
        } else {
            kind.to_string()
        }
    }
}

/// Per-client values taken from command flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRequest {
    pub host: String,
    pub tenant: Option<String>,
    pub scope: Option<String>,
    pub token: Option<String>,
    pub skip_get_token: bool,
    pub destination: bool,
}

/// Builds clients for actions.
pub trait ClientFactory {
    fn new_client(&self, session: &Session, request: &ClientRequest) -> Result<Client>;
}

/// Default factory backed by the session's server table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryClientFactory;

fn is_ip_address(s: &str) -> bool {
    IP_ADDRESS.is_match(s)
}

fn is_localhost(s: &str) -> bool {
    LOCALHOST.is_match(s)
}

impl ClientFactory for RegistryClientFactory {
    fn new_client(&self, session: &Session, request: &ClientRequest) -> Result<Client> {
        const FUNC: &str = "NewClient";

        let name = request.host.as_str();
        let (url, server) = if is_http(name) {
            (name.to_string(), ServerRecord::broker(name, ""))
        } else {
            // strip any path or query given with an alias
            let alias = name.split(['/', '?']).next().unwrap_or_default();
            if session.servers.contains(alias) {
                let record = session
                    .servers
                    .lookup(alias, false)
                    .map_err(|e| NgsiError::wrap(FUNC, 1, e))?;
                let url = record.host().trim_end_matches('/').to_string();
                (url, record)
            } else if is_ip_address(alias) || is_localhost(alias) {
                let url = format!("http://{}", alias);
                (url.clone(), ServerRecord::broker(&url, ""))
            } else {
                let msg = if alias.is_empty() {
                    "host not found".to_string()
                } else {
                    format!("error host: {}", alias)
                };
                return Err(NgsiError::new(FUNC, 2, msg));
            }
        };

        let ngsi_type = if NGSI_LD_TYPES.contains(&server.ngsi_type.to_lowercase().as_str()) {
            NgsiType::Ld
        } else {
            NgsiType::V2
        };

        let pick = |flag: &Option<String>, stored: &str| match flag {
            Some(v) => v.clone(),
            None => stored.to_string(),
        };
        let client = Client {
            tenant: pick(&request.tenant, &server.tenant),
            scope: pick(&request.scope, &server.scope),
            token: pick(&request.token, &server.token),
            url,
            ngsi_type,
            skip_get_token: request.skip_get_token,
            insecure_skip_verify: session.insecure_skip_verify,
            timeout_secs: session.timeout,
            destination: request.destination,
            server,
        };
        debug!(
            "client {} ({}) for {}",
            client.url, client.ngsi_type, request.host
        );
        Ok(client)
    }
}
