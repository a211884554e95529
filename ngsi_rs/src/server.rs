//! Registered brokers and servers, looked up by alias.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NgsiError, Result};

/// Static metadata about one registered server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server_type: String,
    /// Either an http(s) URL or the alias of another record.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server_host: String,
    /// Older configuration files store the URL here.
    #[serde(rename = "brokerHost", skip_serializing_if = "String::is_empty")]
    pub broker_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub broker_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ngsi_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub idm_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub idm_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tenant: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub safe_string: String,
    /// Credentials and anything else this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ServerRecord {
    pub fn broker(host: &str, ngsi_type: &str) -> Self {
        Self {
            server_type: "broker".to_string(),
            server_host: host.to_string(),
            ngsi_type: ngsi_type.to_string(),
            ..Self::default()
        }
    }

    /// URL (or referenced alias) of this record.
    pub fn host(&self) -> &str {
        if self.server_host.is_empty() {
            &self.broker_host
        } else {
            &self.server_host
        }
    }

    /// Record type, `broker` when unspecified.
    pub fn kind(&self) -> &str {
        if self.server_type.is_empty() {
            "broker"
        } else {
            &self.server_type
        }
    }
}

pub fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Lookup of server metadata by alias.
pub trait ServerRegistry {
    /// Resolve `alias`. Unless `skip_ref_host`, a record pointing at another
    /// alias is merged with that alias' record (one level only).
    fn lookup(&self, alias: &str, skip_ref_host: bool) -> Result<ServerRecord>;

    /// All known aliases, sorted.
    fn aliases(&self) -> Vec<&str>;
}

/// The `brokers` table of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerTable(BTreeMap<String, ServerRecord>);

impl ServerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: &str, record: ServerRecord) {
        self.0.insert(alias.to_string(), record);
    }

    pub fn get(&self, alias: &str) -> Option<&ServerRecord> {
        self.0.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.0.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServerRecord)> {
        self.0.iter()
    }
}

impl ServerRegistry for ServerTable {
    fn lookup(&self, alias: &str, skip_ref_host: bool) -> Result<ServerRecord> {
        const FUNC: &str = "lookupServer";

        if alias.is_empty() {
            return Err(NgsiError::new(FUNC, 1, "host not found"));
        }
        let record = self
            .0
            .get(alias)
            .ok_or_else(|| NgsiError::new(FUNC, 2, format!("{} not found", alias)))?;

        let host = record.host();
        if skip_ref_host || is_http(host) {
            return Ok(record.clone());
        }
        if host.is_empty() {
            return Err(NgsiError::new(FUNC, 3, "host not found"));
        }

        let target = self
            .0
            .get(host)
            .ok_or_else(|| NgsiError::new(FUNC, 4, format!("{} not found", host)))?;
        if !is_http(target.host()) {
            return Err(NgsiError::new(
                FUNC,
                5,
                format!("url error: {}", target.host()),
            ));
        }

        let mut merged = target.clone();
        if !record.tenant.is_empty() {
            merged.tenant = record.tenant.clone();
        }
        if !record.scope.is_empty() {
            merged.scope = record.scope.clone();
        }
        if !record.token.is_empty() {
            merged.token = record.token.clone();
        }
        Ok(merged)
    }

    fn aliases(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ServerTable {
        let mut t = ServerTable::new();
        t.insert("orion", ServerRecord::broker("http://localhost:1026", "v2"));
        t.insert(
            "orion-ld",
            ServerRecord::broker("http://localhost:1026/", "ld"),
        );
        let mut alias = ServerRecord {
            server_host: "orion".into(),
            tenant: "openiot".into(),
            ..ServerRecord::default()
        };
        alias.scope = "/iot".into();
        t.insert("myiot", alias);
        t.insert(
            "dangling",
            ServerRecord {
                server_host: "nowhere".into(),
                ..ServerRecord::default()
            },
        );
        t
    }

    #[test]
    fn lookup_direct_record() {
        let r = table().lookup("orion", false).unwrap();
        assert_eq!(r.host(), "http://localhost:1026");
        assert_eq!(r.kind(), "broker");
    }

    #[test]
    fn lookup_follows_reference_keeping_own_tenant() {
        let r = table().lookup("myiot", false).unwrap();
        assert_eq!(r.host(), "http://localhost:1026");
        assert_eq!(r.ngsi_type, "v2");
        assert_eq!(r.tenant, "openiot");
        assert_eq!(r.scope, "/iot");
    }

    #[test]
    fn skip_ref_host_returns_record_unchanged() {
        let r = table().lookup("myiot", true).unwrap();
        assert_eq!(r.host(), "orion");
    }

    #[test]
    fn lookup_errors() {
        let t = table();
        assert_eq!(
            t.lookup("", false).unwrap_err().tagged(),
            "lookupServer001 host not found"
        );
        assert_eq!(
            t.lookup("unknown", false).unwrap_err().tagged(),
            "lookupServer002 unknown not found"
        );
        assert_eq!(
            t.lookup("dangling", false).unwrap_err().tagged(),
            "lookupServer004 nowhere not found"
        );
    }

    #[test]
    fn aliases_are_sorted() {
        assert_eq!(
            table().aliases(),
            vec!["dangling", "myiot", "orion", "orion-ld"]
        );
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let json = r#"{"orion":{"serverType":"broker","serverHost":"http://o","password":"x"}}"#;
        let t: ServerTable = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&t).unwrap();
        assert_eq!(out["orion"]["password"], "x");
        assert_eq!(out["orion"]["serverHost"], "http://o");
        assert!(out["orion"].get("tenant").is_none());
    }

    #[test]
    fn legacy_broker_host_field() {
        let json = r#"{"old":{"brokerHost":"http://legacy:1026","ngsiType":"v2"}}"#;
        let t: ServerTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.lookup("old", false).unwrap().host(), "http://legacy:1026");
    }
}
