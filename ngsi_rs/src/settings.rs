//! Previous-args record remembered across invocations.

use serde::{Deserialize, Serialize};

/// Values reused as defaults by later invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "usePreviousArgs")]
    pub use_previous_args: bool,
    pub syslog: String,
    pub stderr: String,
    pub logfile: String,
    pub loglevel: String,
    #[serde(rename = "cachefile")]
    pub cache_file: String,
    pub host: String,
    pub tenant: String,
    pub scope: String,
    pub token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_previous_args: true,
            syslog: String::new(),
            stderr: String::new(),
            logfile: String::new(),
            loglevel: String::new(),
            cache_file: String::new(),
            host: String::new(),
            tenant: String::new(),
            scope: String::new(),
            token: String::new(),
        }
    }
}

impl Settings {
    /// Settings used by `--batch` runs: nothing remembered, nothing read back.
    pub fn batch() -> Self {
        Self {
            use_previous_args: false,
            ..Self::default()
        }
    }

    /// Forget every remembered value. The toggle and cache path are kept.
    pub fn clear_values(&mut self) {
        self.host.clear();
        self.tenant.clear();
        self.scope.clear();
        self.token.clear();
        self.syslog.clear();
        self.stderr.clear();
        self.logfile.clear();
        self.loglevel.clear();
    }

    /// Forget one item by user-facing name. Returns false for unknown names.
    ///
    /// Clearing the host also drops tenant and scope, which only make sense
    /// relative to it.
    pub fn delete_item(&mut self, item: &str) -> bool {
        match item.to_lowercase().as_str() {
            "host" => self.host.clear(),
            "service" | "fiware-service" | "tenant" => self.tenant.clear(),
            "path" | "fiware-servicepath" | "scope" => self.scope.clear(),
            "token" => self.token.clear(),
            "syslog" => self.syslog.clear(),
            "stderr" => self.stderr.clear(),
            "logfile" | "loglevel" => {
                self.logfile.clear();
                self.loglevel.clear();
            }
            _ => return false,
        }
        if self.host.is_empty() {
            self.tenant.clear();
            self.scope.clear();
        }
        true
    }

    /// Display label and value pairs, in the order help and `settings list` print them.
    pub fn display_items(&self) -> [(&'static str, &str); 8] {
        [
            ("Host", &self.host),
            ("FIWARE-Service", &self.tenant),
            ("FIWARE-ServicePath", &self.scope),
            ("Token", &self.token),
            ("Syslog", &self.syslog),
            ("Stderr", &self.stderr),
            ("LogFile", &self.logfile),
            ("LogLevel", &self.loglevel),
        ]
    }
}
