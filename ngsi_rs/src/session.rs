//! Process-wide state shared by the engine and command actions.
//!
//! One [`Session`] lives for one invocation: it owns the output sinks, the
//! loaded configuration (previous args + server table), the dirty bit and
//! the options resolved from global flags.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ClientFactory, RegistryClientFactory};
use crate::config::{SettingsStore, StoredConfig};
use crate::error::{NgsiError, Result};
use crate::logging::LogLevel;
use crate::server::ServerTable;
use crate::settings::Settings;

pub const DEFAULT_MARGIN: i64 = 180;
pub const DEFAULT_TIMEOUT: i64 = 60;
pub const DEFAULT_MAX_COUNT: i64 = 100;

pub struct Session {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    /// Live previous-args record.
    pub settings: Settings,
    pub servers: ServerTable,
    /// Top-level configuration keys this crate does not interpret.
    pub extra: Map<String, Value>,
    pub store: Option<Box<dyn SettingsStore>>,
    pub client_factory: Box<dyn ClientFactory>,
    /// Settings changed and should be written back.
    pub updated: bool,
    pub host: String,
    pub destination: String,
    pub batch: bool,
    pub margin: i64,
    pub timeout: i64,
    pub max_count: i64,
    pub insecure_skip_verify: bool,
    pub stderr_level: LogLevel,
    pub syslog_level: LogLevel,
    pub cache_file: Option<String>,
}

impl Session {
    pub fn new(stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        Self {
            stdout,
            stderr,
            settings: Settings::default(),
            servers: ServerTable::new(),
            extra: Map::new(),
            store: None,
            client_factory: Box::new(RegistryClientFactory),
            updated: false,
            host: String::new(),
            destination: String::new(),
            batch: false,
            margin: DEFAULT_MARGIN,
            timeout: DEFAULT_TIMEOUT,
            max_count: DEFAULT_MAX_COUNT,
            insecure_skip_verify: false,
            stderr_level: LogLevel::Err,
            syslog_level: LogLevel::Off,
            cache_file: None,
        }
    }

    /// Session discarding all output.
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()), Box::new(io::sink()))
    }

    /// Session capturing stdout and stderr.
    pub fn capture() -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let session = Self::new(Box::new(out.clone()), Box::new(err.clone()));
        (session, out, err)
    }

    /// Use `store` instead of the file selected by `--config`/`--configDir`.
    pub fn with_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_client_factory(mut self, factory: impl ClientFactory + 'static) -> Self {
        self.client_factory = Box::new(factory);
        self
    }

    /// Write to stdout. Write failures are ignored like a closed pipe.
    pub fn print(&mut self, s: impl AsRef<str>) {
        let _ = self.stdout.write_all(s.as_ref().as_bytes());
    }

    /// Write a diagnostic to stderr.
    pub fn eprint(&mut self, s: impl AsRef<str>) {
        let _ = self.stderr.write_all(s.as_ref().as_bytes());
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
        let _ = self.stderr.flush();
    }

    /// Replace the loaded state with what the store holds.
    pub fn load_config(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let cfg = store.load()?;
        self.settings = cfg.settings;
        self.servers = cfg.servers;
        self.extra = cfg.extra;
        Ok(())
    }

    pub fn stored_config(&self) -> StoredConfig {
        StoredConfig {
            settings: self.settings.clone(),
            servers: self.servers.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Write the configuration back. Batch runs never persist.
    pub fn save_config(&mut self) -> Result<()> {
        if self.batch {
            debug!("batch mode, config not saved");
            return Ok(());
        }
        let cfg = self.stored_config();
        match self.store.as_mut() {
            Some(store) => store.save(&cfg),
            None => Err(NgsiError::new("saveConfig", 5, "settings store not initialized")),
        }
    }

    /// Persist previous args when they changed and are in use.
    pub fn save_previous_args(&mut self) -> Result<()> {
        if !(self.updated && self.settings.use_previous_args) {
            return Ok(());
        }
        self.save_config()?;
        self.updated = false;
        Ok(())
    }
}

/// Cloneable in-memory writer; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
