//! Configuration file support.
//!
//! The configuration lives in `ngsi-go-config.json` inside the user config
//! directory (`<config_dir>/fiware/`) unless `--config` or `--configDir`
//! point elsewhere. It holds the previous-args record and the server table;
//! other top-level keys are carried through untouched.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NgsiError, Result};
use crate::server::ServerTable;
use crate::settings::Settings;

pub const CONFIG_FILE_NAME: &str = "ngsi-go-config.json";
const CONFIG_SUBDIR: &str = "fiware";

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, rename = "brokers", alias = "servers")]
    pub servers: ServerTable,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted settings collaborator.
pub trait SettingsStore {
    fn load(&self) -> Result<StoredConfig>;
    fn save(&mut self, config: &StoredConfig) -> Result<()>;
    /// Backing file, if any.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Where the configuration file is, given `--config` and `--configDir`.
///
/// `Some("")` for `config` disables persistence and yields `None`.
pub fn resolve_config_path(config: Option<&str>, config_dir: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(file) = config {
        if file.is_empty() {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(file)));
    }
    let dir = match config_dir {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or_else(|| NgsiError::new("resolveConfigPath", 1, "config directory not found"))?
            .join(CONFIG_SUBDIR),
    };
    Ok(Some(dir.join(CONFIG_FILE_NAME)))
}

// ============================================================================
// JSON file
// ============================================================================

/// File-backed store. A store without a path never touches the disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<StoredConfig> {
        const FUNC: &str = "loadConfig";

        let Some(path) = &self.path else {
            return Ok(StoredConfig::default());
        };
        if !path.exists() {
            debug!("config file {} not found, using defaults", path.display());
            return Ok(StoredConfig::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            NgsiError::with_source(FUNC, 1, format!("{}: {}", path.display(), e), e)
        })?;
        if content.trim().is_empty() {
            return Ok(StoredConfig::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            NgsiError::with_source(FUNC, 2, format!("{}: {}", path.display(), e), e)
        })
    }

    fn save(&mut self, config: &StoredConfig) -> Result<()> {
        const FUNC: &str = "saveConfig";

        let Some(path) = &self.path else {
            debug!("persistence disabled, config not saved");
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                NgsiError::with_source(FUNC, 1, format!("{}: {}", parent.display(), e), e)
            })?;
        }
        let body = serde_json::to_string_pretty(config)
            .map_err(|e| NgsiError::with_source(FUNC, 2, e.to_string(), e))?;

        let mut file = open_private(path).map_err(|e| {
            NgsiError::with_source(FUNC, 3, format!("{}: {}", path.display(), e), e)
        })?;
        writeln!(file, "{}", body).map_err(|e| {
            NgsiError::with_source(FUNC, 4, format!("{}: {}", path.display(), e), e)
        })?;
        debug!("config saved to {}", path.display());
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// ============================================================================
// In memory
// ============================================================================

/// Store kept in memory; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<StoredConfig>>,
    saves: Rc<RefCell<usize>>,
    fail_save: bool,
}

impl MemoryStore {
    pub fn new(config: StoredConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(config)),
            ..Self::default()
        }
    }

    /// Every save fails; used to exercise best-effort persistence.
    pub fn failing(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn snapshot(&self) -> StoredConfig {
        self.inner.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<StoredConfig> {
        Ok(self.snapshot())
    }

    fn save(&mut self, config: &StoredConfig) -> Result<()> {
        if self.fail_save {
            return Err(NgsiError::new("saveConfig", 3, "read-only store"));
        }
        *self.inner.borrow_mut() = config.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
