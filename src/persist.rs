//! Persisted engine state.
//!
//! The engine keeps three kinds of records across restarts: per-window
//! settings, per-layout settings and the `(desktop, screen) -> group` table.
//! They live in a flat string key-value store behind [`StateBackend`];
//! [`Persistence`] wraps it with typed accessors. Malformed records count
//! as absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::WindowId;
use crate::surface::UNMAPPED_GROUP;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access state file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat string store.
pub trait StateBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String) -> Result<(), PersistError>;
}

/// Volatile store, used by tests and the simulator
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store kept as a single JSON object on disk, rewritten on every put.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileBackend {
    /// Open the state file, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| PersistError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PersistError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    /// Default state file path (~/.local/share/tessel/state.json)
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tessel")
            .join("state.json")
    }

    fn flush(&self) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            PersistError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

impl StateBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Per-window record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub group: i32,
    pub minimized: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            group: UNMAPPED_GROUP,
            minimized: false,
        }
    }
}

/// Per-layout record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutState {
    /// Root split angle, one of 0, 90, 180, 270
    pub rotation: u16,
    pub num_master_tiles: usize,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            rotation: 0,
            num_master_tiles: 1,
        }
    }
}

/// Typed access to the persisted state
pub struct Persistence {
    backend: Box<dyn StateBackend>,
}

impl Persistence {
    pub fn new(backend: Box<dyn StateBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.backend.get(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring malformed state for {}: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to serialize state for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.backend.put(key, text) {
            log::warn!("Failed to persist {}: {}", key, e);
        }
    }

    pub fn window_config(&self, window: WindowId) -> Option<WindowConfig> {
        self.read(&format!("window/{}", window.0))
    }

    pub fn set_window_config(&mut self, window: WindowId, config: &WindowConfig) {
        self.write(&format!("window/{}", window.0), config);
    }

    pub fn layout_state(&self, uid: &str) -> LayoutState {
        self.read(&format!("layout/{}", uid)).unwrap_or_default()
    }

    pub fn set_layout_state(&mut self, uid: &str, state: &LayoutState) {
        self.write(&format!("layout/{}", uid), state);
    }

    /// Group shown on `screen` of `desktop`, initialising the entry on first read.
    pub fn surface_group(&mut self, desktop: u32, screen: usize, screen_count: usize) -> i32 {
        let key = format!("group/{}/{}", desktop, screen);
        if let Some(group) = self.read::<i32>(&key) {
            return group;
        }
        let group = (desktop.max(1) as i32 - 1) * screen_count as i32 + screen as i32 + 1;
        log::debug!("Initialising {}:{} to group {}", desktop, screen, group);
        self.write(&key, &group);
        group
    }

    pub fn set_surface_group(&mut self, desktop: u32, screen: usize, group: i32) {
        log::debug!("Mapping {}:{} to group {}", desktop, screen, group);
        self.write(&format!("group/{}/{}", desktop, screen), &group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_group_formula() {
        let mut store = Persistence::in_memory();
        assert_eq!(store.surface_group(1, 0, 2), 1);
        assert_eq!(store.surface_group(1, 1, 2), 2);
        assert_eq!(store.surface_group(3, 1, 2), 6);
    }

    #[test]
    fn test_group_written_back_and_overridable() {
        let mut store = Persistence::in_memory();
        assert_eq!(store.surface_group(2, 0, 3), 4);
        store.set_surface_group(2, 0, 7);
        assert_eq!(store.surface_group(2, 0, 3), 7);
        store.set_surface_group(2, 0, UNMAPPED_GROUP);
        assert_eq!(store.surface_group(2, 0, 3), UNMAPPED_GROUP);
    }

    #[test]
    fn test_malformed_record_is_absent() {
        let mut backend = MemoryBackend::new();
        backend.put("layout/0#1/spiral", "{not json".to_string()).unwrap();
        backend.put("window/7", "[]".to_string()).unwrap();
        let store = Persistence::new(Box::new(backend));
        assert_eq!(store.layout_state("0#1/spiral"), LayoutState::default());
        assert_eq!(store.window_config(WindowId(7)), None);
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let mut backend = MemoryBackend::new();
        backend
            .put("layout/x", r#"{"rotation": 90}"#.to_string())
            .unwrap();
        let store = Persistence::new(Box::new(backend));
        let state = store.layout_state("x");
        assert_eq!(state.rotation, 90);
        assert_eq!(state.num_master_tiles, 1);
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = Persistence::new(Box::new(FileBackend::open(&path).unwrap()));
        store.set_window_config(
            WindowId(3),
            &WindowConfig {
                group: 4,
                minimized: true,
            },
        );

        let store = Persistence::new(Box::new(FileBackend::open(&path).unwrap()));
        assert_eq!(
            store.window_config(WindowId(3)),
            Some(WindowConfig {
                group: 4,
                minimized: true
            })
        );
    }

    #[test]
    fn test_file_backend_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(
            FileBackend::open(&path),
            Err(PersistError::Json { .. })
        ));
    }
}
