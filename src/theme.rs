//! Theme preference
//!
//! The light/dark choice is owned by a [`ThemeContext`] created at bootstrap and handed
//! to whatever needs it. The context reads the stored preference once and writes it
//! back on every change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use crate::domain::events::{DomainEvent, ThemeEvent};

/// Key the preference is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self { Theme::Dark => Theme::Light, Theme::Light => Theme::Dark }
    }

    pub fn as_str(&self) -> &'static str {
        match self { Theme::Dark => "dark", Theme::Light => "light" }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Theme {
    type Err = StoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(StoreError::BadValue { key: THEME_KEY, value: other.to_string() }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("preference file {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("preference file {path} is not a JSON object: {source}")]
    Format { path: PathBuf, #[source] source: serde_json::Error },
    #[error("stored value `{value}` for `{key}` is not valid")]
    BadValue { key: &'static str, value: String },
    #[error("preference store lock poisoned")]
    Poisoned,
}

/// Persistent string key/value storage.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().map_err(|_| StoreError::Poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().map_err(|_| StoreError::Poisoned)?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten whole on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens `path`, treating a missing file as empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Format { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, values: Mutex::new(values) })
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().map_err(|_| StoreError::Poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&*values)
            .map_err(|source| StoreError::Format { path: self.path.clone(), source })?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }
}

pub struct ThemeContext {
    theme: Theme,
    store: Arc<dyn PreferenceStore>,
    events: Vec<DomainEvent>,
}

impl fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeContext").field("theme", &self.theme).finish_non_exhaustive()
    }
}

impl ThemeContext {
    /// Reads the stored preference. Unreadable or unknown values fall back to the
    /// default theme.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let theme = match store.get(THEME_KEY).and_then(|v| v.map(|v| v.parse::<Theme>()).transpose()) {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring stored theme preference");
                Theme::default()
            }
        };
        tracing::debug!(%theme, "theme loaded");
        Self { theme, store, events: vec![] }
    }

    pub fn theme(&self) -> Theme { self.theme }

    pub fn set(&mut self, theme: Theme) -> Result<Theme, StoreError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        if theme != self.theme {
            self.theme = theme;
            self.events.push(DomainEvent::Theme(ThemeEvent::Changed { theme }));
        }
        Ok(theme)
    }

    pub fn toggle(&mut self) -> Result<Theme, StoreError> { self.set(self.theme.toggled()) }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        let ctx = ThemeContext::load(Arc::new(MemoryStore::default()));
        assert_eq!(ctx.theme(), Theme::Light);
    }

    #[test]
    fn test_bad_value_falls_back() {
        let store = Arc::new(MemoryStore::default());
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeContext::load(store).theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_writes_through() {
        let store = Arc::new(MemoryStore::default());
        let mut ctx = ThemeContext::load(store.clone());
        assert_eq!(ctx.toggle().unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(ctx.take_events(), vec![DomainEvent::Theme(ThemeEvent::Changed { theme: Theme::Dark })]);
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let mut ctx = ThemeContext::load(Arc::new(FileStore::open(&path).unwrap()));
            ctx.set(Theme::Dark).unwrap();
        }
        let ctx = ThemeContext::load(Arc::new(FileStore::open(&path).unwrap()));
        assert_eq!(ctx.theme(), Theme::Dark);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Format { .. })));
    }
}
