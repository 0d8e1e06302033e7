// SPDX-License-Identifier: LGPL-3.0-only

//! A preference store backed by a TOML file.
//!
//! The file is a flat table of string keys and values:
//!
//! ```toml
//! theme = "dark"
//! ```
//!
//! Every process that opens the same file shares one origin. Changes made by
//! other processes are picked up by [FileStore::poll_changes], which diffs the
//! file against the last known contents and notifies subscribers once per
//! changed key. Writes made through this instance update the known contents
//! first, so they are never reported back.

use crate::error::{StoreError, StoreResult};
use crate::store::{PreferenceStore, StorageEvent};
use dusk_core::signal::{Listener, Listeners, Subscription};
use indexmap::IndexMap;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use xdg::BaseDirectories;

/// Directory prefix under `$XDG_CONFIG_HOME`.
pub const CONFIG_PREFIX: &str = "dusk";

/// File name of the default preference file.
pub const PREFERENCES_FILE: &str = "preferences.toml";

type Preferences = IndexMap<String, String>;

struct FileWatch {
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Result<Event>>,
}

/// A file-backed [PreferenceStore].
pub struct FileStore {
    path: PathBuf,
    known: RefCell<Preferences>,
    listeners: Rc<Listeners<StorageEvent>>,
    watch: RefCell<Option<FileWatch>>,
}

impl FileStore {
    /// Open the store at `path`. The file does not need to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let known = load(&path)?;
        log::debug!("Opened preference file {:?} with {} key(s)", path, known.len());
        Ok(Self {
            path,
            known: RefCell::new(known),
            listeners: Listeners::new(),
            watch: RefCell::new(None),
        })
    }

    /// Open `$XDG_CONFIG_HOME/dusk/preferences.toml`.
    pub fn open_default() -> StoreResult<Self> {
        let xdg_dirs = BaseDirectories::with_prefix(CONFIG_PREFIX)
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        let path = xdg_dirs.place_config_file(PREFERENCES_FILE)?;
        Self::open(path)
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching the file for changes made by other processes.
    ///
    /// Once watching, [FileStore::poll_changes] only re-reads the file when
    /// the watcher reported activity on it.
    pub fn watch(&self) -> StoreResult<()> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;

        // Writes replace the file, so watch the directory.
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        log::info!("Watching preference file {:?}", self.path);
        *self.watch.borrow_mut() = Some(FileWatch {
            _watcher: watcher,
            events: rx,
        });
        Ok(())
    }

    /// Whether [FileStore::watch] succeeded.
    pub fn is_watching(&self) -> bool {
        self.watch.borrow().is_some()
    }

    /// Dispatch changes made to the file since the last poll (non-blocking).
    ///
    /// Without a watcher every call re-reads the file. Returns the number of
    /// notifications dispatched.
    pub fn poll_changes(&self) -> usize {
        let relevant = match &*self.watch.borrow() {
            Some(watch) => {
                let mut relevant = false;
                while let Ok(event) = watch.events.try_recv() {
                    match event {
                        Ok(event) => relevant |= self.concerns_file(&event),
                        Err(e) => log::warn!("Preference file watcher error: {}", e),
                    }
                }
                relevant
            },
            None => true,
        };

        if relevant {
            self.rescan()
        } else {
            0
        }
    }

    /// Re-read the file and dispatch one notification per changed key.
    pub fn rescan(&self) -> usize {
        let current = match load(&self.path) {
            Ok(current) => current,
            Err(e) => {
                log::error!("Failed to re-read preference file: {}", e);
                return 0;
            },
        };

        let events = {
            let mut known = self.known.borrow_mut();
            let events = diff(&known, &current);
            *known = current;
            events
        };

        for event in &events {
            log::debug!("Preference '{:?}' changed externally", event.key);
            self.listeners.emit(event);
        }
        events.len()
    }

    fn concerns_file(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        let name = self.path.file_name();
        event
            .paths
            .iter()
            .any(|path| path == &self.path || path.file_name() == name)
    }

    /// Read-modify-write of one key. Other keys changed externally since the
    /// last poll stay unknown, so they are still reported.
    fn update(&self, key: &str, value: Option<&str>) -> StoreResult<()> {
        let mut contents = load(&self.path)?;
        let changed = match value {
            Some(value) => {
                contents
                    .insert(key.to_string(), value.to_string())
                    .as_deref()
                    != Some(value)
            },
            None => contents.shift_remove(key).is_some(),
        };
        if changed {
            save(&self.path, &contents)?;
        }

        let mut known = self.known.borrow_mut();
        match value {
            Some(value) => {
                known.insert(key.to_string(), value.to_string());
            },
            None => {
                known.shift_remove(key);
            },
        }
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        match load(&self.path) {
            Ok(mut contents) => contents.shift_remove(key).filter(|v| !v.is_empty()),
            Err(e) => {
                log::error!("Failed to read preference '{}': {}", key, e);
                None
            },
        }
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.update(key, None)
    }

    fn subscribe(&self, listener: Listener<StorageEvent>) -> Subscription {
        self.listeners.add(listener)
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("watching", &self.is_watching())
            .finish()
    }
}

fn load(path: &Path) -> StoreResult<Preferences> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Preferences::new()),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&text).map_err(|e| StoreError::parse(path, e.to_string()))
}

fn save(path: &Path, contents: &Preferences) -> StoreResult<()> {
    let text = toml::to_string(contents).map_err(|e| StoreError::Serialize(e.to_string()))?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| PREFERENCES_FILE.to_string());
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp, text)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

fn diff(before: &Preferences, after: &Preferences) -> Vec<StorageEvent> {
    let mut events = Vec::new();
    for (key, value) in after {
        let old = before.get(key);
        if old != Some(value) {
            events.push(StorageEvent::changed(key.clone(), old.cloned(), Some(value.clone())));
        }
    }
    for (key, value) in before {
        if !after.contains_key(key) {
            events.push(StorageEvent::changed(key.clone(), Some(value.clone()), None));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(pairs: &[(&str, &str)]) -> Preferences {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_diff_reports_changes_and_removals() {
        let before = prefs(&[("theme", "light"), ("locale", "en")]);
        let after = prefs(&[("theme", "dark"), ("accent", "blue")]);

        let events = diff(&before, &after);
        assert_eq!(
            events,
            vec![
                StorageEvent::changed("theme", Some("light".into()), Some("dark".into())),
                StorageEvent::changed("accent", None, Some("blue".into())),
                StorageEvent::changed("locale", Some("en".into()), None),
            ]
        );
    }

    #[test]
    fn test_diff_of_equal_contents_is_empty() {
        let contents = prefs(&[("theme", "dark")]);
        assert!(diff(&contents, &contents).is_empty());
    }
}
