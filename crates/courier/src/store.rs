//! Persistence of generated collections.
//!
//! # Overview
//!
//! - [`LocalStore`] keeps the document on disk. [`FsStore`] writes
//!   `<directory>/<file_name>` and rotates the previous version into
//!   `<directory>/history/`.
//! - [`RemoteStore`] publishes to a collection service. [`MemoryRemote`] is an
//!   in-process implementation for dry runs and tests.
//!
//! Store failures are reported as [`CourierError`]; whether a failure aborts
//! the cycle is decided by [`Generator`](crate::sync::Generator).

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use chrono::Utc;
use courier_core::Document;
use indexmap::IndexMap;

use crate::config::OutputConfig;
use crate::error::{CourierError, CourierResult};

const HISTORY_DIR: &str = "history";

pub trait LocalStore {
    /// Persist `document`, returning the path written.
    fn save(&self, document: &Document) -> CourierResult<PathBuf>;

    /// The last saved document, `None` when nothing was saved yet.
    fn load(&self) -> CourierResult<Option<Document>>;
}

/// Collection file on the local filesystem, with rotated history.
#[derive(Debug, Clone)]
pub struct FsStore {
    directory: PathBuf,
    file_name: String,
    keep: usize,
}

impl FsStore {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>, keep: usize) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            keep,
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.directory, &output.file_name, output.keep)
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn history_dir(&self) -> PathBuf {
        self.directory.join(HISTORY_DIR)
    }

    fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    /// History files of this store, oldest first.
    pub fn history(&self) -> CourierResult<Vec<PathBuf>> {
        let dir = self.history_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}-", self.stem());
        let mut files: Vec<PathBuf> = collect_files(&dir)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".json"))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Copy the current file into history, then drop the oldest entries past `keep`.
    fn rotate(&self, current: &Path) -> CourierResult<()> {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%9f").to_string();
        self.rotate_at(current, &timestamp)
    }

    fn rotate_at(&self, current: &Path, timestamp: &str) -> CourierResult<()> {
        if self.keep == 0 {
            return Ok(());
        }
        let dir = self.history_dir();
        std::fs::create_dir_all(&dir).map_err(|e| CourierError::io(&dir, e))?;

        // fixed-width sequence so same-instant copies still sort oldest first
        let mut n = 0;
        let mut target = dir.join(format!("{}-{timestamp}-{n:04}.json", self.stem()));
        while target.exists() {
            n += 1;
            target = dir.join(format!("{}-{timestamp}-{n:04}.json", self.stem()));
        }
        std::fs::copy(current, &target).map_err(|e| CourierError::io(&target, e))?;
        tracing::debug!(path = %target.display(), "rotated previous collection");

        let history = self.history()?;
        let excess = history.len().saturating_sub(self.keep);
        for old in &history[..excess] {
            std::fs::remove_file(old).map_err(|e| CourierError::io(old, e))?;
            tracing::debug!(path = %old.display(), "pruned collection history");
        }
        Ok(())
    }
}

impl LocalStore for FsStore {
    fn save(&self, document: &Document) -> CourierResult<PathBuf> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| CourierError::io(&self.directory, e))?;

        let path = self.path();
        let raw = serde_json::to_string_pretty(document)
            .map_err(|e| CourierError::json("collection document", e))?;
        if path.is_file() {
            self.rotate(&path)?;
        }

        // write then rename so readers never see a truncated file
        let partial = self.directory.join(format!(".{}.partial", self.file_name));
        std::fs::write(&partial, raw).map_err(|e| CourierError::io(&partial, e))?;
        std::fs::rename(&partial, &path).map_err(|e| CourierError::io(&path, e))?;

        tracing::info!(path = %path.display(), requests = document.request_count(), "saved collection");
        Ok(path)
    }

    fn load(&self) -> CourierResult<Option<Document>> {
        let path = self.path();
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| CourierError::io(&path, e))?;
        let document = serde_json::from_str(&raw)
            .map_err(|e| CourierError::json(path.display().to_string(), e))?;
        Ok(Some(document))
    }
}

fn collect_files(folder_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder_path)
        .with_context(|| format!("Failed to read directory: {}", folder_path.display()))?
    {
        let entry = entry.with_context(|| "Failed to read directory entry")?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Published collection as listed by a [`RemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
}

/// Collection service the document is published to.
pub trait RemoteStore {
    /// The collection with `id`, `None` when the service does not know it.
    fn fetch(&self, id: &str) -> CourierResult<Option<Document>>;

    fn list(&self) -> CourierResult<Vec<RemoteEntry>>;

    /// Publish a new collection and return its id.
    fn create(&self, document: &Document) -> CourierResult<String>;

    /// Replace the collection with `id`.
    fn update(&self, id: &str, document: &Document) -> CourierResult<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: usize,
    collections: IndexMap<String, Document>,
}

/// In-memory [`RemoteStore`] handing out ids `col-1`, `col-2`, ...
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
    offline: bool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote whose every call fails, as an unreachable service would.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.state().map(|s| s.collections.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> CourierResult<MutexGuard<'_, MemoryState>> {
        if self.offline {
            return Err(CourierError::Remote("service unreachable".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| CourierError::Remote("store lock poisoned".to_string()))
    }
}

impl RemoteStore for MemoryRemote {
    fn fetch(&self, id: &str) -> CourierResult<Option<Document>> {
        Ok(self.state()?.collections.get(id).cloned())
    }

    fn list(&self) -> CourierResult<Vec<RemoteEntry>> {
        Ok(self
            .state()?
            .collections
            .iter()
            .map(|(id, document)| RemoteEntry {
                id: id.clone(),
                name: document.info.name.clone(),
            })
            .collect())
    }

    fn create(&self, document: &Document) -> CourierResult<String> {
        let mut state = self.state()?;
        state.next_id += 1;
        let id = format!("col-{}", state.next_id);
        state.collections.insert(id.clone(), document.clone());
        tracing::info!(id = %id, "published new collection");
        Ok(id)
    }

    fn update(&self, id: &str, document: &Document) -> CourierResult<()> {
        let mut state = self.state()?;
        let Some(slot) = state.collections.get_mut(id) else {
            return Err(CourierError::NotFound(id.to_string()));
        };
        *slot = document.clone();
        tracing::info!(id = %id, "updated published collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_temp_dir, document, folder, request};

    fn sample(id: &str) -> Document {
        document(id, vec![folder("Users", vec![request("Get User", "GET", "users/:id")])])
    }

    #[test]
    fn test_save_and_load() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path().join("out"), "api.json", 3);
        assert_eq!(store.load().unwrap(), None);

        let path = store.save(&sample("a")).unwrap();
        assert_eq!(path, dir.path().join("out").join("api.json"));
        assert_eq!(store.load().unwrap(), Some(sample("a")));
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_saved_file_is_pretty_json() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 1);
        let path = store.save(&sample("a")).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.starts_with("{\n  \"info\""));
    }

    #[test]
    fn test_previous_version_rotated() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 3);
        store.save(&sample("first")).unwrap();
        store.save(&sample("second")).unwrap();

        let history = store.history().unwrap();
        assert_eq!(history.len(), 1);
        let name = history[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("collection-"));
        let old: Document = serde_json::from_str(&std::fs::read_to_string(&history[0]).unwrap()).unwrap();
        assert_eq!(old.info.id, "first");
        assert_eq!(store.load().unwrap().unwrap().info.id, "second");
    }

    #[test]
    fn test_history_pruned_to_keep() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 2);
        for id in ["a", "b", "c", "d", "e"] {
            store.save(&sample(id)).unwrap();
        }
        let history = store.history().unwrap();
        assert_eq!(history.len(), 2);
        let kept: Vec<String> = history
            .iter()
            .map(|p| {
                let raw = std::fs::read_to_string(p).unwrap();
                serde_json::from_str::<Document>(&raw).unwrap().info.id
            })
            .collect();
        assert_eq!(kept, vec!["c", "d"]);
    }

    #[test]
    fn test_same_instant_history_sorts_oldest_first() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 20);
        store.save(&sample("seed")).unwrap();
        let ids: Vec<String> = (0..12).map(|i| format!("v{i}")).collect();
        for id in &ids {
            std::fs::write(store.path(), serde_json::to_string(&sample(id)).unwrap()).unwrap();
            store.rotate_at(&store.path(), "20250314T150926000000000").unwrap();
        }

        let history = store.history().unwrap();
        let names: Vec<&str> = history
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names[0], "collection-20250314T150926000000000-0000.json");
        assert_eq!(names[11], "collection-20250314T150926000000000-0011.json");
        let rotated: Vec<String> = history
            .iter()
            .map(|p| {
                let raw = std::fs::read_to_string(p).unwrap();
                serde_json::from_str::<Document>(&raw).unwrap().info.id
            })
            .collect();
        assert_eq!(rotated, ids);
    }

    #[test]
    fn test_keep_zero_writes_no_history() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 0);
        store.save(&sample("a")).unwrap();
        store.save(&sample("b")).unwrap();
        assert!(!store.history_dir().exists());
    }

    #[test]
    fn test_load_invalid_document() {
        let dir = create_test_temp_dir();
        let store = FsStore::new(dir.path(), "collection.json", 1);
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(CourierError::Json { .. })));
    }

    #[test]
    fn test_from_config() {
        let store = FsStore::from_config(&OutputConfig::default());
        assert_eq!(store.path(), PathBuf::from("collections").join("collection.json"));
    }

    #[test]
    fn test_memory_remote_lifecycle() {
        let remote = MemoryRemote::new();
        assert!(remote.is_empty());
        let id = remote.create(&sample("a")).unwrap();
        assert_eq!(id, "col-1");
        assert_eq!(remote.create(&sample("b")).unwrap(), "col-2");

        remote.update(&id, &sample("c")).unwrap();
        assert_eq!(remote.fetch(&id).unwrap().unwrap().info.id, "c");
        assert_eq!(remote.fetch("col-9").unwrap(), None);
        assert_eq!(
            remote.list().unwrap(),
            vec![
                RemoteEntry { id: "col-1".into(), name: "Test Collection".into() },
                RemoteEntry { id: "col-2".into(), name: "Test Collection".into() },
            ]
        );
    }

    #[test]
    fn test_memory_remote_update_unknown() {
        let remote = MemoryRemote::new();
        assert!(matches!(
            remote.update("col-1", &sample("a")),
            Err(CourierError::NotFound(id)) if id == "col-1"
        ));
    }

    #[test]
    fn test_offline_remote_fails() {
        let remote = MemoryRemote::offline();
        assert!(matches!(remote.list(), Err(CourierError::Remote(_))));
        assert!(matches!(remote.create(&sample("a")), Err(CourierError::Remote(_))));
        assert_eq!(remote.len(), 0);
    }
}
