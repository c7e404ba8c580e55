// Durable collection storage: two independent JSON collections (projects,
// sessions) under one namespace directory, loaded wholesale and rewritten
// wholesale on every mutation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::ProtoscopeError;
use crate::project::Project;
use crate::session::Session;

/// Storage backend for the prototype graph collection
pub trait ProjectStorage {
    /// Load the full project collection. A backend with no data yet returns
    /// the empty collection, not an error.
    fn load_projects(&self) -> Result<Vec<Project>, ProtoscopeError>;

    /// Replace the full project collection. Must be atomic: a failed write
    /// leaves the previously stored collection readable.
    fn store_projects(&mut self, projects: &[Project]) -> Result<(), ProtoscopeError>;
}

/// Storage backend for the recorded session collection
pub trait SessionStorage {
    fn load_sessions(&self) -> Result<Vec<Session>, ProtoscopeError>;

    fn store_sessions(&mut self, sessions: &[Session]) -> Result<(), ProtoscopeError>;
}

const PROJECTS_FILE: &str = "projects.json";
const SESSIONS_FILE: &str = "sessions.json";

/// File-based implementation of both collection stores
pub struct FileBackedStorage {
    /// Namespace directory holding the collection files
    root: PathBuf,
}

impl FileBackedStorage {
    /// Create a storage instance rooted at the given directory, creating the
    /// directory if needed
    pub fn new(root: PathBuf) -> Result<Self, ProtoscopeError> {
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| ProtoscopeError::StorageIOError { source: e })?;
        }
        Ok(Self { root })
    }

    /// Create storage in the default application data directory
    pub fn new_default() -> Result<Self, ProtoscopeError> {
        Self::new(Self::default_root()?)
    }

    /// Default namespace directory for protoscope data
    pub fn default_root() -> Result<PathBuf, ProtoscopeError> {
        let data_dir = dirs::data_dir().ok_or(ProtoscopeError::NoDataDir)?;
        Ok(data_dir.join("protoscope"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, ProtoscopeError> {
        let path = self.root.join(file);
        if !path.exists() {
            debug!("Collection file {:?} does not exist, loading empty", path);
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&path).map_err(|e| ProtoscopeError::StorageIOError { source: e })?;
        serde_json::from_str(&content).map_err(|e| ProtoscopeError::StorageSerializeError {
            source: e,
        })
    }

    /// Write the collection to a temp file, sync, then atomically rename over
    /// the previous file so a failed write never corrupts stored data
    fn store_collection<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), ProtoscopeError> {
        let path = self.root.join(file);
        let temp_path = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(items)
            .map_err(|e| ProtoscopeError::StorageSerializeError { source: e })?;

        {
            let mut temp_file = fs::File::create(&temp_path)
                .map_err(|e| ProtoscopeError::StorageIOError { source: e })?;
            temp_file
                .write_all(content.as_bytes())
                .map_err(|e| ProtoscopeError::StorageIOError { source: e })?;
            temp_file
                .sync_all()
                .map_err(|e| ProtoscopeError::StorageIOError { source: e })?;
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            if let Err(cleanup_err) = fs::remove_file(&temp_path) {
                warn!("Failed to remove temp file {:?}: {}", temp_path, cleanup_err);
            }
            ProtoscopeError::StorageIOError { source: e }
        })?;

        debug!("Stored {} items to {:?}", items.len(), path);
        Ok(())
    }
}

impl ProjectStorage for FileBackedStorage {
    fn load_projects(&self) -> Result<Vec<Project>, ProtoscopeError> {
        self.load_collection(PROJECTS_FILE)
    }

    fn store_projects(&mut self, projects: &[Project]) -> Result<(), ProtoscopeError> {
        self.store_collection(PROJECTS_FILE, projects)
    }
}

impl SessionStorage for FileBackedStorage {
    fn load_sessions(&self) -> Result<Vec<Session>, ProtoscopeError> {
        self.load_collection(SESSIONS_FILE)
    }

    fn store_sessions(&mut self, sessions: &[Session]) -> Result<(), ProtoscopeError> {
        self.store_collection(SESSIONS_FILE, sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation_makes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("namespace");

        let storage = FileBackedStorage::new(root.clone()).unwrap();
        assert!(root.exists());
        assert_eq!(storage.root(), root);
    }

    #[test]
    fn test_missing_collections_load_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileBackedStorage::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(storage.load_projects().unwrap().is_empty());
        assert!(storage.load_sessions().unwrap().is_empty());
    }

    #[test]
    fn test_projects_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileBackedStorage::new(temp_dir.path().to_path_buf()).unwrap();

        let projects = vec![Project::new("Alpha"), Project::new("Beta")];
        storage.store_projects(&projects).unwrap();

        let loaded = storage.load_projects().unwrap();
        assert_eq!(loaded, projects);
    }

    #[test]
    fn test_sessions_round_trip_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileBackedStorage::new(temp_dir.path().to_path_buf()).unwrap();

        let sessions = vec![Session::new("project-1"), Session::new("project-1")];
        storage.store_sessions(&sessions).unwrap();

        let loaded = storage.load_sessions().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, sessions[0].id);
        assert_eq!(loaded[1].id, sessions[1].id);
    }

    #[test]
    fn test_collections_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileBackedStorage::new(temp_dir.path().to_path_buf()).unwrap();

        storage.store_projects(&[Project::new("Alpha")]).unwrap();
        storage.store_sessions(&[Session::new("project-1")]).unwrap();

        assert_eq!(storage.load_projects().unwrap().len(), 1);
        assert_eq!(storage.load_sessions().unwrap().len(), 1);

        // Rewriting one collection leaves the other untouched
        storage.store_sessions(&[]).unwrap();
        assert_eq!(storage.load_projects().unwrap().len(), 1);
        assert!(storage.load_sessions().unwrap().is_empty());
    }
}
