//! Declared-configuration store.
//!
//! The store is a JSON array of [`DeclaredProcessConfig`] keyed by name. A
//! missing or unreadable file is an empty store, never an error: losing the
//! project list must not keep the monitor from starting. Every successful
//! mutation is written through immediately.
//!
//! The boolean methods (`add`, `remove`, `update`) match how the
//! presentation layer uses the store. The `try_*` variants report why a
//! mutation was refused.

pub mod error;

pub use error::StoreError;
pub use error::StoreResult;

use fm_protocol::config_models::DeclaredProcessConfig;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjectStore {
    path: PathBuf,
    projects: Vec<DeclaredProcessConfig>,
}

impl ProjectStore {
    /// Load the store at `path`.
    ///
    /// Nothing is created on disk until the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let projects = load(&path);
        tracing::debug!(path = %path.display(), count = projects.len(), "Project store opened");
        Self { path, projects }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[DeclaredProcessConfig] {
        &self.projects
    }

    pub fn find(&self, name: &str) -> Option<&DeclaredProcessConfig> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Add a minimal declaration. `false` if the name is taken or the write fails.
    pub fn add(&mut self, name: &str, path: &str, script: &str) -> bool {
        report(self.try_add(name, path, script))
    }

    pub fn remove(&mut self, name: &str) -> bool {
        report(self.try_remove(name))
    }

    /// Replace the declaration called `old_name` with `new`.
    pub fn update(&mut self, old_name: &str, new: DeclaredProcessConfig) -> bool {
        report(self.try_update(old_name, new))
    }

    /// Add a declaration with `autorestart` on and `watch` off.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `DuplicateName`, or a persistence failure. The in-memory
    /// set is unchanged on error.
    pub fn try_add(&mut self, name: &str, path: &str, script: &str) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.find(name).is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let mut next = self.projects.clone();
        next.push(DeclaredProcessConfig::new(name, path, script));
        self.commit(next)?;
        tracing::info!(name, "Project added");
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound`, or a persistence failure.
    pub fn try_remove(&mut self, name: &str) -> StoreResult<()> {
        if self.find(name).is_none() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let next = self
            .projects
            .iter()
            .filter(|p| p.name != name)
            .cloned()
            .collect();
        self.commit(next)?;
        tracing::info!(name, "Project removed");
        Ok(())
    }

    /// Replace a declaration wholesale, possibly renaming it.
    ///
    /// # Errors
    ///
    /// `EmptyName` when `new` has no name, `DuplicateName` when the new name
    /// belongs to a different declaration, `NotFound` when `old_name` is
    /// unknown, or a persistence failure.
    pub fn try_update(&mut self, old_name: &str, new: DeclaredProcessConfig) -> StoreResult<()> {
        if new.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        if new.name != old_name && self.find(&new.name).is_some() {
            return Err(StoreError::DuplicateName(new.name));
        }
        let index = self
            .projects
            .iter()
            .position(|p| p.name == old_name)
            .ok_or_else(|| StoreError::NotFound(old_name.to_string()))?;

        let mut next = self.projects.clone();
        let new_name = new.name.clone();
        next[index] = new;
        self.commit(next)?;
        tracing::info!(old_name, new_name = %new_name, "Project updated");
        Ok(())
    }

    fn commit(&mut self, next: Vec<DeclaredProcessConfig>) -> StoreResult<()> {
        save(&self.path, &next)?;
        self.projects = next;
        Ok(())
    }
}

fn report(result: StoreResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Project store mutation refused");
            false
        }
    }
}

fn load(path: &Path) -> Vec<DeclaredProcessConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read project store; starting empty");
            return Vec::new();
        }
    };

    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str(&content) {
        Ok(projects) => projects,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt project store; starting empty");
            Vec::new()
        }
    }
}

fn save(path: &Path, projects: &[DeclaredProcessConfig]) -> StoreResult<()> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(projects)?;
    std::fs::write(path, json).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ProjectStore {
        ProjectStore::open(dir.join("nested").join("projects.json"))
    }

    #[test]
    fn test_missing_file_is_empty_and_first_add_creates_it() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = store_in(dir.path());
        assert!(store.list().is_empty());
        assert!(!store.path().exists());

        assert!(store.add("api", "/srv/api", "server.js"));
        assert!(store.path().exists());

        let reopened = ProjectStore::open(store.path());
        let api = reopened.find("api").expect("api should persist");
        assert_eq!(api.autorestart, Some(true));
        assert_eq!(api.watch, Some(false));
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "{ not json").expect("write");

        assert!(ProjectStore::open(&path).list().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = store_in(dir.path());
        assert!(store.add("api", "/a", "a.js"));
        assert!(!store.add("api", "/b", "b.js"));
        assert!(matches!(
            store.try_add("api", "/b", "b.js"),
            Err(StoreError::DuplicateName(name)) if name == "api"
        ));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = store_in(dir.path());
        store.add("api", "/a", "a.js");

        assert!(store.remove("api"));
        assert!(!store.remove("api"));
        assert!(ProjectStore::open(store.path()).list().is_empty());
    }

    #[test]
    fn test_update_renames_and_replaces_wholesale() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = store_in(dir.path());
        store.add("api", "/a", "a.js");

        let mut renamed = DeclaredProcessConfig::new("gateway", "/g", "g.js");
        renamed.autorestart = None;
        assert!(store.update("api", renamed.clone()));

        assert!(store.find("api").is_none());
        assert_eq!(store.find("gateway"), Some(&renamed));
        assert_eq!(ProjectStore::open(store.path()).find("gateway"), Some(&renamed));
    }

    #[test]
    fn test_update_refusals() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = store_in(dir.path());
        store.add("a", "/a", "a.js");
        store.add("b", "/b", "b.js");

        assert!(matches!(
            store.try_update("a", DeclaredProcessConfig::new("b", "/x", "x.js")),
            Err(StoreError::DuplicateName(_))
        ));
        assert!(matches!(
            store.try_update("a", DeclaredProcessConfig::new(" ", "/x", "x.js")),
            Err(StoreError::EmptyName)
        ));
        assert!(matches!(
            store.try_update("zzz", DeclaredProcessConfig::new("zzz", "/x", "x.js")),
            Err(StoreError::NotFound(_))
        ));

        // Keeping the same name is not a collision.
        assert!(store.update("a", DeclaredProcessConfig::new("a", "/new", "a.js")));
        assert_eq!(store.find("a").map(|p| p.path.as_str()), Some("/new"));
    }
}
