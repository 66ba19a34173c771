use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::ServiceError;

/// Storage addressed by relative, `/`-separated paths.
pub trait Filesystem: Send + Sync {
    fn has(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> Result<Vec<u8>, ServiceError>;
    /// Create or overwrite, making parent directories as needed.
    fn write(&self, path: &str, contents: &[u8]) -> Result<(), ServiceError>;
    /// Returns whether the file existed.
    fn delete(&self, path: &str) -> Result<bool, ServiceError>;
    /// File and directory names directly under `dir`, sorted.
    fn list(&self, dir: &str) -> Result<Vec<String>, ServiceError>;
}

pub type SharedFilesystem = Arc<dyn Filesystem>;

/// Local directory tree; paths may not leave `root`.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    fn resolve(&self, path: &str) -> Result<PathBuf, ServiceError> {
        let rel = Path::new(path);
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(ServiceError::Storage(format!("path {path:?} escapes the storage root"))),
            }
        }
        Ok(self.root.join(rel))
    }
}

fn storage_err(path: &str, e: std::io::Error) -> ServiceError {
    ServiceError::Storage(format!("{path}: {e}"))
}

impl Filesystem for LocalFilesystem {
    fn has(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        let full = self.resolve(path)?;
        fs::read(full).map_err(|e| storage_err(path, e))
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<(), ServiceError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_err(path, e))?;
        }
        debug!(%path, bytes = contents.len(), "filesystem write");
        fs::write(full, contents).map_err(|e| storage_err(path, e))
    }

    fn delete(&self, path: &str) -> Result<bool, ServiceError> {
        let full = self.resolve(path)?;
        match fs::remove_file(full) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_err(path, e)),
        }
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, ServiceError> {
        let full = self.resolve(dir)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(full).map_err(|e| storage_err(dir, e))? {
            let entry = entry.map_err(|e| storage_err(dir, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
