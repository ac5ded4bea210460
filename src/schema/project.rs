//! Workspace roots and per-query build configuration

use std::path::PathBuf;
use std::sync::Mutex;

use tower_lsp::lsp_types::Url;
use tracing::warn;

use crate::schema::error::BuildError;

/// Root file plus import search paths for one schema build. Consumed by a
/// single build and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub root: PathBuf,
    pub import_paths: Vec<PathBuf>,
}

/// Tracks the workspace folders the client announced at initialization.
#[derive(Debug, Default)]
pub struct ProjectContext {
    roots: Mutex<Vec<PathBuf>>,
}

impl ProjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project_root(&self, uri: &Url) {
        match uri.to_file_path() {
            Ok(path) => {
                let mut roots = self.roots.lock().expect("project roots lock poisoned");
                if !roots.contains(&path) {
                    roots.push(path);
                }
            }
            Err(()) => warn!("Ignoring non-file workspace folder: {}", uri),
        }
    }

    pub fn project_roots(&self) -> Vec<PathBuf> {
        self.roots.lock().expect("project roots lock poisoned").clone()
    }

    /// Derive the build configuration for a query rooted at `uri`: the file
    /// itself is the build root, imports are resolved against the workspace
    /// folders and the file's own directory.
    pub fn create_build_config(&self, uri: &Url) -> Result<BuildConfig, BuildError> {
        let root = uri
            .to_file_path()
            .map_err(|()| BuildError::InvalidUri(uri.to_string()))?;

        let mut import_paths = self.project_roots();
        if let Some(parent) = root.parent() {
            let parent = parent.to_path_buf();
            if !import_paths.contains(&parent) {
                import_paths.push(parent);
            }
        }

        Ok(BuildConfig { root, import_paths })
    }
}
