//! Workspace-rooted file access
//!
//! All file paths used by the tooling resolve against one configured
//! workspace root; a path that lexically escapes the root is a fatal
//! containment violation. Normalization is lexical (no symlink chasing),
//! so resolution works for files that do not exist yet.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::core::{FlowgateError, Result};

/// A workspace root that every resolved path must stay inside
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace anchored at the given root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = normalize(&root.into());
        debug!(root = %root.display(), "Workspace configured");
        Self { root }
    }

    /// The configured root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path inside the workspace.
    ///
    /// Relative paths are joined onto the root; absolute paths are taken
    /// as-is. Either way the normalized result must remain under the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let normalized = normalize(&joined);
        if !normalized.starts_with(&self.root) {
            return Err(FlowgateError::Containment {
                path: normalized,
                root: self.root.clone(),
            });
        }
        trace!(path = %normalized.display(), "Resolved workspace path");
        Ok(normalized)
    }

    /// Read a UTF-8 text file from the workspace
    pub fn read_text(&self, path: impl AsRef<Path>) -> Result<String> {
        let full = self.resolve(path)?;
        Ok(fs::read_to_string(full)?)
    }

    /// Write a UTF-8 text file into the workspace, creating parent
    /// directories as needed
    pub fn write_text(&self, path: impl AsRef<Path>, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        Ok(())
    }
}

/// Lexical path normalization: resolves `.` and `..` components without
/// touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}
