//! Workspace path confinement
//!
//! Every filesystem capability resolves its path argument through a
//! [`PathGuard`] before touching the disk. The check is purely lexical:
//! `.` and `..` are folded and the result must sit at or under the
//! workspace root, compared component by component.
//!
//! Known limitation: symlinks are not followed and case-insensitive
//! filesystems are not special-cased. A symlink inside the workspace that
//! points elsewhere will be accepted.

use crate::errors::{AgentError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Confines tool paths to a workspace root
#[derive(Debug, Clone)]
pub struct PathGuard {
    /// Normalized absolute workspace root
    root: PathBuf,

    /// Final component of the root, used to absorb `workspace/...` paths
    root_name: Option<String>,
}

impl PathGuard {
    /// Create a guard for an absolute workspace root
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();

        if !root.is_absolute() {
            return Err(AgentError::ConfigError(format!(
                "Workspace root must be absolute: {}",
                root.display()
            )));
        }

        let root = normalize(root);
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(Self { root, root_name })
    }

    /// Resolve a tool-supplied path to an absolute path inside the workspace
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let candidate = Path::new(path);

        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(self.strip_workspace_prefix(path))
        };

        let resolved = normalize(&joined);

        if !resolved.starts_with(&self.root) {
            warn!(path = %path, root = %self.root.display(), "path escapes workspace");
            return Err(AgentError::PathViolation {
                path: path.to_string(),
                root: self.root.clone(),
            });
        }

        debug!(path = %path, resolved = %resolved.display(), "path resolved");
        Ok(resolved)
    }

    /// Models often repeat the workspace directory name: `workspace/app.py`
    fn strip_workspace_prefix(&self, path: &str) -> String {
        let cleaned = path.replace('\\', "/");

        if let Some(name) = &self.root_name {
            let prefix = format!("{}/", name);
            if let Some(rest) = cleaned.strip_prefix(&prefix) {
                return rest.to_string();
            }
        }

        cleaned
    }

    /// Workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Fold `.` and `..` without consulting the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, so `/..` stays `/`
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}
