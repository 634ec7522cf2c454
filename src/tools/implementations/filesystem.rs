//! Filesystem tool implementations
//!
//! Implements workspace-confined file operations:
//! - file_read: Read file contents with size limits
//! - file_write: Write content, creating parent directories
//! - list_directory: One-level listing with sizes
//!
//! # Security
//! Every path goes through [`PathGuard::resolve`] first. A violation is
//! returned as an error before any filesystem call is made.

use crate::errors::{AgentError, Result};
use crate::tools::security::PathGuard;
use crate::tools::types::ToolContext;
use tokio::fs;

/// Read a workspace file
pub async fn file_read(file_path: &str, context: &ToolContext, guard: &PathGuard) -> Result<String> {
    let path = guard.resolve(file_path)?;

    if !path.is_file() {
        return Err(AgentError::ToolFailed(format!("File not found at {}", file_path)));
    }

    let metadata = fs::metadata(&path).await?;
    if metadata.len() > context.max_output_size as u64 {
        return Err(AgentError::ToolFailed(format!(
            "File too large: {} bytes (max: {} bytes)",
            metadata.len(),
            context.max_output_size
        )));
    }

    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| AgentError::ToolFailed(format!("Error reading file: {}", e)))?;

    Ok(format!("=== File: {} ===\n{}", file_path, content))
}

/// Write a workspace file
pub async fn file_write(
    file_path: &str,
    content: &str,
    context: &ToolContext,
    guard: &PathGuard,
) -> Result<String> {
    if content.len() > context.max_output_size {
        return Err(AgentError::ToolFailed(format!(
            "Content too large: {} bytes (max: {} bytes)",
            content.len(),
            context.max_output_size
        )));
    }

    // Resolve before creating anything so a violation never leaves directories behind
    let path = guard.resolve(file_path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&path, content)
        .await
        .map_err(|e| AgentError::ToolFailed(format!("Error writing file: {}", e)))?;

    Ok(format!("Successfully wrote {} bytes to {}", content.len(), file_path))
}

/// List one directory level, directories first marked `[DIR]`
pub async fn list_directory(path: &str, guard: &PathGuard) -> Result<String> {
    let dir = guard.resolve(path)?;

    if !dir.is_dir() {
        return Err(AgentError::ToolFailed(format!("Directory does not exist: {}", path)));
    }

    let mut names = Vec::new();
    let mut entries = fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        let metadata = fs::metadata(dir.join(&name)).await?;
        if metadata.is_dir() {
            lines.push(format!("[DIR]  {}/", name));
        } else {
            lines.push(format!("[FILE] {} ({} bytes)", name, metadata.len()));
        }
    }

    Ok(format!("=== Directory: {} ===\n{}", path, lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn setup_test_env() -> (TempDir, PathGuard, ToolContext) {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();
        let context = ToolContext::new(temp_dir.path().to_path_buf());
        (temp_dir, guard, context)
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_temp, guard, context) = setup_test_env();

        let written = file_write("test.txt", "Hello, crew!", &context, &guard)
            .await
            .unwrap();
        assert!(written.contains("Successfully wrote 12 bytes"));

        let read = file_read("test.txt", &context, &guard).await.unwrap();
        assert_eq!(read, "=== File: test.txt ===\nHello, crew!");
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let (temp, guard, context) = setup_test_env();

        file_write("nested/dir/file.py", "x = 1", &context, &guard)
            .await
            .unwrap();
        assert!(temp.path().join("nested/dir/file.py").is_file());
    }

    #[tokio::test]
    async fn test_write_outside_workspace_rejected() {
        let (temp, guard, context) = setup_test_env();

        let err = file_write("../escape/evil.txt", "x", &context, &guard)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::PathViolation { .. }));
        assert!(!temp.path().parent().unwrap().join("escape").exists());
    }

    #[tokio::test]
    async fn test_write_too_large() {
        let (_temp, guard, context) = setup_test_env();
        let context = context.with_max_output_size(10);

        let err = file_write("file.txt", &"a".repeat(100), &context, &guard)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Content too large"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let (_temp, guard, context) = setup_test_env();

        let err = file_read("nope.txt", &context, &guard).await.unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[tokio::test]
    async fn test_read_too_large() {
        let (temp, guard, context) = setup_test_env();
        let context = context.with_max_output_size(10);
        std_fs::write(temp.path().join("large.txt"), "a".repeat(100)).unwrap();

        let err = file_read("large.txt", &context, &guard).await.unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_list_directory() {
        let (temp, guard, _context) = setup_test_env();
        std_fs::create_dir(temp.path().join("subdir")).unwrap();
        std_fs::write(temp.path().join("file1.txt"), "test").unwrap();

        let listing = list_directory(".", &guard).await.unwrap();
        assert!(listing.contains("[DIR]  subdir/"));
        assert!(listing.contains("[FILE] file1.txt (4 bytes)"));
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let (_temp, guard, _context) = setup_test_env();
        assert!(list_directory("ghost", &guard).await.is_err());
    }
}
