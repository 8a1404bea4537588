// Local filesystem adapter
// reason: tokio::fs keeps file I/O off the RPC worker threads
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use deskops_core::port::Filesystem;

/// Filesystem rooted at a base directory
///
/// `~` is expanded; relative paths resolve against `base_dir`, absolute paths
/// are used as given.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    base_dir: PathBuf,
}

impl LocalFilesystem {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Rooted at the process working directory
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(path.trim()).into_owned());
        if expanded.is_absolute() {
            expanded
        } else {
            self.base_dir.join(expanded)
        }
    }

    async fn ensure_parent(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn create_file(&self, path: &str, content: &str) -> io::Result<PathBuf> {
        let resolved = self.resolve(path);
        Self::ensure_parent(&resolved).await?;
        tokio::fs::write(&resolved, content).await?;
        debug!(path = %resolved.display(), bytes = content.len(), "File written");
        Ok(resolved)
    }

    async fn create_dir(&self, path: &str) -> io::Result<PathBuf> {
        let resolved = self.resolve(path);
        tokio::fs::create_dir_all(&resolved).await?;
        debug!(path = %resolved.display(), "Directory created");
        Ok(resolved)
    }

    async fn remove(&self, path: &str) -> io::Result<PathBuf> {
        let resolved = self.resolve(path);
        let metadata = tokio::fs::symlink_metadata(&resolved).await?;
        if metadata.is_dir() {
            tokio::fs::remove_dir_all(&resolved).await?;
        } else {
            tokio::fs::remove_file(&resolved).await?;
        }
        debug!(path = %resolved.display(), "Path removed");
        Ok(resolved)
    }

    async fn move_path(&self, from: &str, to: &str) -> io::Result<PathBuf> {
        let source = self.resolve(from);
        let destination = self.resolve(to);
        Self::ensure_parent(&destination).await?;
        tokio::fs::rename(&source, &destination).await?;
        debug!(from = %source.display(), to = %destination.display(), "Path moved");
        Ok(destination)
    }

    async fn copy_file(&self, from: &str, to: &str) -> io::Result<PathBuf> {
        let source = self.resolve(from);
        let destination = self.resolve(to);
        Self::ensure_parent(&destination).await?;
        tokio::fs::copy(&source, &destination).await?;
        debug!(from = %source.display(), to = %destination.display(), "File copied");
        Ok(destination)
    }

    async fn read_to_string(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(self.resolve(path)).await
    }

    fn current_dir(&self) -> String {
        self.base_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fs() -> (TempDir, LocalFilesystem) {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(dir.path());
        (dir, fs)
    }

    #[tokio::test]
    async fn test_create_file_makes_parents() {
        let (dir, fs) = fs();

        let created = fs.create_file("a/b/notes.txt", "hi").await.unwrap();

        assert_eq!(created, dir.path().join("a/b/notes.txt"));
        assert_eq!(std::fs::read_to_string(created).unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_move_and_copy() {
        let (dir, fs) = fs();
        fs.create_file("draft.md", "v1").await.unwrap();

        fs.copy_file("draft.md", "backup/draft.md").await.unwrap();
        fs.move_path("draft.md", "final/draft.md").await.unwrap();

        assert!(!dir.path().join("draft.md").exists());
        assert_eq!(fs.read_to_string("final/draft.md").await.unwrap(), "v1");
        assert_eq!(fs.read_to_string("backup/draft.md").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_remove_file_and_directory() {
        let (dir, fs) = fs();
        fs.create_file("tree/leaf.txt", "x").await.unwrap();
        fs.create_file("single.txt", "y").await.unwrap();

        fs.remove("tree").await.unwrap();
        fs.remove("single.txt").await.unwrap();

        assert!(!dir.path().join("tree").exists());
        assert!(!dir.path().join("single.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_not_found() {
        let (_dir, fs) = fs();

        let err = fs.remove("ghost.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = fs.move_path("ghost.txt", "elsewhere.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_absolute_paths_ignore_base() {
        let (_dir, fs) = fs();
        let other = TempDir::new().unwrap();
        let target = other.path().join("abs.txt");

        let created = fs
            .create_file(target.to_str().unwrap(), "abs")
            .await
            .unwrap();

        assert_eq!(created, target);
    }

    #[test]
    fn test_current_dir_is_base() {
        let (dir, fs) = fs();
        assert_eq!(fs.current_dir(), dir.path().display().to_string());
    }
}
