// Filesystem Port
// Paths are passed through as the caller wrote them; adapters resolve them
// (home expansion, base directory) and report the resolved path back.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

/// Filesystem primitive consumed by the dispatcher
///
/// Write, move and copy create missing parent directories of their destination.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Create (or truncate) a file with `content`
    async fn create_file(&self, path: &str, content: &str) -> io::Result<PathBuf>;

    /// Create a directory and any missing parents
    async fn create_dir(&self, path: &str) -> io::Result<PathBuf>;

    /// Remove a file, or a directory with everything below it
    async fn remove(&self, path: &str) -> io::Result<PathBuf>;

    /// Move `from` to `to`, returning the resolved destination
    async fn move_path(&self, from: &str, to: &str) -> io::Result<PathBuf>;

    /// Copy a file, returning the resolved destination
    async fn copy_file(&self, from: &str, to: &str) -> io::Result<PathBuf>;

    async fn read_to_string(&self, path: &str) -> io::Result<String>;

    /// Directory relative paths are resolved against
    fn current_dir(&self) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// In-memory filesystem: `Some(content)` is a file, `None` a directory
    #[derive(Clone, Default)]
    pub struct MemoryFilesystem {
        entries: Arc<Mutex<BTreeMap<String, Option<String>>>>,
    }

    impl MemoryFilesystem {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: &str, content: &str) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(path.to_string(), Some(content.to_string()));
            self
        }

        pub fn exists(&self, path: &str) -> bool {
            self.entries.lock().unwrap().contains_key(path)
        }

        pub fn content(&self, path: &str) -> Option<String> {
            self.entries.lock().unwrap().get(path).cloned().flatten()
        }

        fn not_found(path: &str) -> io::Error {
            io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path))
        }
    }

    #[async_trait]
    impl Filesystem for MemoryFilesystem {
        async fn create_file(&self, path: &str, content: &str) -> io::Result<PathBuf> {
            self.entries
                .lock()
                .unwrap()
                .insert(path.to_string(), Some(content.to_string()));
            Ok(PathBuf::from(path))
        }

        async fn create_dir(&self, path: &str) -> io::Result<PathBuf> {
            self.entries.lock().unwrap().insert(path.to_string(), None);
            Ok(PathBuf::from(path))
        }

        async fn remove(&self, path: &str) -> io::Result<PathBuf> {
            let mut entries = self.entries.lock().unwrap();
            if entries.remove(path).is_none() {
                return Err(Self::not_found(path));
            }
            let prefix = format!("{}/", path);
            entries.retain(|k, _| !k.starts_with(&prefix));
            Ok(PathBuf::from(path))
        }

        async fn move_path(&self, from: &str, to: &str) -> io::Result<PathBuf> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.remove(from).ok_or_else(|| Self::not_found(from))?;
            entries.insert(to.to_string(), entry);
            Ok(PathBuf::from(to))
        }

        async fn copy_file(&self, from: &str, to: &str) -> io::Result<PathBuf> {
            let mut entries = self.entries.lock().unwrap();
            let content = match entries.get(from) {
                Some(Some(content)) => content.clone(),
                Some(None) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} is a directory", from),
                    ))
                }
                None => return Err(Self::not_found(from)),
            };
            entries.insert(to.to_string(), Some(content));
            Ok(PathBuf::from(to))
        }

        async fn read_to_string(&self, path: &str) -> io::Result<String> {
            self.content(path).ok_or_else(|| Self::not_found(path))
        }

        fn current_dir(&self) -> String {
            "/memory".to_string()
        }
    }
}
