//! Read-only asset sources for bundled data.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use bytes::Bytes;

/// Looks up raw bytes for bundled assets by path.
///
/// Asset sources are owned by the host and never written through.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn AssetSource>`.
pub trait AssetSource {
    /// The bytes stored at `path`, or `None` if there is no such asset.
    fn lookup(&self, path: &str) -> Option<Bytes>;
}

impl<T: AssetSource + ?Sized> AssetSource for &T {
    fn lookup(&self, path: &str) -> Option<Bytes> {
        (**self).lookup(path)
    }
}

impl<T: AssetSource + ?Sized> AssetSource for Box<T> {
    fn lookup(&self, path: &str) -> Option<Bytes> {
        (**self).lookup(path)
    }
}

impl<T: AssetSource + ?Sized> AssetSource for Arc<T> {
    fn lookup(&self, path: &str) -> Option<Bytes> {
        (**self).lookup(path)
    }
}

/// Assets held in memory, e.g. compiled in with `include_bytes!`.
///
/// # Example
///
/// ```rust
/// use savefs_store::{AssetSource, InMemoryAssets};
///
/// let assets = InMemoryAssets::new().with_asset("levels/intro", &b"{}"[..]);
/// assert_eq!(assets.lookup("levels/intro").as_deref(), Some(&b"{}"[..]));
/// assert!(assets.lookup("levels/outro").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssets {
    assets: HashMap<String, Bytes>,
}

impl InMemoryAssets {
    /// Create an empty asset set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Bytes>) {
        self.assets.insert(path.into(), bytes.into());
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetSource for InMemoryAssets {
    fn lookup(&self, path: &str) -> Option<Bytes> {
        self.assets.get(path).cloned()
    }
}

impl<P: Into<String>, B: Into<Bytes>> FromIterator<(P, B)> for InMemoryAssets {
    fn from_iter<I: IntoIterator<Item = (P, B)>>(iter: I) -> Self {
        let mut assets = Self::new();
        for (path, bytes) in iter {
            assets.insert(path, bytes);
        }
        assets
    }
}

/// Assets shipped as files under a directory.
///
/// Paths are relative to the directory and may not climb out of it.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || relative.as_os_str().is_empty() {
            log::warn!("Rejected asset path {:?} outside {}", path, self.root.display());
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetSource for DirectoryAssets {
    fn lookup(&self, path: &str) -> Option<Bytes> {
        let file_path = self.resolve(path)?;

        log::debug!("Reading asset {}...", file_path.display());
        match fs::read(&file_path) {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                log::warn!("Failed to read asset {}: {}", file_path.display(), error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_lookup() {
        let assets: InMemoryAssets = [("a", &b"1"[..]), ("b/c", &b"2"[..])].into_iter().collect();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets.lookup("b/c"), Some(Bytes::from_static(b"2")));
        assert!(assets.lookup("missing").is_none());
    }

    #[test]
    fn in_memory_insert_replaces() {
        let mut assets = InMemoryAssets::new();
        assert!(assets.is_empty());

        assets.insert("cfg", "old");
        assets.insert("cfg", "new");
        assert_eq!(assets.lookup("cfg"), Some(Bytes::from_static(b"new")));
    }

    #[test]
    fn directory_lookup() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("levels")).unwrap();
        fs::write(dir.path().join("levels").join("intro.json"), b"{\"id\":1}").unwrap();

        let assets = DirectoryAssets::new(dir.path());
        assert_eq!(
            assets.lookup("levels/intro.json"),
            Some(Bytes::from_static(b"{\"id\":1}"))
        );
        assert_eq!(
            assets.lookup("./levels/intro.json"),
            Some(Bytes::from_static(b"{\"id\":1}"))
        );
        assert!(assets.lookup("levels/outro.json").is_none());
    }

    #[test]
    fn directory_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("bundle");
        fs::create_dir(&inner).unwrap();
        fs::write(dir.path().join("secret"), b"nope").unwrap();

        let assets = DirectoryAssets::new(&inner);
        assert!(assets.lookup("../secret").is_none());
        assert!(assets
            .lookup(dir.path().join("secret").to_str().unwrap())
            .is_none());
        assert!(assets.lookup("").is_none());
    }

    #[test]
    fn directory_is_not_an_asset() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("levels")).unwrap();

        let assets = DirectoryAssets::new(dir.path());
        assert!(assets.lookup("levels").is_none());
    }

    #[test]
    fn trait_objects_and_wrappers() {
        let assets = InMemoryAssets::new().with_asset("x", "y");
        let boxed: Box<dyn AssetSource> = Box::new(assets.clone());
        let shared = Arc::new(assets);

        assert!(boxed.lookup("x").is_some());
        assert!(shared.lookup("x").is_some());
    }
}
