use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fmt, fs, io};

use serde::de::DeserializeOwned;
use serde::Serialize;

use savefs_codec::{Codec, CodecRegistry, Format};

use crate::{locator, Error, Key, StoreConfig};

/// A key-value store over one local directory, bound to one format.
///
/// Every entry is a single file at `<root>/<key>.<format>`. Nothing is cached:
/// each load reads and decodes the file again. The store holds no mutable
/// state and takes no locks; concurrent writers to the same key race.
pub struct LocalStore {
    config: StoreConfig,
    codec: Arc<dyn Codec>,
    registry: Arc<CodecRegistry>,
}

impl LocalStore {
    /// Create a store with the built-in binary, XML and JSON codecs.
    ///
    /// The root directory does not need to exist yet; the first save creates it.
    pub fn new(root: impl Into<PathBuf>, format: Format) -> Result<LocalStore, Error> {
        Self::from_config(StoreConfig::new(root, format))
    }

    pub fn from_config(config: StoreConfig) -> Result<LocalStore, Error> {
        Self::with_registry(config, Arc::new(CodecRegistry::with_builtin()))
    }

    /// Create a store that resolves its codec from `registry`.
    ///
    /// Fails with an unsupported-format error if the registry has no codec for
    /// the configured format. `remove` deletes under every format in the
    /// registry.
    pub fn with_registry(
        config: StoreConfig,
        registry: Arc<CodecRegistry>,
    ) -> Result<LocalStore, Error> {
        let codec = registry
            .get(config.format())
            .ok_or_else(|| savefs_codec::Error::UnsupportedFormat(config.format().clone()))?;

        Ok(LocalStore {
            config,
            codec,
            registry,
        })
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    pub fn format(&self) -> &Format {
        self.config.format()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// The file that holds `key` in this store's format.
    pub fn address_of(&self, key: &str) -> Result<PathBuf, Error> {
        let key = Key::new(key)?;
        Ok(locator::address_of(self.root(), &key, self.format()))
    }

    /// Encode `value` and store it under `key`, replacing any previous entry.
    ///
    /// The bytes go to a temporary file in the root directory which is then
    /// renamed over the entry, so a failed save leaves the old entry intact.
    /// Failures are logged and returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let result = self.write_entry(key, value);
        if let Err(error) = &result {
            log::warn!("Failed to save {:?} as {}: {}", key, self.format(), error);
        }
        result
    }

    fn write_entry<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let file_path = self.address_of(key)?;
        let bytes = savefs_codec::encode(self.codec(), value)?;

        let root = self.root();
        fs::create_dir_all(root).map_err(|error| Error::io(root, error))?;

        log::debug!("Writing {}...", file_path.display());

        let mut staged = tempfile::Builder::new()
            .prefix(".savefs-")
            .suffix(".tmp")
            .tempfile_in(root)
            .map_err(|error| Error::io(root, error))?;
        staged
            .write_all(&bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|error| Error::io(staged.path(), error))?;
        staged
            .persist(&file_path)
            .map_err(|error| Error::io(&file_path, error.error))?;

        Ok(())
    }

    /// Whether an entry file exists for `key` in this store's format.
    ///
    /// The contents are not checked. Invalid keys never exist.
    pub fn exists(&self, key: &str) -> bool {
        self.address_of(key)
            .map(|file_path| file_path.is_file())
            .unwrap_or(false)
    }

    /// Read and decode the entry for `key`, with no recovery.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<T, Error> {
        let file_path = self.address_of(key)?;

        log::debug!("Reading {}...", file_path.display());
        let bytes = fs::read(&file_path).map_err(|error| Error::io(&file_path, error))?;

        Ok(savefs_codec::decode(self.codec(), &bytes)?)
    }

    /// Load the entry for `key`, falling back to `default`.
    ///
    /// Never fails. If the entry is missing, unreadable, or does not decode as
    /// `T`, it is reset to `default` and read back once (see
    /// [`LocalStore::reset_and_reload`]).
    pub fn load<T: Serialize + DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(value) => value,
            Err(error) => {
                if error.is_not_found() {
                    log::debug!("No {} entry for {:?}, seeding default", self.format(), key);
                } else {
                    log::warn!("Failed to load {:?}: {}; resetting to default", key, error);
                }
                self.reset_and_reload(key, default)
            }
        }
    }

    /// Delete `key` under every format this store's registry knows.
    ///
    /// Missing files are skipped. A failure for one format is logged and does
    /// not stop the others; the first such failure is returned once all
    /// formats have been tried. Returns the number of files deleted.
    pub fn remove(&self, key: &str) -> Result<usize, Error> {
        let key = Key::new(key).inspect_err(|error| {
            log::warn!("Failed to remove entry: {}", error);
        })?;

        let mut removed = 0;
        let mut first_error = None;
        for format in self.registry.formats() {
            let file_path = locator::address_of(self.root(), &key, &format);
            match fs::remove_file(&file_path) {
                Ok(()) => {
                    log::debug!("Removed {}", file_path.display());
                    removed += 1;
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    log::warn!("Failed to remove {}: {}", file_path.display(), error);
                    first_error.get_or_insert(Error::io(file_path, error));
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(removed),
        }
    }
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root())
            .field("format", self.format())
            .field("registry", &self.registry)
            .finish()
    }
}
