//! Loading values from read-only bundled assets.

use serde::de::DeserializeOwned;

use crate::{AssetSource, Error, LocalStore};

impl LocalStore {
    /// Look up `path` in `assets` and decode it with this store's format.
    pub fn try_load_from_bundle<T, A>(&self, assets: &A, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
        A: AssetSource + ?Sized,
    {
        let bytes = assets.lookup(path).ok_or_else(|| Error::AssetNotFound {
            path: path.to_string(),
        })?;

        Ok(savefs_codec::decode(self.codec(), &bytes)?)
    }

    /// Load a bundled asset, falling back to `T::default()`.
    ///
    /// Unlike [`LocalStore::load`] there is no reset: the bundle is read-only,
    /// so a missing or undecodable asset yields the type's default value and
    /// storage is never touched.
    pub fn load_from_bundle<T, A>(&self, assets: &A, path: &str) -> T
    where
        T: DeserializeOwned + Default,
        A: AssetSource + ?Sized,
    {
        self.try_load_from_bundle(assets, path)
            .unwrap_or_else(|error| {
                log::warn!("Failed to load bundled asset {:?}: {}", path, error);
                T::default()
            })
    }
}
