//! Recovery for entries that cannot be loaded.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LocalStore;

impl LocalStore {
    /// Overwrite `key` with `default`, then read it back once.
    ///
    /// Returns the re-read value, or `default` itself when either the write or
    /// the second read fails. There is exactly one reset per call: storage
    /// that stays unreadable yields `default` rather than another retry.
    pub fn reset_and_reload<T: Serialize + DeserializeOwned>(&self, key: &str, default: T) -> T {
        if self.save(key, &default).is_err() {
            return default;
        }

        match self.try_load(key) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("Reset {:?} but it still fails to load: {}", key, error);
                default
            }
        }
    }
}
