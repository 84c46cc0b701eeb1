//! SaveFS store: key-named persistence over a local directory.
//!
//! A `LocalStore` is bound to one root directory and one `Format` for its
//! whole life. Each key maps to a single file, `<root>/<key>.<format>`,
//! holding exactly one encoded value.
//!
//! - `save` replaces an entry atomically and reports failures
//! - `load` never fails: unreadable or corrupted entries are reset to the
//!   caller's default and read back once
//! - `load_from_bundle` reads read-only assets through an `AssetSource`,
//!   falling back to `T::default()`
//!
//! # Example
//!
//! ```rust
//! use savefs_store::{Format, LocalStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = LocalStore::new(dir.path(), Format::JSON).unwrap();
//!
//! store.save("score", &42).unwrap();
//! assert!(store.exists("score"));
//! assert_eq!(store.load("score", 0), 42);
//! ```

mod assets;
mod bundle;
mod config;
mod error;
mod key;
mod local_disk;
pub mod locator;
mod reset;

pub use assets::{AssetSource, DirectoryAssets, InMemoryAssets};
pub use config::StoreConfig;
pub use error::Error;
pub use key::Key;
pub use local_disk::LocalStore;

// Re-export codec types for convenience
pub use savefs_codec::{Bytes, Codec, CodecRegistry, Format};
