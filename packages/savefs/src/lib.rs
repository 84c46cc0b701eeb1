//! SaveFS: save a value under a key, load it back no matter what happened to
//! the file in between.
//!
//! A store persists each key as one file in a chosen format (binary, XML, or
//! JSON). Loads are total: an entry that is missing, corrupted, or written in
//! something else is reset to the caller's default and read back. Read-only
//! bundled assets load through the same codecs without recovery.

pub use savefs_codec::{
    decode, encode, BinaryCodec, Bytes, Codec, CodecRegistry, DecodeSink, Format, JsonCodec,
    XmlCodec,
};
pub use savefs_store::{
    locator, AssetSource, DirectoryAssets, Error, InMemoryAssets, Key, LocalStore, StoreConfig,
};

/// Codec-layer errors.
pub use savefs_codec::Error as CodecError;
