//! SaveFS codecs: Format tags and the encode/decode strategies behind them.
//!
//! This layer knows nothing about files. It provides:
//! - `Format`: a tag naming an encoding, which doubles as the file extension
//! - `Codec`: an object-safe encode/decode strategy for one format
//! - `JsonCodec`, `XmlCodec`, `BinaryCodec`: the built-in strategies
//! - `CodecRegistry`: maps a `Format` to its `Codec`
//!
//! # Example
//!
//! ```rust
//! use savefs_codec::{decode, encode, CodecRegistry, Format};
//!
//! let registry = CodecRegistry::with_builtin();
//! let codec = registry.get(&Format::JSON).unwrap();
//!
//! let bytes = encode(codec.as_ref(), &vec![1, 2, 3]).unwrap();
//! let back: Vec<i32> = decode(codec.as_ref(), &bytes).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//! ```

pub use bytes::Bytes;
pub use erased_serde;

mod codec;
mod error;
mod format;
mod node;
mod node_de;
mod registry;
mod traits;
mod xml;

pub use codec::{BinaryCodec, JsonCodec};
pub use error::Error;
pub use format::Format;
pub use registry::CodecRegistry;
pub use traits::{decode, encode, Codec, DecodeSink};
pub use xml::XmlCodec;
