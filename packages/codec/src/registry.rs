//! Format → codec lookup.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BinaryCodec, Codec, Error, Format, JsonCodec, XmlCodec};

/// A table of codecs keyed by the format each one handles.
///
/// Stores resolve their codec from a registry once, at construction. The
/// registry also defines the set of formats a store considers "known", e.g.
/// when removing a key under every format.
///
/// # Example
///
/// ```rust
/// use savefs_codec::{CodecRegistry, Format, JsonCodec};
///
/// let mut registry = CodecRegistry::new();
/// assert!(!registry.supports(&Format::JSON));
///
/// registry.register(JsonCodec);
/// assert!(registry.supports(&Format::JSON));
/// assert_eq!(registry.formats().collect::<Vec<_>>(), vec![Format::JSON]);
/// ```
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: Vec<(Format, Arc<dyn Codec>)>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Create a registry with the binary, XML and JSON codecs.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BinaryCodec);
        registry.register(XmlCodec::new());
        registry.register(JsonCodec);
        registry
    }

    /// Add a codec. A codec already registered for the same format is replaced
    /// in place, keeping its position in `formats()`.
    pub fn register(&mut self, codec: impl Codec + 'static) {
        self.register_arc(Arc::new(codec));
    }

    pub fn register_arc(&mut self, codec: Arc<dyn Codec>) {
        let format = codec.format();
        match self.codecs.iter_mut().find(|(f, _)| *f == format) {
            Some(slot) => slot.1 = codec,
            None => self.codecs.push((format, codec)),
        }
    }

    /// Look up the codec for a format.
    pub fn get(&self, format: &Format) -> Option<Arc<dyn Codec>> {
        self.codecs
            .iter()
            .find(|(f, _)| f == format)
            .map(|(_, codec)| Arc::clone(codec))
    }

    pub fn supports(&self, format: &Format) -> bool {
        self.codecs.iter().any(|(f, _)| f == format)
    }

    /// Every registered format, in registration order.
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.codecs.iter().map(|(f, _)| f.clone())
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T, format: &Format) -> Result<Bytes, Error> {
        let codec = self
            .get(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.clone()))?;
        crate::encode(codec.as_ref(), value)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8], format: &Format) -> Result<T, Error> {
        let codec = self
            .get(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.clone()))?;
        crate::decode(codec.as_ref(), bytes)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|(format, _)| format))
            .finish()
    }
}
