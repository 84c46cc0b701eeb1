//! The Codec trait and typed helpers over it.

use bytes::Bytes;
use serde::de::{DeserializeOwned, DeserializeSeed};
use serde::Serialize;

use crate::{Error, Format};

/// Receives the type-erased deserializer a codec builds over its input.
///
/// Typed callers never see this directly: [`decode`] supplies a sink that
/// deserializes into the requested type.
pub type DecodeSink<'a, 'de> = dyn FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), erased_serde::Error>
    + 'a;

/// An encode/decode strategy for one format.
///
/// Codecs are stateless with respect to the values they handle, and
/// object-safe so a registry can hold them as `Arc<dyn Codec>`. Values cross
/// the boundary type-erased through `erased_serde`.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use savefs_codec::{erased_serde, Bytes, Codec, DecodeSink, Error, Format};
///
/// struct YamlCodec;
///
/// impl Codec for YamlCodec {
///     fn format(&self) -> Format {
///         Format::from_static("yaml")
///     }
///
///     fn encode(&self, _value: &dyn erased_serde::Serialize) -> Result<Bytes, Error> {
///         // Serialize with a YAML serializer...
///         Err(Error::encode(self.format(), "not implemented"))
///     }
///
///     fn decode_into<'de>(
///         &self,
///         _bytes: &'de [u8],
///         _sink: &mut DecodeSink<'_, 'de>,
///     ) -> Result<(), Error> {
///         // Build a YAML deserializer and hand it to the sink...
///         Err(Error::decode(self.format(), "not implemented"))
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// The format this codec produces.
    fn format(&self) -> Format;

    /// Check if this codec handles a format.
    fn supports(&self, format: &Format) -> bool {
        *format == self.format()
    }

    /// Encode a value into bytes.
    fn encode(&self, value: &dyn erased_serde::Serialize) -> Result<Bytes, Error>;

    /// Build a deserializer over `bytes` and drive `sink` with it.
    ///
    /// Fails with `Error::Decode` when the sink rejects the input or when
    /// input remains after a complete value.
    fn decode_into<'de>(&self, bytes: &'de [u8], sink: &mut DecodeSink<'_, 'de>)
        -> Result<(), Error>;
}

/// Encode a typed value with a codec.
pub fn encode<T: Serialize + ?Sized>(codec: &dyn Codec, value: &T) -> Result<Bytes, Error> {
    codec.encode(&value)
}

/// Decode a typed value with a codec.
pub fn decode<T: DeserializeOwned>(codec: &dyn Codec, bytes: &[u8]) -> Result<T, Error> {
    let mut decoded = None;
    codec.decode_into(bytes, &mut |de| {
        decoded = Some(erased_serde::deserialize::<T>(de)?);
        Ok(())
    })?;

    decoded.ok_or_else(|| Error::decode(codec.format(), "codec produced no value"))
}

/// Adapts a [`DecodeSink`] to serde's seed API so any concrete deserializer
/// can feed it.
pub(crate) struct SinkSeed<'s, 'a, 'de>(pub(crate) &'s mut DecodeSink<'a, 'de>);

impl<'de> DeserializeSeed<'de> for SinkSeed<'_, '_, 'de> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.0)(&mut erased).map_err(serde::de::Error::custom)
    }
}
