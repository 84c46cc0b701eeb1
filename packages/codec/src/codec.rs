//! Built-in codecs: JSON and binary.

use bincode::Options;
use bytes::Bytes;
use serde::de::DeserializeSeed;

use crate::traits::{Codec, DecodeSink, SinkSeed};
use crate::{Error, Format};

/// JSON via `serde_json`.
///
/// Output is pretty-printed so stored entries stay readable by hand.
///
/// # Example
///
/// ```rust
/// use savefs_codec::{decode, encode, JsonCodec};
///
/// let bytes = encode(&JsonCodec, &42).unwrap();
/// assert_eq!(&bytes[..], b"42");
///
/// let back: i32 = decode(&JsonCodec, &bytes).unwrap();
/// assert_eq!(back, 42);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::JSON
    }

    fn encode(&self, value: &dyn erased_serde::Serialize) -> Result<Bytes, Error> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| Error::encode(Format::JSON, e))?;
        Ok(Bytes::from(bytes))
    }

    fn decode_into<'de>(
        &self,
        bytes: &'de [u8],
        sink: &mut DecodeSink<'_, 'de>,
    ) -> Result<(), Error> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        SinkSeed(sink)
            .deserialize(&mut de)
            .map_err(|e| Error::decode(Format::JSON, e))?;
        de.end().map_err(|e| Error::decode(Format::JSON, e))
    }
}

/// Compact binary via `bincode`.
///
/// Integers use fixed-width encoding and trailing bytes after a complete
/// value are rejected, so truncated or padded files fail to decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl BinaryCodec {
    fn options() -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
    }
}

impl Codec for BinaryCodec {
    fn format(&self) -> Format {
        Format::BINARY
    }

    fn encode(&self, value: &dyn erased_serde::Serialize) -> Result<Bytes, Error> {
        let bytes = Self::options()
            .serialize(&value)
            .map_err(|e| Error::encode(Format::BINARY, e))?;
        Ok(Bytes::from(bytes))
    }

    fn decode_into<'de>(
        &self,
        bytes: &'de [u8],
        sink: &mut DecodeSink<'_, 'de>,
    ) -> Result<(), Error> {
        Self::options()
            .deserialize_seed(SinkSeed(sink), bytes)
            .map_err(|e| Error::decode(Format::BINARY, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        level: u32,
        active: bool,
    }

    fn alice() -> Profile {
        Profile {
            name: "Alice".to_string(),
            level: 7,
            active: true,
        }
    }

    #[test]
    fn json_roundtrip() {
        let bytes = encode(&JsonCodec, &alice()).unwrap();
        let decoded: Profile = decode(&JsonCodec, &bytes).unwrap();
        assert_eq!(decoded, alice());
    }

    #[test]
    fn json_is_pretty_printed() {
        let bytes = encode(&JsonCodec, &alice()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\n  \"name\": \"Alice\""));
    }

    #[test]
    fn json_rejects_garbage() {
        let result: Result<i32, _> = decode(&JsonCodec, b"not valid json {");
        assert!(matches!(result, Err(Error::Decode { format, .. }) if format == Format::JSON));
    }

    #[test]
    fn json_rejects_trailing_input() {
        let result: Result<i32, _> = decode(&JsonCodec, b"42 43");
        assert!(result.unwrap_err().is_decode());
    }

    #[test]
    fn json_type_mismatch_is_decode_error() {
        let bytes = encode(&JsonCodec, &"a string").unwrap();
        let result: Result<Profile, _> = decode(&JsonCodec, &bytes);
        assert!(result.unwrap_err().is_decode());
    }

    #[test]
    fn json_rejects_unrepresentable_map_keys() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "bytes as key");
        let result = encode(&JsonCodec, &map);
        assert!(matches!(result, Err(Error::Encode { .. })));
    }

    #[test]
    fn binary_roundtrip() {
        let bytes = encode(&BinaryCodec, &alice()).unwrap();
        let decoded: Profile = decode(&BinaryCodec, &bytes).unwrap();
        assert_eq!(decoded, alice());
    }

    #[test]
    fn binary_uses_fixed_width_integers() {
        let bytes = encode(&BinaryCodec, &42u32).unwrap();
        assert_eq!(&bytes[..], &[42, 0, 0, 0]);
    }

    #[test]
    fn binary_rejects_truncated_input() {
        let bytes = encode(&BinaryCodec, &alice()).unwrap();
        let truncated = &bytes[..bytes.len() - 2];
        let result: Result<Profile, _> = decode(&BinaryCodec, truncated);
        assert!(result.unwrap_err().is_decode());
    }

    #[test]
    fn binary_rejects_trailing_bytes() {
        let mut bytes = encode(&BinaryCodec, &7u32).unwrap().to_vec();
        bytes.push(0);
        let result: Result<u32, _> = decode(&BinaryCodec, &bytes);
        assert!(result.unwrap_err().is_decode());
    }

    #[test]
    fn codecs_report_their_format() {
        assert!(JsonCodec.supports(&Format::JSON));
        assert!(!JsonCodec.supports(&Format::XML));
        assert_eq!(crate::XmlCodec::new().format(), Format::XML);
        assert_eq!(BinaryCodec.format(), Format::BINARY);
    }
}
