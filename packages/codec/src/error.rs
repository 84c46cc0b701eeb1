//! Error types for the codec layer.

use crate::format::Format;

/// Errors raised while turning values into bytes and back.
///
/// Codec errors carry the format they happened under. Both encode and decode
/// messages come from the underlying serializer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The value cannot be represented in the format.
    #[error("encode error ({format}): {message}")]
    Encode { format: Format, message: String },

    /// The bytes are not a valid encoding of the requested type.
    #[error("decode error ({format}): {message}")]
    Decode { format: Format, message: String },

    /// No codec handles the format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(Format),

    /// The tag cannot be used as a format name.
    #[error("invalid format tag {tag:?}: {message}")]
    InvalidFormat { tag: String, message: String },
}

impl Error {
    pub fn encode(format: Format, message: impl ToString) -> Self {
        Error::Encode {
            format,
            message: message.to_string(),
        }
    }

    pub fn decode(format: Format, message: impl ToString) -> Self {
        Error::Decode {
            format,
            message: message.to_string(),
        }
    }

    /// Whether the error came from bytes that failed to parse.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let e = Error::decode(Format::JSON, "unexpected token");
        let display = format!("{}", e);
        assert!(display.contains("decode error"));
        assert!(display.contains("json"));
        assert!(display.contains("unexpected token"));
        assert!(e.is_decode());
    }

    #[test]
    fn encode_error_display() {
        let e = Error::encode(Format::XML, "unsupported shape");
        let display = format!("{}", e);
        assert!(display.contains("encode error"));
        assert!(display.contains("xml"));
        assert!(!e.is_decode());
    }

    #[test]
    fn unsupported_format_display() {
        let e = Error::UnsupportedFormat(Format::from_static("yaml"));
        assert_eq!(format!("{}", e), "unsupported format: yaml");
    }

    #[test]
    fn invalid_format_display() {
        let e = Format::new("a/b").unwrap_err();
        assert_eq!(
            format!("{}", e),
            "invalid format tag \"a/b\": expected non-empty [a-z0-9_-]"
        );
    }
}
