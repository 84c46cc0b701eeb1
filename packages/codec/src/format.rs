//! Format tags for stored values.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A tag naming the encoding of stored bytes.
///
/// The tag is used verbatim as the file extension of an entry, so
/// `Format::JSON` entries live at `<root>/<key>.json`. Tags are non-empty and
/// made of lowercase ASCII letters, digits, `-` and `_`; anything else could
/// name a different file or directory.
///
/// The built-in formats are available as constants. Additional formats are
/// plain tags: register a `Codec` for them in a `CodecRegistry`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Format(Cow<'static, str>);

impl Format {
    /// Compact binary encoding (`binary`)
    pub const BINARY: Format = Format(Cow::Borrowed("binary"));

    /// XML documents (`xml`)
    pub const XML: Format = Format(Cow::Borrowed("xml"));

    /// JSON documents (`json`)
    pub const JSON: Format = Format(Cow::Borrowed("json"));

    /// Create a format from a static tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag is not a valid lowercase tag. In a `const` item the
    /// check runs at compile time.
    pub const fn from_static(tag: &'static str) -> Self {
        assert!(is_valid_tag(tag), "format tags must be non-empty lowercase [a-z0-9_-]");
        Format(Cow::Borrowed(tag))
    }

    /// Create a format from any tag. The tag is lowercased, then checked.
    pub fn new(tag: impl AsRef<str>) -> Result<Self, Error> {
        let tag = tag.as_ref().to_ascii_lowercase();
        if !is_valid_tag(&tag) {
            return Err(Error::InvalidFormat {
                tag,
                message: "expected non-empty [a-z0-9_-]".to_string(),
            });
        }
        Ok(Format(Cow::Owned(tag)))
    }

    /// Get the format tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file extension used for entries in this format.
    pub fn extension(&self) -> &str {
        self.as_str()
    }

    /// The formats every `CodecRegistry::with_builtin` registry knows.
    pub fn builtin() -> [Format; 3] {
        [Format::BINARY, Format::XML, Format::JSON]
    }
}

const fn is_valid_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => {}
            _ => return false,
        }
        i += 1;
    }
    true
}

impl Default for Format {
    fn default() -> Self {
        Format::JSON
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::new(s)
    }
}

impl TryFrom<&str> for Format {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Format::new(s)
    }
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Format::new(tag).map_err(D::Error::custom)
    }
}
