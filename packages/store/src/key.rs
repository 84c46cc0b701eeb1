//! Entry keys and their file-name encoding.

use std::fmt::{self, Write};

use crate::Error;

/// Characters that may not appear literally in a file stem.
const RESERVED: &[char] = &['%', '/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// A validated entry key.
///
/// Any non-empty string is a valid key. Keys are stored under a reversible
/// percent-encoded file stem, so a key can never name a directory, escape the
/// store root, or collide with a different key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_key(key, "keys must not be empty"));
        }
        Ok(Key(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file name of this key without its format extension.
    pub fn file_stem(&self) -> String {
        let all_dots = self.0.chars().all(|c| c == '.');
        let mut stem = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            if (all_dots && c == '.') || c.is_control() || RESERVED.contains(&c) {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    // Writing to a String cannot fail.
                    let _ = write!(stem, "%{:02X}", byte);
                }
            } else {
                stem.push(c);
            }
        }
        stem
    }

    /// Recover a key from a file stem produced by [`Key::file_stem`].
    pub fn from_file_stem(stem: &str) -> Result<Self, Error> {
        let invalid = |message: &str| Error::invalid_key(stem, message);

        let mut bytes = Vec::with_capacity(stem.len());
        let mut rest = stem.as_bytes();
        while let Some((&first, tail)) = rest.split_first() {
            if first == b'%' {
                let hex = tail
                    .get(..2)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .ok_or_else(|| invalid("malformed escape"))?;
                let byte = u8::from_str_radix(hex, 16).map_err(|_| invalid("malformed escape"))?;
                bytes.push(byte);
                rest = &tail[2..];
            } else {
                bytes.push(first);
                rest = tail;
            }
        }

        let key = String::from_utf8(bytes).map_err(|_| invalid("escapes are not UTF-8"))?;
        Key::new(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Key {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Key::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Key::new(s)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
