//! Store configuration.

use std::path::{Path, PathBuf};

use savefs_codec::Format;
use serde::{Deserialize, Serialize};

/// Where a store keeps its entries and how it encodes them.
///
/// The root directory is supplied by the host; the store never computes it.
/// A config is fixed once a store is built from it.
///
/// Deserializes from any serde source, e.g. `{"root": "/data", "format": "xml"}`.
/// `format` defaults to JSON when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    root: PathBuf,
    #[serde(default)]
    format: Format,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> &Format {
        &self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_from_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"root": "/data/saves", "format": "XML"}"#).unwrap();
        assert_eq!(config.root(), Path::new("/data/saves"));
        assert_eq!(config.format(), &Format::XML);
    }

    #[test]
    fn format_defaults_to_json() {
        let config: StoreConfig = serde_json::from_str(r#"{"root": "saves"}"#).unwrap();
        assert_eq!(config.format(), &Format::JSON);
    }

    #[test]
    fn rejects_format_tags_that_are_not_extensions() {
        for config in [
            r#"{"root": "saves", "format": ""}"#,
            r#"{"root": "saves", "format": "../json"}"#,
        ] {
            assert!(serde_json::from_str::<StoreConfig>(config).is_err());
        }
    }

    #[test]
    fn serializes_format_as_tag() {
        let config = StoreConfig::new("saves", Format::BINARY);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["format"], "binary");
        assert_eq!(json["root"], "saves");
    }
}
