use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Operator overrides for the status code → message catalog
///
/// Entries are kept as raw TOML values so a single malformed entry does
/// not reject the whole file; the catalog loader validates them one by one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// File with `code = "message"` pairs (`.toml` or `.json`)
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Inline `code = "message"` pairs, applied after `path`
    #[serde(default)]
    pub messages: BTreeMap<String, toml::Value>,
}
