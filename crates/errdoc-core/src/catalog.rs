use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use errdoc_config::ErrorsConfig;
use http::StatusCode;

use crate::error::{Error, Result};

/// Standard reason phrase for `code`, if it has one
pub fn reason_phrase(code: i64) -> Option<&'static str> {
    let code = u16::try_from(code).ok()?;
    StatusCode::from_u16(code).ok()?.canonical_reason()
}

/// Map a client-supplied code onto a status the server is willing to send
///
/// Codes without a standard reason phrase become `500`.
pub fn coerce_status(code: i64) -> StatusCode {
    if reason_phrase(code).is_none() {
        tracing::info!(code, "invalid request code extracted from request");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Status code → human-readable message table
///
/// Seeded with the standard reason phrases, then overlaid with the
/// operator's file and inline messages. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    messages: HashMap<u16, String>,
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        let messages = (100..=599)
            .filter_map(|code| {
                let phrase = StatusCode::from_u16(code).ok()?.canonical_reason()?;
                Some((code, phrase.to_string()))
            })
            .collect();

        Self { messages }
    }
}

impl ErrorCatalog {
    /// Build the catalog from configuration
    ///
    /// Unreadable files and malformed entries are logged and skipped.
    pub fn load(config: &ErrorsConfig) -> Self {
        let mut catalog = Self::default();

        if let Some(ref path) = config.path {
            match read_overrides(path) {
                Ok(entries) => catalog.extend(entries, &path.display().to_string()),
                Err(e) => tracing::warn!(error = %e, "failed to load custom errors"),
            }
        }

        let inline = config
            .messages
            .iter()
            .map(|(code, value)| (code.clone(), value.as_str().map(str::to_owned)));
        catalog.extend(inline, "errors.messages");

        catalog
    }

    /// Message configured for `code`
    pub fn lookup(&self, code: u16) -> Option<&str> {
        self.messages.get(&code).map(String::as_str)
    }

    /// Message for `code`, degrading to the reason phrase, then to `""`
    pub fn message(&self, code: u16) -> &str {
        self.lookup(code)
            .or_else(|| reason_phrase(i64::from(code)))
            .unwrap_or_default()
    }

    /// Number of codes with a message
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn extend(&mut self, entries: impl IntoIterator<Item = (String, Option<String>)>, source: &str) {
        for (key, message) in entries {
            let Ok(code) = key.trim().parse::<u16>() else {
                tracing::warn!(source, key = %key, "skipping error message with non-numeric code");
                continue;
            };

            let Some(message) = message else {
                tracing::warn!(source, code, "skipping error message that is not a string");
                continue;
            };

            self.messages.insert(code, message);
        }
    }
}

/// Read `code = "message"` pairs from a TOML or JSON file
fn read_overrides(path: &Path) -> Result<Vec<(String, Option<String>)>> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let entries = if is_json {
        serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&raw)
            .map_err(|e| parse_error(e.to_string()))?
            .into_iter()
            .map(|(code, value)| (code, value.as_str().map(str::to_owned)))
            .collect()
    } else {
        toml::from_str::<BTreeMap<String, toml::Value>>(&raw)
            .map_err(|e| parse_error(e.to_string()))?
            .into_iter()
            .map(|(code, value)| (code, value.as_str().map(str::to_owned)))
            .collect()
    };

    Ok(entries)
}
