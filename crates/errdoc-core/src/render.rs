use errdoc_config::{Config, TemplatesConfig};
use http::StatusCode;
use http::request::Parts;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::catalog::{ErrorCatalog, coerce_status};
use crate::negotiate::{Representation, extract_code, negotiate};
use crate::templates::{FALLBACK_TEMPLATE, TemplateStore};

/// Data available to every template
///
/// Each field is exposed under its lowercase name and under the
/// capitalized name (`Status`, `Error`, `Title`) older templates use.
#[derive(Debug, Clone)]
pub struct Payload<'a> {
    pub status: u16,
    pub error: &'a str,
    pub title: &'a str,
}

impl Serialize for Payload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("error", self.error)?;
        map.serialize_entry("title", self.title)?;
        map.serialize_entry("Status", &self.status)?;
        map.serialize_entry("Error", self.error)?;
        map.serialize_entry("Title", self.title)?;
        map.end()
    }
}

/// Representation → template name bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTable {
    pub json: String,
    pub html: String,
    pub plain_text: String,
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::from_config(&TemplatesConfig::default())
    }
}

impl TemplateTable {
    pub fn from_config(config: &TemplatesConfig) -> Self {
        Self {
            json: config.json.clone(),
            html: config.html.clone(),
            plain_text: config.plain_text.clone(),
        }
    }

    /// Template bound to `representation`; `Unknown` uses the HTML binding
    pub fn name_for(&self, representation: Representation) -> &str {
        match representation {
            Representation::Json => &self.json,
            Representation::PlainText => &self.plain_text,
            Representation::Html | Representation::Unknown => &self.html,
        }
    }
}

/// A fully rendered response, ready to hand to the serving layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl ErrorPage {
    /// Terminal fallback: `500` with the reason phrase of `requested`
    ///
    /// Cannot fail, whatever the state of the template store.
    pub fn plain(requested: StatusCode) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: Representation::PlainText.content_type(),
            body: requested.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

/// Orchestrates code extraction, negotiation, lookup, and rendering
///
/// Built once and shared read-only between request handlers.
#[derive(Debug, Default)]
pub struct ErrorPageRenderer {
    catalog: ErrorCatalog,
    store: TemplateStore,
    table: TemplateTable,
    title: String,
}

impl ErrorPageRenderer {
    pub fn new(catalog: ErrorCatalog, store: TemplateStore, table: TemplateTable, title: impl Into<String>) -> Self {
        Self {
            catalog,
            store,
            table,
            title: title.into(),
        }
    }

    /// Load the catalog and template store described by `config`
    pub fn from_config(config: &Config) -> Self {
        let catalog = ErrorCatalog::load(&config.errors);
        let store = TemplateStore::load(&config.templates);

        tracing::info!(
            messages = catalog.len(),
            templates = ?store.names(),
            "error page renderer ready"
        );

        Self::new(
            catalog,
            store,
            TemplateTable::from_config(&config.templates),
            config.server.title.clone(),
        )
    }

    pub const fn catalog(&self) -> &ErrorCatalog {
        &self.catalog
    }

    pub const fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Render the error document a request asks for
    pub fn render(&self, parts: &Parts) -> ErrorPage {
        let code = extract_code(parts);
        let representation = negotiate(parts);

        self.render_code(code, representation)
    }

    /// Render the document for a raw `code` in `representation`
    ///
    /// The body is rendered into a buffer first, so a failing template
    /// never leaves a half-written response behind.
    pub fn render_code(&self, code: i64, representation: Representation) -> ErrorPage {
        let status = coerce_status(code);
        let representation = representation.or_default();
        let template = self.resolve_template(representation);

        let payload = Payload {
            status: status.as_u16(),
            error: self.catalog.message(status.as_u16()),
            title: &self.title,
        };

        let mut body = Vec::new();
        if let Err(e) = self.store.render(template, &mut body, &payload) {
            tracing::error!(error = %e, template, "failed to execute template");
            return ErrorPage::plain(status);
        }

        match String::from_utf8(body) {
            Ok(body) => ErrorPage {
                status,
                content_type: representation.content_type(),
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, template, "template produced invalid UTF-8");
                ErrorPage::plain(status)
            }
        }
    }

    /// Bound template name, or the fallback when nothing is registered under it
    fn resolve_template(&self, representation: Representation) -> &str {
        let name = self.table.name_for(representation);

        if self.store.contains(name) {
            name
        } else {
            tracing::warn!(template = name, fallback = FALLBACK_TEMPLATE, "template not found, using fallback");
            FALLBACK_TEMPLATE
        }
    }
}
