use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use errdoc_config::TemplatesConfig;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Error, Result};

/// Template that always exists and renders when nothing better does
pub const FALLBACK_TEMPLATE: &str = "html.tmpl";

/// File extensions eligible for registration
const ALLOWED_EXTENSIONS: &[&str] = &["tmpl", "html", "json"];

/// Templates bundled into the binary
const BUILTIN: &[(&str, &str)] = &[
    ("html.tmpl", include_str!("../templates/html.tmpl")),
    ("json.tmpl", include_str!("../templates/json.tmpl")),
];

/// Name-indexed templates merged from the builtin and override layers
///
/// The override layer replaces builtin templates with the same file name;
/// names are compared per template, so overriding `json.tmpl` leaves the
/// bundled `html.tmpl` in place. The merge happens once at load time.
pub struct TemplateStore {
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore").field("templates", &self.names()).finish()
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateStore {
    /// Store holding only the bundled templates
    pub fn builtin() -> Self {
        Self::from_layers(builtin_layer(), BTreeMap::new())
    }

    /// Build the store from configuration
    ///
    /// A missing or non-directory override path is logged and ignored, as
    /// are override files that fail to read or compile.
    pub fn load(config: &TemplatesConfig) -> Self {
        let custom = config
            .path
            .as_deref()
            .map(custom_layer)
            .unwrap_or_default();

        Self::from_layers(builtin_layer(), custom)
    }

    fn from_layers(builtin: BTreeMap<String, String>, custom: BTreeMap<String, String>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(auto_escape_for);

        let mut merged = builtin;
        merged.extend(custom);

        for (name, source) in merged {
            if let Err(e) = env.add_template_owned(name.clone(), source) {
                tracing::warn!(template = %name, error = %e, "failed to register template");
            }
        }

        Self { env }
    }

    /// Whether a template is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Names of all registered templates, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.env.templates().map(|(name, _)| name.to_string()).collect();
        names.sort();
        names
    }

    /// Render the named template against `payload` into `writer`
    ///
    /// Output may be partially written when rendering fails; callers that
    /// need all-or-nothing should render into a buffer.
    pub fn render<S: Serialize, W: io::Write>(&self, name: &str, writer: W, payload: S) -> Result<()> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => Error::TemplateNotFound(name.to_string()),
            _ => Error::Render {
                name: name.to_string(),
                source: e,
            },
        })?;

        template
            .render_to_write(payload, writer)
            .map_err(|source| Error::Render {
                name: name.to_string(),
                source,
            })?;

        Ok(())
    }
}

/// JSON-ish templates emit values as JSON literals, everything else is HTML
fn auto_escape_for(name: &str) -> AutoEscape {
    if name.contains("json") {
        AutoEscape::Json
    } else {
        AutoEscape::Html
    }
}

fn allowed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext))
}

fn builtin_layer() -> BTreeMap<String, String> {
    BUILTIN
        .iter()
        .filter(|(name, _)| allowed(Path::new(name)))
        .map(|(name, source)| ((*name).to_string(), (*source).to_string()))
        .collect()
}

/// Walk the override directory, keyed by base file name
fn custom_layer(root: &Path) -> BTreeMap<String, String> {
    if !root.is_dir() {
        tracing::warn!(path = %root.display(), "custom templates directory does not exist");
        return BTreeMap::new();
    }

    let mut layer = BTreeMap::new();

    for path in walk(root) {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(source) => {
                let e = Error::Io { path: path.clone(), source };
                tracing::warn!(error = %e, "skipping custom template");
                continue;
            }
        };

        if let Err(e) = compile(name, &source) {
            tracing::warn!(path = %path.display(), error = %e, "skipping custom template");
            continue;
        }

        tracing::debug!(template = name, path = %path.display(), "registered custom template");
        layer.insert(name.to_string(), source);
    }

    layer
}

/// Check that `source` compiles without touching the real store
fn compile(name: &str, source: &str) -> Result<()> {
    let mut env = Environment::new();
    env.add_template(name, source).map_err(|source| Error::Compile {
        name: name.to_string(),
        source,
    })
}

/// Allowed files under `root`, depth-first in file name order
fn walk(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "failed to read custom templates directory");
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok().map(|entry| entry.path())).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                pending.push(path);
            } else if allowed(&path) {
                files.push(path);
            }
        }
    }

    files
}
