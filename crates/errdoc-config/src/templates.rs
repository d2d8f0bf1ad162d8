use std::path::PathBuf;

use serde::Deserialize;

/// Template override directory and the representation → template bindings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory whose templates shadow the bundled ones by file name
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_json")]
    pub json: String,
    #[serde(default = "default_html")]
    pub html: String,
    /// Plain text reuses the HTML document unless told otherwise
    #[serde(default = "default_html")]
    pub plain_text: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: None,
            json: default_json(),
            html: default_html(),
            plain_text: default_html(),
        }
    }
}

fn default_json() -> String {
    "json.tmpl".to_string()
}

fn default_html() -> String {
    "html.tmpl".to_string()
}
