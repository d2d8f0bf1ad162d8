use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or rendering error documents
///
/// None of these reach the HTTP layer: loaders log and skip the failing
/// input, and the renderer degrades to a plain-text body.
#[derive(Debug, Error)]
pub enum Error {
    /// No template is registered under the requested name
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// Template execution failed
    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Template source failed to compile
    #[error("failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Reading an override file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An override file is not valid TOML or JSON
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}
