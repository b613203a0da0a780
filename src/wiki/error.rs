// Wiki error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Page store failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Page file missing or unreadable
    #[error("page '{title}' not found: {source}")]
    NotFound {
        title: String,
        #[source]
        source: io::Error,
    },
    /// Page file could not be written
    #[error("open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    #[cfg(test)]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Template loading and rendering failure
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("template '{name}': {message}")]
    Parse { name: String, message: String },
    #[error("template '{name}': {message}")]
    Render { name: String, message: String },
}
