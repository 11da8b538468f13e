//! Error types for request validation and catalog loading.

use std::path::PathBuf;

/// Why a request was rejected before any substitution ran.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Document text cannot be empty")]
    EmptyDocument,

    #[error("Person name cannot be empty")]
    EmptyPersonName,

    #[error("No terms selected for replacement")]
    NoTermsSelected,
}

/// Failure to read or parse a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Line numbers are 1-based.
    #[error("malformed catalog line {line}: {content:?} (expected `term<TAB>rationale`)")]
    MalformedLine { line: usize, content: String },
}
