//! Errors raised while reading or building a catalog.
//!
//! Lookups never fail; every error here is fatal to catalog construction
//! and no partially built catalog is handed out.

use std::path::PathBuf;

/// Errors from catalog construction and loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The document is not well-formed XML.
    Xml { position: u64, message: String },
    /// Well-formed XML that does not describe a TS catalog.
    Malformed(String),
    /// A required attribute is absent.
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// A required child element is absent.
    MissingElement {
        element: &'static str,
        context: String,
    },
    /// A record names an empty context.
    EmptyContextName { source: String },
    /// A plural-aware record carries no forms.
    EmptyPluralForms { context: String, source: String },
    /// The catalog file could not be read.
    Io { path: PathBuf, message: String },
    /// A compiled snapshot could not be decoded.
    Snapshot(String),
}

impl CatalogError {
    /// Whether the error describes bad catalog content rather than an
    /// unreadable file.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml { position, message } => {
                write!(f, "xml error at byte {position}: {message}")
            }
            Self::Malformed(msg) => write!(f, "malformed catalog: {msg}"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing the '{attribute}' attribute")
            }
            Self::MissingElement { element, context } => {
                write!(f, "message in context '{context}' has no <{element}>")
            }
            Self::EmptyContextName { source } => {
                write!(f, "entry '{source}' belongs to a context with an empty name")
            }
            Self::EmptyPluralForms { context, source } => {
                write!(f, "plural entry '{source}' in context '{context}' has no forms")
            }
            Self::Io { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Snapshot(msg) => write!(f, "invalid snapshot: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}
