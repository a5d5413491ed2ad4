#![forbid(unsafe_code)]

//! Translation catalogs for Jupii.
//!
//! Loads Qt Linguist `.ts` files into an immutable catalog indexed by UI
//! context and source string, selects plural forms with per-locale rules,
//! and falls back to the untranslated source text whenever a translation
//! is missing.
//!
//! # How it fits together
//! [`ts`] reads documents into flat [`RawEntry`] records, [`catalog`]
//! indexes them, [`loader`] finds the right file for a locale, and
//! [`handle`] lets the UI session swap catalogs on a locale change without
//! readers ever seeing a half-built one.

pub mod catalog;
pub mod entry;
pub mod error;
pub mod handle;
pub mod loader;
pub mod placeholders;
pub mod plural;
pub mod report;
pub mod ts;

pub use catalog::{Catalog, CatalogBuilder, Context, ContextId, Entry};
pub use entry::{Location, RawEntry, Translation, TranslationStatus};
pub use error::CatalogError;
pub use handle::CatalogHandle;
pub use loader::{LoadOptions, find_file, load_file, load_for_locale, locale_candidates};
pub use placeholders::{apply_args, substitute_count};
pub use plural::{PluralCategory, PluralRule};
pub use report::{CatalogStats, ContextCoverage, CoverageReport, Issue, IssueKind};
pub use ts::TsDocument;
