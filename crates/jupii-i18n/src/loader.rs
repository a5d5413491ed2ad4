//! Locating and loading catalog files for a locale.
//!
//! Files are named `<prefix><separator><locale><suffix>`, e.g.
//! `harbour-jupii-de.ts`. A locale tag is tried from most to least
//! specific: `de_DE.UTF-8` looks for `..-de_DE.ts`, then `..-de.ts`.
//!
//! Compiled snapshots (`.json`, requires the `serde` feature) load into the
//! same catalog as the TS file they were compiled from.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::CatalogError;
use crate::ts::TsDocument;

/// Where catalog files live and how they are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub directory: PathBuf,
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
    /// Whether non-empty unfinished translations answer lookups.
    pub include_unfinished: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("translations"),
            prefix: "harbour-jupii".into(),
            separator: "-".into(),
            suffix: ".ts".into(),
            include_unfinished: true,
        }
    }
}

impl LoadOptions {
    /// File name used for one locale candidate.
    #[must_use]
    pub fn file_name(&self, locale: &str) -> String {
        format!("{}{}{}{}", self.prefix, self.separator, locale, self.suffix)
    }
}

/// Locale tags to try for `tag`, most specific first.
///
/// Encoding (`.UTF-8`) and modifier (`@euro`) suffixes are dropped.
#[must_use]
pub fn locale_candidates(tag: &str) -> Vec<String> {
    let base = tag.split(['.', '@']).next().unwrap_or_default().trim();
    let mut candidates = Vec::new();
    let mut current = base;
    while !current.is_empty() {
        candidates.push(current.to_owned());
        match current.rfind(['_', '-']) {
            Some(pos) => current = &current[..pos],
            None => break,
        }
    }
    candidates
}

/// First existing catalog file for `tag`.
#[must_use]
pub fn find_file(options: &LoadOptions, tag: &str) -> Option<PathBuf> {
    locale_candidates(tag).into_iter().find_map(|candidate| {
        let path = options.directory.join(options.file_name(&candidate));
        if path.is_file() {
            Some(path)
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!(path = %path.display(), "no catalog file");
            None
        }
    })
}

/// Read and build the catalog stored at `path`.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|err| CatalogError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let document = if path.extension().is_some_and(|ext| ext == "json") {
        decode_snapshot(&text)?
    } else {
        TsDocument::parse(&text)?
    };

    let catalog = CatalogBuilder::new(String::new())
        .include_unfinished(options.include_unfinished)
        .build_document(document)?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        path = %path.display(),
        language = %catalog.language(),
        entries = catalog.len(),
        "loaded translation catalog"
    );

    Ok(catalog)
}

/// Load the catalog for `tag`, or `Ok(None)` when no file matches.
pub fn load_for_locale(options: &LoadOptions, tag: &str) -> Result<Option<Catalog>, CatalogError> {
    match find_file(options, tag) {
        Some(path) => load_file(&path, options).map(Some),
        None => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                locale = tag,
                directory = %options.directory.display(),
                "no translation catalog for locale; falling back to source strings"
            );
            Ok(None)
        }
    }
}

/// Encode a catalog as a compiled JSON snapshot.
#[cfg(feature = "serde")]
pub fn encode_snapshot(catalog: &Catalog) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(&catalog.to_document())
        .map_err(|err| CatalogError::Snapshot(err.to_string()))
}

/// Write a compiled JSON snapshot to `path`.
#[cfg(feature = "serde")]
pub fn write_snapshot(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let json = encode_snapshot(catalog)?;
    fs::write(path, json).map_err(|err| CatalogError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(feature = "serde")]
fn decode_snapshot(text: &str) -> Result<TsDocument, CatalogError> {
    serde_json::from_str(text).map_err(|err| CatalogError::Snapshot(err.to_string()))
}

#[cfg(not(feature = "serde"))]
fn decode_snapshot(_text: &str) -> Result<TsDocument, CatalogError> {
    Err(CatalogError::Snapshot(
        "json snapshots require the `serde` feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GERMAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TS version="2.1" language="de">
<context>
    <name>CoverPage</name>
    <message>
        <source>Unknown</source>
        <translation type="unfinished">Unbekannt</translation>
    </message>
</context>
</TS>
"#;

    fn write_catalog(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn candidates_strip_encoding_and_regions() {
        assert_eq!(locale_candidates("de_DE.UTF-8@euro"), vec!["de_DE", "de"]);
        assert_eq!(locale_candidates("pt-BR"), vec!["pt-BR", "pt"]);
        assert_eq!(locale_candidates("sr_RS_latin"), vec!["sr_RS_latin", "sr_RS", "sr"]);
        assert_eq!(locale_candidates("de"), vec!["de"]);
        assert!(locale_candidates("").is_empty());
        assert!(locale_candidates(".UTF-8").is_empty());
    }

    #[test]
    fn default_file_name() {
        assert_eq!(LoadOptions::default().file_name("de"), "harbour-jupii-de.ts");
    }

    #[test]
    fn finds_least_specific_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), "harbour-jupii-de.ts", GERMAN);
        let options = LoadOptions {
            directory: dir.path().to_path_buf(),
            ..LoadOptions::default()
        };
        assert_eq!(find_file(&options, "de_AT.UTF-8"), Some(path));
        assert_eq!(find_file(&options, "fr_FR"), None);
    }

    #[test]
    fn prefers_region_specific_file() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "harbour-jupii-de.ts", GERMAN);
        let specific = write_catalog(dir.path(), "harbour-jupii-de_CH.ts", GERMAN);
        let options = LoadOptions {
            directory: dir.path().to_path_buf(),
            ..LoadOptions::default()
        };
        assert_eq!(find_file(&options, "de_CH"), Some(specific));
    }

    #[test]
    fn load_for_locale_applies_options() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "harbour-jupii-de.ts", GERMAN);
        let options = LoadOptions {
            directory: dir.path().to_path_buf(),
            include_unfinished: false,
            ..LoadOptions::default()
        };
        let catalog = load_for_locale(&options, "de_DE").unwrap().unwrap();
        assert_eq!(catalog.language(), "de");
        assert_eq!(catalog.lookup("CoverPage", "Unknown", None), "Unknown");
    }

    #[test]
    fn missing_locale_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = LoadOptions {
            directory: dir.path().to_path_buf(),
            ..LoadOptions::default()
        };
        assert!(load_for_locale(&options, "ja").unwrap().is_none());
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.ts"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(!err.is_malformed());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), "broken.ts", "<TS language=\"de\"><context>");
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ts = write_catalog(dir.path(), "harbour-jupii-de.ts", GERMAN);
        let options = LoadOptions::default();
        let catalog = load_file(&ts, &options).unwrap();

        let json = dir.path().join("harbour-jupii-de.json");
        write_snapshot(&catalog, &json).unwrap();
        let reloaded = load_file(&json, &options).unwrap();
        assert_eq!(reloaded.entries(), catalog.entries());
        assert_eq!(reloaded.language(), "de");
        assert_eq!(reloaded.version(), Some("2.1"));
    }

    #[cfg(not(feature = "serde"))]
    #[test]
    fn snapshot_requires_serde() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), "x.json", "{}");
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Snapshot(_)));
    }
}
