//! Translation catalog indexed by context and source text.
//!
//! # Invariants
//!
//! 1. **Lookups are total**: [`Catalog::lookup`] never fails. A missing
//!    context, a missing source string or an empty translation all resolve
//!    to the source text itself (identity fallback).
//!
//! 2. **No cross-context leakage**: an entry only answers lookups scoped to
//!    the context it was declared in, even when another context carries the
//!    same source text.
//!
//! 3. **One entry per key**: within a context, `(source, disambiguation)`
//!    resolves to at most one entry. Later duplicates are dropped at build
//!    time and counted.
//!
//! 4. **Thread safety**: `Catalog` is `Send + Sync` (all data is immutable
//!    after construction).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown context | Context not in catalog | Source returned |
//! | Unknown source | Key not in context | Source returned |
//! | Unfinished, empty | Draft translation | Source returned |
//! | Obsolete entry | `type="obsolete"`/`"vanished"` | Source returned |
//! | Form index out of range | Fewer forms than the rule expects | Last form used |
//! | Plural entry, no forms | Malformed input | Build fails |
//! | Empty context name | Malformed input | Build fails |

use std::collections::HashMap;

use crate::entry::{Location, RawEntry, Translation, TranslationStatus};
use crate::error::CatalogError;
use crate::placeholders::{apply_args, substitute_count};
use crate::plural::PluralRule;
use crate::ts::TsDocument;

/// Position of a context in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

impl ContextId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A named group of entries, one per UI screen.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    entries: Vec<usize>,
    by_source: HashMap<String, Vec<usize>>,
}

impl Context {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: Vec::new(),
            by_source: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries, obsolete ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    context: ContextId,
    source: String,
    disambiguation: Option<String>,
    translation: Translation,
    status: TranslationStatus,
    locations: Vec<Location>,
    extra_comment: Option<String>,
    translator_comment: Option<String>,
}

impl Entry {
    /// Back-reference to the owning context.
    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref()
    }

    #[must_use]
    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    #[must_use]
    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn extra_comment(&self) -> Option<&str> {
        self.extra_comment.as_deref()
    }

    #[must_use]
    pub fn translator_comment(&self) -> Option<&str> {
        self.translator_comment.as_deref()
    }

    #[must_use]
    pub fn is_plural(&self) -> bool {
        self.translation.is_plural()
    }
}

/// Options applied while building a [`Catalog`].
///
/// # Example
///
/// ```
/// use jupii_i18n::{CatalogBuilder, PluralRule, RawEntry};
///
/// let catalog = CatalogBuilder::new("de")
///     .plural_rule(PluralRule::Germanic)
///     .include_unfinished(false)
///     .build([RawEntry::new("AboutPage", "About", "Über")])
///     .unwrap();
/// assert_eq!(catalog.lookup("AboutPage", "About", None), "Über");
/// ```
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    language: String,
    source_language: Option<String>,
    version: Option<String>,
    plural_rule: Option<PluralRule>,
    include_unfinished: bool,
}

impl CatalogBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source_language: None,
            version: None,
            plural_rule: None,
            include_unfinished: true,
        }
    }

    /// Override the rule derived from the language tag.
    #[must_use]
    pub fn plural_rule(mut self, rule: PluralRule) -> Self {
        self.plural_rule = Some(rule);
        self
    }

    /// Whether non-empty unfinished translations answer lookups.
    #[must_use]
    pub fn include_unfinished(mut self, include: bool) -> Self {
        self.include_unfinished = include;
        self
    }

    #[must_use]
    pub fn source_language(mut self, language: Option<String>) -> Self {
        self.source_language = language;
        self
    }

    #[must_use]
    pub fn version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Index `records` into a catalog.
    ///
    /// Fails on the first record with an empty context name or a plural
    /// translation without forms.
    pub fn build<I>(self, records: I) -> Result<Catalog, CatalogError>
    where
        I: IntoIterator<Item = RawEntry>,
    {
        let plural_rule = self
            .plural_rule
            .unwrap_or_else(|| PluralRule::for_locale(&self.language));
        let mut contexts: Vec<Context> = Vec::new();
        let mut context_index: HashMap<String, ContextId> = HashMap::new();
        let mut entries: Vec<Entry> = Vec::new();
        let mut dropped_duplicates = 0;

        for record in records {
            if record.context.is_empty() {
                return Err(CatalogError::EmptyContextName {
                    source: record.source,
                });
            }
            if let Translation::Plural(forms) = &record.translation {
                if forms.is_empty() {
                    return Err(CatalogError::EmptyPluralForms {
                        context: record.context,
                        source: record.source,
                    });
                }
                #[cfg(feature = "tracing")]
                if forms.len() != plural_rule.form_count() {
                    tracing::warn!(
                        context = %record.context,
                        source = %record.source,
                        forms = forms.len(),
                        expected = plural_rule.form_count(),
                        "plural form count does not match the plural rule"
                    );
                }
            }

            let context_id = match context_index.get(&record.context) {
                Some(&id) => id,
                None => {
                    let id = ContextId(contexts.len());
                    contexts.push(Context::new(record.context.clone()));
                    context_index.insert(record.context.clone(), id);
                    id
                }
            };
            let context = &mut contexts[context_id.0];

            let indexed = record.status != TranslationStatus::Obsolete;
            if indexed {
                let duplicate = context.by_source.get(&record.source).is_some_and(|ids| {
                    ids.iter()
                        .any(|&i| entries[i].disambiguation == record.disambiguation)
                });
                if duplicate {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        context = %record.context,
                        source = %record.source,
                        "dropping duplicate message"
                    );
                    dropped_duplicates += 1;
                    continue;
                }
            }

            let id = entries.len();
            context.entries.push(id);
            if indexed {
                context
                    .by_source
                    .entry(record.source.clone())
                    .or_default()
                    .push(id);
            }
            entries.push(Entry {
                context: context_id,
                source: record.source,
                disambiguation: record.disambiguation,
                translation: record.translation,
                status: record.status,
                locations: record.locations,
                extra_comment: record.extra_comment,
                translator_comment: record.translator_comment,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            language = %self.language,
            contexts = contexts.len(),
            entries = entries.len(),
            dropped_duplicates,
            plural_rule = plural_rule.name(),
            "built translation catalog"
        );

        Ok(Catalog {
            language: self.language,
            source_language: self.source_language,
            version: self.version,
            plural_rule,
            include_unfinished: self.include_unfinished,
            contexts,
            context_index,
            entries,
            dropped_duplicates,
        })
    }

    /// Build from a parsed TS document, taking its language and header.
    pub fn build_document(self, document: TsDocument) -> Result<Catalog, CatalogError> {
        let TsDocument {
            version,
            language,
            source_language,
            records,
        } = document;
        Self {
            language,
            source_language,
            version,
            ..self
        }
        .build(records)
    }
}

/// Immutable translation catalog for one language.
///
/// # Example
///
/// ```
/// use jupii_i18n::{Catalog, RawEntry};
///
/// let catalog = Catalog::build(
///     "de",
///     [
///         RawEntry::new("AboutPage", "About", "Über"),
///         RawEntry::plural("AlbumsPage", "%n track(s)", ["%n Titel", "%n Titel"]),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(catalog.lookup("AboutPage", "About", None), "Über");
/// assert_eq!(catalog.lookup("AlbumsPage", "%n track(s)", Some(1)), "%n Titel");
/// assert_eq!(catalog.translate("AlbumsPage", "%n track(s)", Some(3)), "3 Titel");
/// assert_eq!(catalog.lookup("UnknownContext", "About", None), "About");
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    source_language: Option<String>,
    version: Option<String>,
    plural_rule: PluralRule,
    include_unfinished: bool,
    contexts: Vec<Context>,
    context_index: HashMap<String, ContextId>,
    entries: Vec<Entry>,
    dropped_duplicates: usize,
}

impl Catalog {
    /// Build with default options.
    pub fn build<I>(language: impl Into<String>, records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = RawEntry>,
    {
        CatalogBuilder::new(language).build(records)
    }

    /// A catalog without entries: every lookup falls back to the source.
    #[must_use]
    pub fn empty(language: impl Into<String>) -> Self {
        let language = language.into();
        Self {
            plural_rule: PluralRule::for_locale(&language),
            language,
            source_language: None,
            version: None,
            include_unfinished: true,
            contexts: Vec::new(),
            context_index: HashMap::new(),
            entries: Vec::new(),
            dropped_duplicates: 0,
        }
    }

    /// Parse and build a TS document with default options.
    pub fn from_ts_str(xml: &str) -> Result<Self, CatalogError> {
        let document = TsDocument::parse(xml)?;
        CatalogBuilder::new(String::new()).build_document(document)
    }

    // -----------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------

    /// Translate `source` within `context`, falling back to `source`.
    ///
    /// `n` selects the plural form of plural entries. Markers such as `%1`
    /// and `%n` are returned untouched.
    #[must_use]
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str, n: Option<i64>) -> &'a str {
        self.get(context, source, n).unwrap_or(source)
    }

    /// Like [`Catalog::lookup`], preferring the entry with the given
    /// disambiguation comment.
    #[must_use]
    pub fn lookup_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: Option<&str>,
        n: Option<i64>,
    ) -> &'a str {
        self.get_disambiguated(context, source, disambiguation, n)
            .unwrap_or(source)
    }

    /// Translation of `source` within `context`, or `None` when the
    /// identity fallback would apply.
    #[must_use]
    pub fn get(&self, context: &str, source: &str, n: Option<i64>) -> Option<&str> {
        self.get_disambiguated(context, source, None, n)
    }

    /// [`Catalog::get`] with a disambiguation comment.
    ///
    /// A usable translation of the entry with the exact comment wins;
    /// otherwise the entry without a comment answers.
    #[must_use]
    pub fn get_disambiguated(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        n: Option<i64>,
    ) -> Option<&str> {
        let usable = |wanted: Option<&str>| {
            self.find_entry(context, source, wanted)
                .and_then(|entry| self.text_for(entry, n))
        };
        match disambiguation.filter(|d| !d.is_empty()) {
            Some(wanted) => usable(Some(wanted)).or_else(|| usable(None)),
            None => usable(None),
        }
    }

    /// [`Catalog::lookup`] followed by `%n` / `%Ln` substitution when `n`
    /// is given.
    #[must_use]
    pub fn translate(&self, context: &str, source: &str, n: Option<i64>) -> String {
        let text = self.lookup(context, source, n);
        match n {
            Some(count) => substitute_count(text, count, &self.language),
            None => text.to_owned(),
        }
    }

    /// [`Catalog::translate`] followed by positional `%1`.. substitution.
    #[must_use]
    pub fn format(&self, context: &str, source: &str, n: Option<i64>, args: &[&str]) -> String {
        apply_args(&self.translate(context, source, n), args)
    }

    /// Entry answering `(context, source, disambiguation)`, if any.
    ///
    /// Obsolete entries are never returned.
    #[must_use]
    pub fn resolve(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&Entry> {
        match disambiguation.filter(|d| !d.is_empty()) {
            Some(wanted) => self
                .find_entry(context, source, Some(wanted))
                .or_else(|| self.find_entry(context, source, None)),
            None => self.find_entry(context, source, None),
        }
    }

    /// Indexed entry with exactly the given disambiguation.
    fn find_entry(&self, context: &str, source: &str, wanted: Option<&str>) -> Option<&Entry> {
        self.context(context)?
            .by_source
            .get(source)?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|entry| entry.disambiguation.as_deref() == wanted)
    }

    /// Text an entry contributes for `n`, or `None` when it is not usable.
    pub(crate) fn text_for<'a>(&self, entry: &'a Entry, n: Option<i64>) -> Option<&'a str> {
        match entry.status {
            TranslationStatus::Obsolete => return None,
            TranslationStatus::Unfinished if !self.include_unfinished => return None,
            _ => {}
        }
        let text = match &entry.translation {
            Translation::Single(text) => text.as_str(),
            Translation::Plural(forms) => {
                let index = n.map_or(0, |count| self.plural_rule.form_index(count));
                forms.get(index).or_else(|| forms.last())?.as_str()
            }
        };
        (!text.is_empty()).then_some(text)
    }

    // -----------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    #[must_use]
    pub fn includes_unfinished(&self) -> bool {
        self.include_unfinished
    }

    /// Contexts in first-appearance order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.iter()
    }

    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.context_index.get(name).map(|id| &self.contexts[id.0])
    }

    /// Name of the context an entry belongs to.
    #[must_use]
    pub fn context_name(&self, entry: &Entry) -> &str {
        self.contexts
            .get(entry.context.0)
            .map_or("", |context| context.name.as_str())
    }

    /// All entries in document order, obsolete ones included.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries of one context in document order.
    pub fn entries_in<'a>(&'a self, context: &'a Context) -> impl Iterator<Item = &'a Entry> {
        context.entries.iter().map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records dropped because their key was already present.
    #[must_use]
    pub fn dropped_duplicates(&self) -> usize {
        self.dropped_duplicates
    }

    /// Flatten back into records, in document order.
    pub fn records(&self) -> impl Iterator<Item = RawEntry> + '_ {
        self.entries.iter().map(|entry| RawEntry {
            context: self.context_name(entry).to_owned(),
            source: entry.source.clone(),
            disambiguation: entry.disambiguation.clone(),
            translation: entry.translation.clone(),
            status: entry.status,
            locations: entry.locations.clone(),
            extra_comment: entry.extra_comment.clone(),
            translator_comment: entry.translator_comment.clone(),
        })
    }

    /// Document form of the catalog, suitable for a compiled snapshot.
    #[must_use]
    pub fn to_document(&self) -> TsDocument {
        TsDocument {
            version: self.version.clone(),
            language: self.language.clone(),
            source_language: self.source_language.clone(),
            records: self.records().collect(),
        }
    }
}
