//! Statistics, coverage and consistency reports over a catalog.
//!
//! Coverage counts an entry as translated when every text it carries is
//! non-empty and its status lets it answer lookups. Obsolete entries are
//! excluded from the totals.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::catalog::{Catalog, Entry};
use crate::entry::{Translation, TranslationStatus};
use crate::placeholders::placeholders;

/// Entry counts for a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CatalogStats {
    pub language: String,
    pub plural_rule: String,
    pub contexts: usize,
    pub entries: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub plural: usize,
    pub dropped_duplicates: usize,
}

/// Coverage for the whole catalog.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CoverageReport {
    pub language: String,
    /// Entries that can answer lookups (obsolete excluded).
    pub total_entries: usize,
    pub translated_entries: usize,
    /// Per-context coverage in catalog order.
    pub contexts: Vec<ContextCoverage>,
    /// Coverage as a percentage (0.0–100.0).
    pub coverage_percent: f32,
}

/// Coverage for one context.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ContextCoverage {
    pub context: String,
    pub total: usize,
    pub translated: usize,
    /// Source strings that still resolve to themselves.
    pub untranslated: Vec<String>,
    pub coverage_percent: f32,
}

/// What is wrong with an entry's translation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IssueKind {
    /// The source uses `%N` but a translation does not.
    MissingPlaceholder(usize),
    /// A translation uses `%N` the source does not have.
    ExtraPlaceholder(usize),
    /// Plural entry whose form count differs from the plural rule.
    FormCount { expected: usize, found: usize },
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPlaceholder(n) => write!(f, "translation drops %{n}"),
            Self::ExtraPlaceholder(n) => write!(f, "translation adds %{n}"),
            Self::FormCount { expected, found } => {
                write!(f, "{found} plural forms, expected {expected}")
            }
        }
    }
}

/// A consistency problem found in one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Issue {
    pub context: String,
    pub source: String,
    pub kind: IssueKind,
}

impl Catalog {
    /// Count entries by status.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            language: self.language().to_owned(),
            plural_rule: self.plural_rule().name().to_owned(),
            contexts: self.contexts().count(),
            entries: self.len(),
            finished: 0,
            unfinished: 0,
            obsolete: 0,
            plural: 0,
            dropped_duplicates: self.dropped_duplicates(),
        };
        for entry in self.entries() {
            match entry.status() {
                TranslationStatus::Finished => stats.finished += 1,
                TranslationStatus::Unfinished => stats.unfinished += 1,
                TranslationStatus::Obsolete => stats.obsolete += 1,
            }
            if entry.is_plural() {
                stats.plural += 1;
            }
        }
        stats
    }

    /// Per-context translation coverage.
    #[must_use]
    pub fn coverage_report(&self) -> CoverageReport {
        let contexts: Vec<ContextCoverage> = self
            .contexts()
            .map(|context| {
                let mut total = 0;
                let mut untranslated = Vec::new();
                for entry in self.entries_in(context) {
                    if entry.status() == TranslationStatus::Obsolete {
                        continue;
                    }
                    total += 1;
                    if !self.is_translated(entry) {
                        untranslated.push(entry.source().to_owned());
                    }
                }
                let translated = total - untranslated.len();
                ContextCoverage {
                    context: context.name().to_owned(),
                    total,
                    translated,
                    untranslated,
                    coverage_percent: percent(translated, total),
                }
            })
            .collect();

        let total_entries = contexts.iter().map(|c| c.total).sum();
        let translated_entries = contexts.iter().map(|c| c.translated).sum();
        CoverageReport {
            language: self.language().to_owned(),
            total_entries,
            translated_entries,
            coverage_percent: percent(translated_entries, total_entries),
            contexts,
        }
    }

    /// Placeholder and plural-form mismatches, in document order.
    #[must_use]
    pub fn placeholder_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        let expected_forms = self.plural_rule().form_count();

        for entry in self.entries() {
            if entry.status() == TranslationStatus::Obsolete {
                continue;
            }
            let issue = |kind| Issue {
                context: self.context_name(entry).to_owned(),
                source: entry.source().to_owned(),
                kind,
            };

            if let Translation::Plural(forms) = entry.translation() {
                if forms.len() != expected_forms {
                    issues.push(issue(IssueKind::FormCount {
                        expected: expected_forms,
                        found: forms.len(),
                    }));
                }
            }

            let wanted: BTreeSet<usize> = placeholders(entry.source()).into_iter().collect();
            let mut missing = BTreeSet::new();
            let mut extra = BTreeSet::new();
            for text in entry.translation().texts().filter(|t| !t.is_empty()) {
                let used: BTreeSet<usize> = placeholders(text).into_iter().collect();
                missing.extend(wanted.difference(&used).copied());
                extra.extend(used.difference(&wanted).copied());
            }
            issues.extend(missing.into_iter().map(|n| issue(IssueKind::MissingPlaceholder(n))));
            issues.extend(extra.into_iter().map(|n| issue(IssueKind::ExtraPlaceholder(n))));
        }
        issues
    }

    fn is_translated(&self, entry: &Entry) -> bool {
        match entry.status() {
            TranslationStatus::Obsolete => false,
            TranslationStatus::Unfinished if !self.includes_unfinished() => false,
            _ => match entry.translation() {
                Translation::Single(text) => !text.is_empty(),
                Translation::Plural(forms) => {
                    !forms.is_empty() && forms.iter().all(|form| !form.is_empty())
                }
            },
        }
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total == 0 {
        100.0
    } else {
        (part as f32 / total as f32) * 100.0
    }
}
