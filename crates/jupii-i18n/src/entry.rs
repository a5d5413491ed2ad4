//! Catalog records as they appear in a TS document.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Translation state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TranslationStatus {
    /// Reviewed translation.
    #[default]
    Finished,
    /// Placeholder or draft; the text may be empty.
    Unfinished,
    /// The source string no longer exists in the application
    /// (`obsolete` and `vanished` in TS files).
    Obsolete,
}

impl TranslationStatus {
    /// Map the `type` attribute of a `<translation>` element.
    #[must_use]
    pub fn from_ts_type(value: Option<&str>) -> Self {
        match value {
            Some("unfinished") => Self::Unfinished,
            Some("obsolete" | "vanished") => Self::Obsolete,
            _ => Self::Finished,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Unfinished => "unfinished",
            Self::Obsolete => "obsolete",
        }
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Translation {
    /// A single string.
    Single(String),
    /// Numerus forms in plural-rule order.
    Plural(Vec<String>),
}

impl Translation {
    #[must_use]
    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Whether no text is present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Plural(forms) => forms.iter().all(String::is_empty),
        }
    }

    /// All texts, one for a single translation.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Plural(forms) => forms,
        };
        slice.iter().map(String::as_str)
    }
}

/// Source position a message was extracted from. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub filename: String,
    pub line: Option<u32>,
}

/// One flat catalog record: the input to [`crate::Catalog::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawEntry {
    pub context: String,
    pub source: String,
    /// Disambiguation comment (`<comment>`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub disambiguation: Option<String>,
    pub translation: Translation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: TranslationStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub locations: Vec<Location>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_comment: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub translator_comment: Option<String>,
}

impl RawEntry {
    /// A finished single-string record.
    pub fn new(
        context: impl Into<String>,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            disambiguation: None,
            translation: Translation::Single(translation.into()),
            status: TranslationStatus::Finished,
            locations: Vec::new(),
            extra_comment: None,
            translator_comment: None,
        }
    }

    /// A finished plural record.
    pub fn plural<I, S>(context: impl Into<String>, source: impl Into<String>, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            translation: Translation::Plural(forms.into_iter().map(Into::into).collect()),
            ..Self::new(context, source, "")
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_disambiguation(mut self, comment: impl Into<String>) -> Self {
        self.disambiguation = Some(comment.into());
        self
    }
}
