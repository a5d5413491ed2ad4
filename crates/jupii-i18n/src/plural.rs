//! Plural rules mapping a count to a numerus form.
//!
//! TS files store plural translations as an ordered list of
//! `<numerusform>` elements. The order is fixed per language: it follows
//! the CLDR categories the language distinguishes, from the most specific
//! one to the catch-all. A [`PluralRule`] knows that order and maps any
//! count to a position in it.
//!
//! # Invariants
//!
//! 1. `form_index(n) < form_count()` for every `n`.
//! 2. `categories()[form_index(n)] == categorize(n)`.
//! 3. Negative counts are classified by their magnitude.

/// CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Lowercase CLDR name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

/// A family of plural rules sharing the same numerus forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, Korean, Turkish, ...).
    Single,
    /// Singular for exactly one, plural otherwise (German, English, ...).
    #[default]
    Germanic,
    /// Singular for zero and one (French, Brazilian Portuguese).
    French,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian, Bosnian.
    EastSlavic,
    Polish,
    /// Czech and Slovak.
    Czech,
    Slovenian,
    Arabic,
}

impl PluralRule {
    /// Pick the rule for a locale tag such as `de`, `de_DE`, `pt-BR` or
    /// `ru_RU.UTF-8`. Unknown languages use [`PluralRule::Germanic`].
    #[must_use]
    pub fn for_locale(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let base = tag.split(['.', '@']).next().unwrap_or_default();
        let mut parts = base.split(['-', '_']);
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        match language {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "tr" | "lo" | "my" => Self::Single,
            "fr" | "ln" | "ak" | "am" | "hy" => Self::French,
            "pt" if region == "br" => Self::French,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::Czech,
            "sl" => Self::Slovenian,
            "ar" => Self::Arabic,
            _ => Self::Germanic,
        }
    }

    /// Categories this rule distinguishes, in numerus-form order.
    #[must_use]
    pub const fn categories(self) -> &'static [PluralCategory] {
        use PluralCategory::*;
        match self {
            Self::Single => &[Other],
            Self::Germanic | Self::French => &[One, Other],
            Self::EastSlavic | Self::Polish => &[One, Few, Many],
            Self::Czech => &[One, Few, Other],
            Self::Slovenian => &[One, Two, Few, Other],
            Self::Arabic => &[Zero, One, Two, Few, Many, Other],
        }
    }

    /// Number of numerus forms a complete translation carries.
    #[must_use]
    pub const fn form_count(self) -> usize {
        self.categories().len()
    }

    /// Classify a count.
    #[must_use]
    pub fn categorize(self, count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;

        match self {
            Self::Single => PluralCategory::Other,
            Self::Germanic => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::French => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Polish => {
                if n == 1 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Czech => match n {
                1 => PluralCategory::One,
                2..=4 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
            Self::Slovenian => match mod100 {
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                3 | 4 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
            Self::Arabic => match n {
                0 => PluralCategory::Zero,
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                _ if (3..=10).contains(&mod100) => PluralCategory::Few,
                _ if (11..=99).contains(&mod100) => PluralCategory::Many,
                _ => PluralCategory::Other,
            },
        }
    }

    /// Position of the numerus form used for `count`.
    #[must_use]
    pub fn form_index(self, count: i64) -> usize {
        let category = self.categorize(count);
        self.categories()
            .iter()
            .position(|&c| c == category)
            .unwrap_or(0)
    }

    /// Short name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Germanic => "germanic",
            Self::French => "french",
            Self::EastSlavic => "east-slavic",
            Self::Polish => "polish",
            Self::Czech => "czech",
            Self::Slovenian => "slovenian",
            Self::Arabic => "arabic",
        }
    }
}
