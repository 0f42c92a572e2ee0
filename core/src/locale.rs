//! Locale identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InvalidLocale;

/// Code of the sentinel locale for data that belongs to no locale.
const NONE_CODE: &str = "none";

/// A locale: language, script, territory and variant, each optional.
///
/// Identity is the canonical [`code`](Self::code), the hyphen-joined subtags
/// in that fixed order. Deserializes from the CLDR `identity` object.
///
/// ```
/// use loca::Locale;
///
/// let locale: Locale = "sr_Latn_RS".parse().unwrap();
/// assert_eq!(locale.code(), "sr-Latn-RS");
/// assert_eq!(locale, Locale::new("sr").with_script("Latn").with_territory("RS"));
/// assert!(locale.is_territory_locale());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locale {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    territory: Option<String>,
    #[serde(default)]
    variant: Option<String>,
}

impl Locale {
    /// A language-only locale.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            script: None,
            territory: None,
            variant: None,
        }
    }

    /// The sentinel for data not tied to any locale. Its code is `"none"`.
    #[must_use]
    pub fn none() -> Self {
        Self {
            language: None,
            script: None,
            territory: None,
            variant: None,
        }
    }

    /// Set the script subtag.
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Set the territory subtag.
    #[must_use]
    pub fn with_territory(mut self, territory: impl Into<String>) -> Self {
        self.territory = Some(territory.into());
        self
    }

    /// Set the variant subtag.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Language subtag, e.g. `en`.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Script subtag, e.g. `Latn`.
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Territory subtag, e.g. `GB` or `419`.
    #[must_use]
    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    /// Variant subtag, e.g. `POSIX`.
    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Canonical code: the set subtags joined by `-`, or `"none"`.
    #[must_use]
    pub fn code(&self) -> String {
        let subtags: Vec<&str> = self.subtags().collect();
        if subtags.is_empty() {
            NONE_CODE.to_owned()
        } else {
            subtags.join("-")
        }
    }

    /// Returns `true` for the [`none`](Self::none) sentinel, and for anything
    /// that compares equal to it, such as `Locale::new("none")`.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.code() == NONE_CODE
    }

    /// A language (optionally with script) but no territory or variant.
    #[must_use]
    pub fn is_language_locale(&self) -> bool {
        self.language.is_some() && self.territory.is_none() && self.variant.is_none()
    }

    /// A language together with a territory.
    #[must_use]
    pub fn is_territory_locale(&self) -> bool {
        self.language.is_some() && self.territory.is_some()
    }

    fn subtags(&self) -> impl Iterator<Item = &str> {
        [&self.language, &self.script, &self.territory, &self.variant]
            .into_iter()
            .filter_map(|s| s.as_deref())
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for Locale {}

impl Hash for Locale {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    /// Parse `language[-Script][-TT|-NNN][-variant...]`, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NONE_CODE {
            return Ok(Self::none());
        }

        let mut parts = s.split(['-', '_']).peekable();
        let language = match parts.next() {
            Some(language) if is_alpha(language, 2..=8) => language,
            _ => return Err(InvalidLocale(s.to_owned())),
        };
        let mut locale = Self::new(language);

        if let Some(script) = parts.next_if(|p| is_alpha(p, 4..=4)) {
            locale.script = Some(script.to_owned());
        }
        if let Some(territory) = parts.next_if(|p| is_alpha(p, 2..=2) || is_digits(p, 3)) {
            locale.territory = Some(territory.to_owned());
        }

        let rest: Vec<&str> = parts.collect();
        if rest.iter().any(|p| p.is_empty()) {
            return Err(InvalidLocale(s.to_owned()));
        }
        if !rest.is_empty() {
            locale.variant = Some(rest.join("-"));
        }
        Ok(locale)
    }
}

fn is_alpha(part: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_digits(part: &str, len: usize) -> bool {
    part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
}
