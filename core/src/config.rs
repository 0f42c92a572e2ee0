//! Config types for pattern collection and locale filter construction.
//!
//! These types mirror [`PatternCollection`] and [`LocaleFilter`] but are
//! serde-deserializable, so subsetting rules can live in JSON or YAML next to
//! the rest of a build's configuration.
//!
//! ```yaml
//! rules:
//!   - exclude: "main.*.dates.calendars"
//!   - include: "main.*.dates.calendars.gregorian"
//! locales:
//!   include: ["en*", "de"]
//!   exclude: ["en-US-POSIX"]
//! ```
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`SubsetConfig`] | [`PatternCollection`] | [`SubsetConfig::build()`] |
//! | [`RuleConfig`] | [`Pattern`] | [`RuleConfig::build()`] |
//! | [`LocaleFilterConfig`] | [`LocaleFilter`] | [`LocaleFilterConfig::build()`] |

use serde::{Deserialize, Serialize};

use crate::{LocaleFilter, PathError, Pattern, PatternCollection, PatternError};

/// Configuration for a [`PatternCollection`] and the locales it applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetConfig {
    /// Rules in precedence order; later rules win.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Which locales to keep. Omitted keeps all of them.
    #[serde(default)]
    pub locales: LocaleFilterConfig,
}

/// Configuration for one [`Pattern`]: a single-key map naming the verdict.
///
/// Uses untagged deserialization over one-field structs, so the same shape
/// loads from JSON and YAML:
///
/// ```json
/// { "exclude": "main.*.numbers" }
/// { "include": "main.en.numbers" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    /// Remove what the query matches.
    Exclude(ExcludeRule),
    /// Keep what the query matches.
    Include(IncludeRule),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeRule {
    pub exclude: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeRule {
    pub include: String,
}

impl RuleConfig {
    /// An exclude rule for `expression`.
    #[must_use]
    pub fn exclude(expression: impl Into<String>) -> Self {
        Self::Exclude(ExcludeRule {
            exclude: expression.into(),
        })
    }

    /// An include rule for `expression`.
    #[must_use]
    pub fn include(expression: impl Into<String>) -> Self {
        Self::Include(IncludeRule {
            include: expression.into(),
        })
    }

    /// Parse the rule's query.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the query is malformed.
    pub fn build(&self) -> Result<Pattern, PathError> {
        match self {
            Self::Exclude(rule) => Pattern::exclude(&rule.exclude),
            Self::Include(rule) => Pattern::include(&rule.include),
        }
    }
}

/// Configuration for a [`LocaleFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleFilterConfig {
    /// Locale code wildcards to keep. Empty keeps every locale.
    #[serde(default)]
    pub include: Vec<String>,
    /// Locale code wildcards to drop, even if included.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl LocaleFilterConfig {
    /// Compile the filter.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the wildcard lists are too large to compile.
    pub fn build(&self) -> Result<LocaleFilter, regex::Error> {
        LocaleFilter::new(&self.include, &self.exclude)
    }
}

impl SubsetConfig {
    /// Load the runtime collection, preserving rule order.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first malformed rule, numbered from 1.
    pub fn build(&self) -> Result<PatternCollection, PatternError> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| rule.build().map_err(|source| PatternError { line: i + 1, source }))
            .collect()
    }

    /// Load the locale filter.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the wildcard lists are too large to compile.
    pub fn locale_filter(&self) -> Result<LocaleFilter, regex::Error> {
        self.locales.build()
    }

    /// Convert the line-oriented pattern format into a config.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first malformed line.
    pub fn from_patterns_text(text: &str) -> Result<Self, PatternError> {
        let patterns = PatternCollection::parse(text)?;
        let rules = patterns
            .iter()
            .map(|pattern| {
                let expression = pattern.query().expression();
                if pattern.is_negated() {
                    RuleConfig::include(expression)
                } else {
                    RuleConfig::exclude(expression)
                }
            })
            .collect();
        Ok(Self {
            rules,
            locales: LocaleFilterConfig::default(),
        })
    }
}
