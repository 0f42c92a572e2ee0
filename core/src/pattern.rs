//! Include/exclude rules and ordered rule collections.
//!
//! The text format is gitignore-like: one pattern per line, `#` starts a
//! comment line, and a leading `!` turns an exclusion into an inclusion.
//!
//! ```text
//! # keep only the gregorian calendar
//! main.*.dates.calendars
//! !main.*.dates.calendars.gregorian
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{PathError, PatternError, Query};

/// A query plus the verdict for the nodes it matches.
///
/// A plain pattern removes what it matches; a negated (`!`) pattern keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    query: Query,
    negated: bool,
}

impl Pattern {
    /// Parse one pattern line. A single leading `!` negates it.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the query part is malformed.
    pub fn parse(line: &str) -> Result<Self, PathError> {
        match line.strip_prefix('!') {
            Some(rest) => Self::include(rest),
            None => Self::exclude(line),
        }
    }

    /// A pattern removing every node `expression` matches.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `expression` is malformed.
    pub fn exclude(expression: &str) -> Result<Self, PathError> {
        Ok(Self {
            query: Query::parse(expression)?,
            negated: false,
        })
    }

    /// A pattern keeping every node `expression` matches.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `expression` is malformed.
    pub fn include(expression: &str) -> Result<Self, PathError> {
        Ok(Self {
            query: Query::parse(expression)?,
            negated: true,
        })
    }

    /// The query part.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns `true` for `!` patterns.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns `true` if matched nodes are removed.
    #[must_use]
    pub fn removes(&self) -> bool {
        !self.negated
    }
}

impl FromStr for Pattern {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "{}", self.query)
    }
}

/// An ordered, immutable list of [`Pattern`]s.
///
/// Order matters: where two patterns match the same node, the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternCollection {
    patterns: Vec<Pattern>,
}

impl PatternCollection {
    /// A collection with no patterns. Subsetting with it changes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a collection rule by rule.
    #[must_use]
    pub fn builder() -> PatternCollectionBuilder {
        PatternCollectionBuilder::default()
    }

    /// Parse the line-oriented text format.
    ///
    /// Lines are trimmed. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first malformed line, numbered from 1.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let mut patterns = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let pattern = Pattern::parse(line).map_err(|source| PatternError {
                line: number + 1,
                source,
            })?;
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    /// Parse patterns that are already split, one per item.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first malformed item, numbered from 1.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                Pattern::parse(p.as_ref()).map_err(|source| PatternError { line: i + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if there are no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate in precedence order, lowest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }
}

impl<'a> IntoIterator for &'a PatternCollection {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

impl FromIterator<Pattern> for PatternCollection {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

impl FromStr for PatternCollection {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fluent construction of a [`PatternCollection`].
///
/// ```
/// use loca::PatternCollection;
///
/// let patterns = PatternCollection::builder()
///     .exclude("main.*.numbers")?
///     .include("main.en.numbers")?
///     .build();
/// assert_eq!(patterns.len(), 2);
/// # Ok::<(), loca::PathError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternCollectionBuilder {
    patterns: Vec<Pattern>,
}

impl PatternCollectionBuilder {
    /// Append a removing rule.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `expression` is malformed.
    pub fn exclude(mut self, expression: &str) -> Result<Self, PathError> {
        self.patterns.push(Pattern::exclude(expression)?);
        Ok(self)
    }

    /// Append a keeping rule.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `expression` is malformed.
    pub fn include(mut self, expression: &str) -> Result<Self, PathError> {
        self.patterns.push(Pattern::include(expression)?);
        Ok(self)
    }

    /// Append an already-parsed pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Finish the collection.
    #[must_use]
    pub fn build(self) -> PatternCollection {
        PatternCollection {
            patterns: self.patterns,
        }
    }
}
