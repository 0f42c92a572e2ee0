//! `LocaleFilter` — which locales a build keeps.
//!
//! Patterns select paths inside a document; the locale filter selects whole
//! documents. Both lists hold locale codes where `*` stands for any run of
//! characters and `?` for exactly one. Matching ignores case.
//!
//! - An empty include list includes every locale.
//! - Exclusion wins over inclusion.

use regex::Regex;

use crate::Locale;

/// Include/exclude lists of locale code wildcards, compiled once.
///
/// # Example
///
/// ```
/// use loca::LocaleFilter;
///
/// let filter = LocaleFilter::new(["zh*"], ["zh-Hans-*", "zh-Hant-*"]).unwrap();
/// assert!(filter.is_allowed("zh-Hant"));
/// assert!(filter.is_allowed("ZH-hans"));
/// assert!(!filter.is_allowed("zh-Hant-MO"));
/// assert!(!filter.is_allowed("en"));
/// ```
#[derive(Debug, Clone)]
pub struct LocaleFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl Default for LocaleFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl LocaleFilter {
    /// A filter that allows every locale.
    #[must_use]
    pub fn all() -> Self {
        Self {
            include: None,
            exclude: None,
        }
    }

    /// Compile include and exclude wildcard lists.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the combined pattern exceeds the regex size limit.
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns `true` if documents for `code` should be kept.
    #[must_use]
    pub fn is_allowed(&self, code: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |re| re.is_match(code));
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(code));
        included && !excluded
    }

    /// [`is_allowed`](Self::is_allowed) on the locale's canonical code.
    #[must_use]
    pub fn allows(&self, locale: &Locale) -> bool {
        self.is_allowed(&locale.code())
    }

    /// Returns `true` if this filter lets everything through.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

/// One anchored, case-insensitive alternation, or `None` for an empty list.
fn compile<I, S>(wildcards: I) -> Result<Option<Regex>, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let alternatives: Vec<String> = wildcards
        .into_iter()
        .map(|w| wildcard_to_regex(w.as_ref()))
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|"))).map(Some)
}

fn wildcard_to_regex(wildcard: &str) -> String {
    regex::escape(wildcard)
        .replace(r"\*", ".*")
        .replace(r"\?", ".")
}
