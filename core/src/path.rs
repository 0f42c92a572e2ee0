//! Path segments and the segment grammar.
//!
//! A path is an ordered list of segments. Three forms are accepted:
//!
//! | Form | Example | Segment |
//! |------|---------|---------|
//! | bare key | `dates`, `.gregorian` | [`PathSegment::Key`] |
//! | quoted key | `['en.GB']` | [`PathSegment::Key`] |
//! | index | `[0]` | [`PathSegment::Index`] |
//!
//! Bare keys use letters, digits and `- _ % / , $ + *`. After the first segment
//! a bare key needs a leading `.`; bracketed forms attach directly.
//!
//! The same tokenizer feeds [`Query`](crate::Query) parsing, which adds `[*]`,
//! a lone `*`, `..key` and a leading `$`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{PathError, PathErrorKind, MAX_EXPRESSION_LENGTH};

/// One segment of the grammar, anchored at the start of the remaining input.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"\[(?P<index>[0-9]+)\]",
        r"|\[(?P<any_index>\*)\]",
        r"|\['(?P<quoted>[^']+)'\]",
        r"|(?P<dots>\.\.?)?(?P<key>[A-Za-z0-9\-_%/,$+*]+)",
        r")"
    ))
    .expect("segment grammar is a valid regex")
});

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// An object member name.
    Key(String),
    /// An array position.
    Index(usize),
}

impl PathSegment {
    /// Returns the key, if this is a key segment.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }

    /// Returns the index, if this is an index segment.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(_) => None,
            Self::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// An address of a node: zero or more [`PathSegment`]s.
///
/// The empty path is the root (the current node).
///
/// # Example
///
/// ```
/// use loca::{Path, PathSegment};
///
/// let path = Path::parse("main['en-GB'].dates[0]").unwrap();
/// assert_eq!(path.segments(), &[
///     PathSegment::Key("main".into()),
///     PathSegment::Key("en-GB".into()),
///     PathSegment::Key("dates".into()),
///     PathSegment::Index(0),
/// ]);
/// assert_eq!(path.to_string(), "main.en-GB.dates[0]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an addressing path. Wildcards and recursive descent are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `input` does not follow the segment grammar.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();

        for token in Tokens::new(input)? {
            let (offset, token) = token?;
            let first = segments.is_empty();

            let segment = match token {
                Token::Index(index) => PathSegment::Index(index),
                Token::Quoted(key) => PathSegment::Key(key.to_owned()),
                Token::AnyIndex => {
                    return Err(PathError::new(input, offset, PathErrorKind::Wildcard));
                }
                Token::Key { dots: 0, name } if first => PathSegment::Key(name.to_owned()),
                Token::Key { dots: 1, name } if !first => PathSegment::Key(name.to_owned()),
                Token::Key { dots: 0, .. } => {
                    return Err(PathError::new(input, offset, PathErrorKind::MissingDot));
                }
                Token::Key { dots: 2, .. } => {
                    return Err(PathError::new(input, offset, PathErrorKind::Descent));
                }
                Token::Key { .. } => {
                    return Err(PathError::new(input, offset, PathErrorKind::Unexpected));
                }
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// The segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    /// A copy of this path extended by an object key.
    #[must_use]
    pub fn child_key(&self, key: &str) -> Self {
        let mut child = self.clone();
        child.segments.push(PathSegment::Key(key.to_owned()));
        child
    }

    /// A copy of this path extended by an array index.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.segments.push(PathSegment::Index(index));
        child
    }

    /// The path of the containing node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Returns `true` if `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if is_bare(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => write!(f, "['{key}']")?,
            }
        }
        Ok(())
    }
}

/// Returns `true` if `key` can be written without brackets.
pub(crate) fn is_bare(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_%/,$+*".contains(c))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tokenizer (shared with query parsing)
// ═══════════════════════════════════════════════════════════════════════════════

/// A raw segment before path- or query-specific validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `[n]`
    Index(usize),
    /// `[*]`
    AnyIndex,
    /// `['...']`
    Quoted(&'a str),
    /// `key`, `.key` or `..key`; `dots` counts the leading dots.
    Key { dots: usize, name: &'a str },
}

/// Iterator over `(offset, token)` pairs of an expression.
pub(crate) struct Tokens<'a> {
    input: &'a str,
    offset: usize,
    failed: bool,
}

impl<'a> Tokens<'a> {
    /// Start tokenizing `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PathErrorKind::TooLong`] for inputs over [`MAX_EXPRESSION_LENGTH`].
    pub(crate) fn new(input: &'a str) -> Result<Self, PathError> {
        if input.len() > MAX_EXPRESSION_LENGTH {
            return Err(PathError::new(input, 0, PathErrorKind::TooLong));
        }
        Ok(Self {
            input,
            offset: 0,
            failed: false,
        })
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<(usize, Token<'a>), PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.input.len() {
            return None;
        }

        let offset = self.offset;
        let rest = &self.input[offset..];
        let Some(caps) = SEGMENT.captures(rest) else {
            self.failed = true;
            return Some(Err(PathError::new(
                self.input,
                offset,
                PathErrorKind::Unexpected,
            )));
        };

        // Group 0 always participates in a successful match.
        self.offset += caps.get(0).map_or(0, |m| m.end());

        let token = if let Some(index) = caps.name("index") {
            match index.as_str().parse::<usize>() {
                Ok(index) => Token::Index(index),
                Err(_) => {
                    self.failed = true;
                    return Some(Err(PathError::new(
                        self.input,
                        offset,
                        PathErrorKind::IndexOverflow,
                    )));
                }
            }
        } else if caps.name("any_index").is_some() {
            Token::AnyIndex
        } else if let Some(quoted) = caps.name("quoted") {
            Token::Quoted(quoted.as_str())
        } else {
            let dots = caps.name("dots").map_or(0, |m| m.as_str().len());
            let name = caps.name("key").map_or("", |m| m.as_str());
            Token::Key { dots, name }
        };

        Some(Ok((offset, token)))
    }
}
