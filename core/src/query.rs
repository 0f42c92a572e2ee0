//! `Query` — Path expressions with wildcards, evaluated against documents.
//!
//! A query is a path whose segments may also be:
//!
//! - `*` — any member of an object
//! - `[*]` — any element of an array
//! - `..key` — `key` at any depth below the current node
//!
//! A leading `$` names the root and is optional. Matching is purely structural:
//! there are no value predicates.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::path::{Token, Tokens};
use crate::{Path, PathError, PathErrorKind};

/// One step of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Exactly this object member.
    Key(String),
    /// Exactly this array element.
    Index(usize),
    /// Every member of an object.
    AnyKey,
    /// Every element of an array.
    AnyIndex,
    /// Every member named so, at any depth below the current node.
    Descendant(String),
}

/// A parsed path-query expression.
///
/// Parsing happens once, up front; [`select`](Self::select) never fails.
///
/// # Example
///
/// ```
/// use loca::Query;
/// use serde_json::json;
///
/// let doc = json!({ "a": [{ "b": 1 }, { "b": 2 }], "c": { "b": 3 } });
///
/// let query = Query::parse("a[*].b").unwrap();
/// let paths: Vec<String> = query.select(&doc).iter().map(|p| p.to_string()).collect();
/// assert_eq!(paths, ["a[0].b", "a[1].b"]);
///
/// let query = Query::parse("$..b").unwrap();
/// assert_eq!(query.select(&doc).len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    expression: String,
    selectors: Vec<Selector>,
}

impl Query {
    /// Parse a query expression.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `expression` does not follow the query grammar.
    pub fn parse(expression: &str) -> Result<Self, PathError> {
        let mut selectors = Vec::new();
        // Segments seen so far, counting a leading `$`.
        let mut seen = 0usize;

        for token in Tokens::new(expression)? {
            let (offset, token) = token?;
            let first = seen == 0;
            seen += 1;

            let selector = match token {
                Token::Key { dots: 0, name: "$" } if first => continue,
                Token::Key { name: "$", .. } => {
                    return Err(PathError::new(
                        expression,
                        offset,
                        PathErrorKind::MisplacedRoot,
                    ));
                }
                Token::Index(index) => Selector::Index(index),
                Token::AnyIndex => Selector::AnyIndex,
                Token::Quoted(key) => Selector::Key(key.to_owned()),
                Token::Key { dots: 2, name: "*" } => {
                    return Err(PathError::new(
                        expression,
                        offset,
                        PathErrorKind::EmptyDescent,
                    ));
                }
                Token::Key { dots: 2, name } => Selector::Descendant(name.to_owned()),
                Token::Key { dots, name } => {
                    // A bare key opens the query; `.key` follows a segment or `$`.
                    let expected = usize::from(!first);
                    if dots != expected {
                        let kind = if dots == 0 {
                            PathErrorKind::MissingDot
                        } else {
                            PathErrorKind::Unexpected
                        };
                        return Err(PathError::new(expression, offset, kind));
                    }
                    if name == "*" {
                        Selector::AnyKey
                    } else {
                        Selector::Key(name.to_owned())
                    }
                }
            };
            selectors.push(selector);
        }

        Ok(Self {
            expression: expression.to_owned(),
            selectors,
        })
    }

    /// The expression this query was parsed from.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The parsed selectors, root first.
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Returns `true` if this query only matches the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Evaluate this query against `root`.
    ///
    /// Returns the concrete path of every matched node, in document order.
    /// A selector applied to a node of the wrong kind (a key on an array, an
    /// index on an object, anything on a scalar) matches nothing.
    #[must_use]
    pub fn select(&self, root: &Value) -> Vec<Path> {
        let mut frontier: Vec<(Path, &Value)> = vec![(Path::root(), root)];

        for selector in &self.selectors {
            let mut next = Vec::new();
            for (path, value) in frontier {
                apply(selector, path, value, &mut next);
            }
            if next.is_empty() {
                return Vec::new();
            }
            frontier = next;
        }

        frontier.into_iter().map(|(path, _)| path).collect()
    }
}

fn apply<'v>(selector: &Selector, path: Path, value: &'v Value, out: &mut Vec<(Path, &'v Value)>) {
    match (selector, value) {
        (Selector::Key(key), Value::Object(map)) => {
            if let Some(child) = map.get(key) {
                out.push((path.child_key(key), child));
            }
        }
        (Selector::Index(index), Value::Array(items)) => {
            if let Some(child) = items.get(*index) {
                out.push((path.child_index(*index), child));
            }
        }
        (Selector::AnyKey, Value::Object(map)) => {
            out.extend(map.iter().map(|(key, child)| (path.child_key(key), child)));
        }
        (Selector::AnyIndex, Value::Array(items)) => {
            out.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, child)| (path.child_index(index), child)),
            );
        }
        (Selector::Descendant(key), _) => descend(key, &path, value, out),
        _ => {}
    }
}

/// Collect every member named `key` strictly below `value`, in document order.
fn descend<'v>(key: &str, path: &Path, value: &'v Value, out: &mut Vec<(Path, &'v Value)>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let child_path = path.child_key(name);
                if name == key {
                    out.push((child_path.clone(), child));
                }
                descend(key, &child_path, child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                descend(key, &path.child_index(index), child, out);
            }
        }
        _ => {}
    }
}

impl FromStr for Query {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
