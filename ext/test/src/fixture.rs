//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the loca subsetting engine and,
//! as a cross-check, the naive oracle.
//!
//! ```yaml
//! name: three_property_object
//! description: Removing and re-including object members
//! original: { k1: v1, k2: v2, k3: v3 }
//! cases:
//!   - name: remove_one
//!     patterns: ["k1"]
//!     expect: { k2: v2, k3: v3 }
//! ```

use loca::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::naive_subset;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The document every case starts from.
    pub original: Value,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Pattern lines, in precedence order.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// The document after subsetting. Omitted means unchanged.
    #[serde(default)]
    pub expect: Option<Value>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Value,
    pub actual: Value,
    /// What the naive oracle produced for the same input.
    pub oracle: Value,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    ///
    /// # Panics
    ///
    /// Panics if a case's patterns do not parse; fixtures are expected to be valid.
    pub fn run(&self) -> Vec<CaseResult> {
        self.cases
            .iter()
            .map(|case| {
                let patterns = PatternCollection::from_patterns(&case.patterns)
                    .unwrap_or_else(|e| panic!("fixture '{}' case '{}': {e}", self.name, case.name));
                let expected = case.expect.clone().unwrap_or_else(|| self.original.clone());

                let mut actual = self.original.clone();
                subset(&mut actual, &patterns);

                let mut oracle = self.original.clone();
                naive_subset(&mut oracle, &patterns);

                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == expected && oracle == expected,
                    expected,
                    actual,
                    oracle,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {} (oracle {})",
                self.name, result.case_name, result.expected, result.actual, result.oracle
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_run_inline_fixture() {
        let yaml = r#"
name: inline
description: smoke test
original: { k1: v1, k2: v2 }
cases:
  - name: untouched
  - name: remove_k1
    patterns: ["k1"]
    expect: { k2: v2 }
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        assert_eq!(fixture.cases.len(), 2);
        let results = fixture.run();
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn failing_case_is_reported() {
        let yaml = r#"
name: wrong
original: ["v"]
cases:
  - name: claims_nothing_removed
    patterns: ["[0]"]
    expect: ["v"]
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        let results = fixture.run();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, serde_json::json!([]));
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = "name: a\noriginal: {}\ncases: []\n---\nname: b\noriginal: []\ncases: []\n";
        let fixtures = Fixture::from_yaml_multi(yaml).unwrap();
        let names: Vec<&str> = fixtures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
