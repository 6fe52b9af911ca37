//! Test specifications.
//!
//! A specification is an ordered list of named test groups. Each group maps
//! a lexical form to the surface forms the generator must produce for it.
//! Group and key order is kept exactly as written in the source document,
//! because the report follows it.
//!
//! - [`loader`] - YAML document loading and section resolution
//! - [`invert`] - surface → lexical inversion of a group

pub mod invert;
pub mod loader;

pub use invert::{invert, InvertedGroup};
pub use loader::{split_command, Section, SectionConfig, SpecDocument, ToolCommand};

use crate::error::{MorphError, MorphResult};
use std::collections::HashSet;

/// One assertion: a lexical key and its expected surface forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntry {
    /// Lexical form fed to the generator.
    pub key: String,
    /// Expected surface forms, never empty.
    pub forms: Vec<String>,
}

/// A named, ordered set of assertions evaluated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    /// Group name as written in the specification.
    pub name: String,
    entries: Vec<TestEntry>,
}

impl TestGroup {
    /// Build a group, rejecting duplicate keys and empty form lists.
    pub fn new(name: impl Into<String>, entries: Vec<TestEntry>) -> MorphResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.forms.is_empty() {
                return Err(MorphError::config(format!(
                    "Test `{}` in group `{}` has no expected forms.",
                    entry.key, name
                )));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(MorphError::config(format!(
                    "Duplicate test `{}` in group `{}`.",
                    entry.key, name
                )));
            }
        }
        Ok(Self { name, entries })
    }

    /// `(key, forms)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter().map(|e| (&e.key, &e.forms))
    }

    /// Expected forms for a lexical key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.forms.as_slice())
    }

    /// Surface form → lexical keys mapping for analysis tests.
    pub fn inverted(&self) -> InvertedGroup {
        invert(self.iter())
    }

    /// Number of lexical keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the group has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The `Tests` part of a specification document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSpec {
    groups: Vec<TestGroup>,
}

impl TestSpec {
    /// Build a specification, rejecting duplicate group names.
    pub fn new(groups: Vec<TestGroup>) -> MorphResult<Self> {
        let mut seen = HashSet::new();
        for group in &groups {
            if !seen.insert(group.name.as_str()) {
                return Err(MorphError::config(format!(
                    "Duplicate test group `{}`.",
                    group.name
                )));
            }
        }
        Ok(Self { groups })
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }

    /// Look a group up by name.
    pub fn group(&self, name: &str) -> Option<&TestGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Groups to evaluate: all of them, or only the one named by `filter`.
    pub fn select(&self, filter: Option<&str>) -> MorphResult<Vec<&TestGroup>> {
        match filter {
            None => Ok(self.groups.iter().collect()),
            Some(name) => self
                .group(name)
                .map(|g| vec![g])
                .ok_or_else(|| MorphError::config(format!("Test `{}` not found.", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, forms: &[&str]) -> TestEntry {
        TestEntry {
            key: key.to_string(),
            forms: forms.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_group_preserves_order() {
        let group = TestGroup::new(
            "Noun",
            vec![entry("zebra", &["zebras"]), entry("ant", &["ants"])],
        )
        .unwrap();
        let keys: Vec<&String> = group.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zebra", "ant"]);
        assert_eq!(group.get("ant"), Some(&["ants".to_string()][..]));
    }

    #[test]
    fn test_group_rejects_duplicates() {
        let err = TestGroup::new("Noun", vec![entry("cat", &["cats"]), entry("cat", &["cat"])])
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate test `cat`"));
    }

    #[test]
    fn test_group_rejects_empty_forms() {
        let err = TestGroup::new("Noun", vec![entry("cat", &[])]).unwrap_err();
        assert!(matches!(err, MorphError::Config(_)));
    }

    #[test]
    fn test_select() {
        let spec = TestSpec::new(vec![
            TestGroup::new("Noun", vec![entry("cat", &["cats"])]).unwrap(),
            TestGroup::new("Verb", vec![entry("run", &["runs"])]).unwrap(),
        ])
        .unwrap();

        assert_eq!(spec.select(None).unwrap().len(), 2);
        let only = spec.select(Some("Verb")).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "Verb");
        assert!(spec.select(Some("Adj")).is_err());
    }
}
