//! Ordered selector sets extracted from element-hiding rules.

use serde::{Deserialize, Serialize};

/// An ordered sequence of CSS selector strings.
///
/// Order follows the order of appearance in the source filter list.
/// Duplicates are kept. Serialized as a plain JSON array; decoding goes
/// through `push`, so blank entries never make it into the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectorSet(Vec<String>);

impl SelectorSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a selector. Empty or whitespace-only strings are ignored.
    pub fn push(&mut self, selector: impl Into<String>) {
        let selector = selector.into();
        if !selector.trim().is_empty() {
            self.0.push(selector);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for SelectorSet {
    fn from(selectors: Vec<String>) -> Self {
        selectors.into_iter().collect()
    }
}

impl From<SelectorSet> for Vec<String> {
    fn from(set: SelectorSet) -> Self {
        set.0
    }
}

impl FromIterator<String> for SelectorSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SelectorSet::new();
        for selector in iter {
            set.push(selector);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SelectorSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
