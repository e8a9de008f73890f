use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label → accumulated weight map.
///
/// Labels are trimmed on insert and blank labels are ignored. Merging two
/// tallies sums the weights of colliding labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, u64>);

impl Tally {
    /// Create an empty tally.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add `weight` to `label`. Blank labels are ignored.
    pub fn add(&mut self, label: &str, weight: u64) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        *self.0.entry(label.to_string()).or_insert(0) += weight;
    }

    /// Add one to `label`.
    pub fn bump(&mut self, label: &str) {
        self.add(label, 1);
    }

    /// Current weight of `label` (0 when absent).
    #[must_use]
    pub fn get(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// Whether `label` has been recorded.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no label has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Iterate labels in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for (label, weight) in &other.0 {
            *self.0.entry(label.clone()).or_insert(0) += weight;
        }
    }

    /// The `n` heaviest labels, descending by weight; ties keep lexical order.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Tally {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut t = Self::new();
        for (label, weight) in iter {
            t.add(label, weight);
        }
        t
    }
}
