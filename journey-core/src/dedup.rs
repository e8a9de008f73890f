use std::collections::HashSet;

/// Set of canonical work urls already processed in the current scan run.
///
/// A guard lives for exactly one run. It is never persisted: a resumed scan
/// starts with an empty guard.
#[derive(Debug, Clone, Default)]
pub struct DedupGuard {
    seen: HashSet<String>,
}

impl DedupGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `false` when it was already recorded this run.
    pub fn mark_if_new(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string())
    }
}
