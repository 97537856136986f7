//! Re-applies the blocker to content added after the initial pass.

use super::{BlockReport, Blocker, Document, MutationObserver, MutationRecord};

/// Mutation observer that filters every newly added element subtree.
pub struct SelectorWatcher {
    blocker: Blocker,
    check_added_root: bool,
    totals: BlockReport,
}

impl SelectorWatcher {
    /// `check_added_root` also tests each added element against the
    /// selectors, not only its descendants.
    pub fn new(blocker: Blocker, check_added_root: bool) -> Self {
        Self { blocker, check_added_root, totals: BlockReport::default() }
    }

    /// Removals made across all delivered batches.
    pub fn totals(&self) -> BlockReport {
        self.totals
    }
}

impl MutationObserver for SelectorWatcher {
    fn on_mutations(&mut self, records: &[MutationRecord], document: &mut Document) {
        let mut batch = BlockReport::default();

        for id in records.iter().flat_map(|record| record.added_nodes.iter().copied()) {
            if document.element(id).is_none() {
                continue;
            }

            if self.check_added_root && self.blocker.matches(document, id) {
                if document.remove(id) {
                    batch.removed += 1;
                }
                continue;
            }

            batch.removed += self.blocker.apply(document, Some(id)).removed;
        }

        if batch.removed > 0 {
            tracing::debug!(records = records.len(), removed = batch.removed, "filtered dynamic content");
        }
        self.totals += batch;
    }
}
