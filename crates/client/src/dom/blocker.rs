//! Selector-driven element removal.

use super::Document;
use cosmetic_core::{Error, SelectorSet};
use ego_tree::NodeId;
use scraper::Selector;

/// Outcome of one [`Blocker::apply`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReport {
    /// Elements detached from the document.
    pub removed: usize,
    /// Selectors that could not be parsed and were not applied.
    pub skipped: usize,
}

impl std::ops::AddAssign for BlockReport {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.skipped += other.skipped;
    }
}

struct Rule {
    source: String,
    selector: Selector,
}

/// Compiled selector set that removes matching elements.
///
/// Each selector is parsed once. An unparsable selector is logged and
/// skipped; it never prevents the others from applying.
pub struct Blocker {
    rules: Vec<Rule>,
    invalid: Vec<String>,
}

/// Parse one CSS selector.
pub fn compile_selector(source: &str) -> Result<Selector, Error> {
    Selector::parse(source)
        .map_err(|e| Error::InvalidSelector { selector: source.to_string(), reason: format!("{:?}", e) })
}

impl Blocker {
    pub fn new(selectors: &SelectorSet) -> Self {
        let mut rules = Vec::with_capacity(selectors.len());
        let mut invalid = Vec::new();

        for source in selectors {
            match compile_selector(source) {
                Ok(selector) => rules.push(Rule { source: source.clone(), selector }),
                Err(e) => {
                    tracing::warn!(selector = %source, error = %e, "invalid selector ignored");
                    invalid.push(source.clone());
                }
            }
        }

        Self { rules, invalid }
    }

    /// Number of selectors that will be applied.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selectors rejected at compile time, in input order.
    pub fn invalid(&self) -> &[String] {
        &self.invalid
    }

    /// Whether the element `id` itself matches any selector.
    pub fn matches(&self, document: &Document, id: NodeId) -> bool {
        document
            .element(id)
            .is_some_and(|el| self.rules.iter().any(|rule| rule.selector.matches(&el)))
    }

    /// Remove every element under `root` that matches a selector.
    ///
    /// `root: None` searches the whole document. Matches for one selector
    /// are collected first and removed in document order.
    pub fn apply(&self, document: &mut Document, root: Option<NodeId>) -> BlockReport {
        let mut report = BlockReport { removed: 0, skipped: self.invalid.len() };

        for rule in &self.rules {
            let matches = document.select_ids(&rule.selector, root);
            let mut removed = 0;
            for id in matches {
                if document.remove(id) {
                    removed += 1;
                }
            }
            if removed > 0 {
                tracing::trace!(selector = %rule.source, removed, "removed matching elements");
            }
            report.removed += removed;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
        <body>
            <div class="ad-banner">banner</div>
            <p>content</p>
            <div id="sponsor"><span class="ad-banner">nested</span></div>
            <aside data-ad="1">side</aside>
        </body>
        </html>
    "#;

    fn set(items: &[&str]) -> SelectorSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_removes_matches() {
        let mut doc = Document::parse(PAGE);
        let blocker = Blocker::new(&set(&[".ad-banner", "aside[data-ad]"]));

        let report = blocker.apply(&mut doc, None);
        assert_eq!(report.removed, 3);
        assert_eq!(report.skipped, 0);

        let html = doc.html();
        assert!(!html.contains("banner"));
        assert!(!html.contains("nested"));
        assert!(!html.contains("side"));
        assert!(html.contains("content"));
        assert!(html.contains("sponsor"));
    }

    #[test]
    fn test_second_apply_removes_nothing() {
        let mut doc = Document::parse(PAGE);
        let blocker = Blocker::new(&set(&["#sponsor", ".ad-banner", "div"]));

        let first = blocker.apply(&mut doc, None);
        assert!(first.removed > 0);
        let after_first = doc.html();

        let second = blocker.apply(&mut doc, None);
        assert_eq!(second.removed, 0);
        assert_eq!(doc.html(), after_first);
    }

    #[test]
    fn test_invalid_selector_isolated() {
        let mut doc = Document::parse(PAGE);
        let blocker = Blocker::new(&set(&["#sponsor", "div:no-such-state", "aside[data-ad]"]));

        assert_eq!(blocker.len(), 2);
        assert_eq!(blocker.invalid(), &["div:no-such-state".to_string()]);

        let report = blocker.apply(&mut doc, None);
        assert_eq!(report.removed, 2);
        assert_eq!(report.skipped, 1);

        let html = doc.html();
        assert!(!html.contains("sponsor"));
        assert!(!html.contains("side"));
    }

    #[test]
    fn test_scoped_apply_skips_root() {
        let mut doc = Document::parse(PAGE);
        let sponsor = doc.select_ids(&compile_selector("#sponsor").unwrap(), None)[0];
        let blocker = Blocker::new(&set(&["#sponsor", ".ad-banner"]));

        let report = blocker.apply(&mut doc, Some(sponsor));
        assert_eq!(report.removed, 1);
        assert!(doc.is_attached(sponsor));
        assert!(doc.html().contains("banner"));
        assert!(!doc.html().contains("nested"));
    }

    #[test]
    fn test_matches_element_itself() {
        let doc = Document::parse(PAGE);
        let sponsor = doc.select_ids(&compile_selector("#sponsor").unwrap(), None)[0];

        assert!(Blocker::new(&set(&["div#sponsor"])).matches(&doc, sponsor));
        assert!(!Blocker::new(&set(&[".ad-banner"])).matches(&doc, sponsor));
    }

    #[test]
    fn test_compile_selector_error() {
        let result = compile_selector("##bad");
        assert!(matches!(result, Err(Error::InvalidSelector { ref selector, .. }) if selector == "##bad"));
    }

    #[test]
    fn test_empty_set() {
        let mut doc = Document::parse(PAGE);
        let blocker = Blocker::new(&SelectorSet::new());
        assert!(blocker.is_empty());
        assert_eq!(blocker.apply(&mut doc, None), BlockReport::default());
    }
}
