//! In-memory DOM with structural mutation notifications.
//!
//! A [`Page`] owns the parsed document and a single observer slot scoped to
//! `<body>`. Content inserted under the body is queued as a
//! [`MutationRecord`]; [`Page::flush_mutations`] hands the queued batch to
//! the observer, the way an event loop delivers MutationObserver callbacks.

pub mod blocker;
pub mod watcher;

pub use blocker::{BlockReport, Blocker};
pub use watcher::SelectorWatcher;

use cosmetic_core::Error;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

/// A batch entry describing nodes appended under one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The parent the nodes were inserted into.
    pub target: NodeId,
    /// Inserted top-level nodes, elements and text alike.
    pub added_nodes: Vec<NodeId>,
}

/// Receives batches of structural mutations.
pub trait MutationObserver {
    fn on_mutations(&mut self, records: &[MutationRecord], document: &mut Document);
}

/// A parsed HTML document supporting descendant queries and node removal.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Serialize the attached tree back to HTML.
    pub fn html(&self) -> String {
        self.html.html()
    }

    /// The `<body>` element, if the parser produced one.
    pub fn body(&self) -> Option<NodeId> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .map(|el| el.id())
    }

    /// Element view of a node. `None` for text, comments and unknown ids.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Ids of elements matching `selector`, in document order.
    ///
    /// With `root: None` the whole document is searched, `<html>` included.
    /// With a root only its descendants are searched, never the root itself.
    pub fn select_ids(&self, selector: &Selector, root: Option<NodeId>) -> Vec<NodeId> {
        let (start, skip) = match root {
            Some(id) => match self.html.tree.get(id) {
                Some(node) => (node, 1),
                None => return Vec::new(),
            },
            None => (self.html.tree.root(), 0),
        };

        start
            .descendants()
            .skip(skip)
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| el.id())
            .collect()
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.html.tree.root().id();
        self.html
            .tree
            .get(id)
            .is_some_and(|node| node.id() == root || node.ancestors().any(|a| a.id() == root))
    }

    /// Detach a node (and its subtree) from the document.
    ///
    /// Returns true if the node was part of the document before removal.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.html.tree.root().id() {
            return false;
        }
        let attached = self.is_attached(id);
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
        attached
    }

    /// Parse `fragment` and append its top-level nodes to `parent`.
    ///
    /// Returns the ids of the appended top-level nodes.
    pub fn append_html(&mut self, parent: NodeId, fragment: &str) -> Result<Vec<NodeId>, Error> {
        if self.html.tree.get(parent).is_none() {
            return Err(Error::Dom(format!("unknown parent node {:?}", parent)));
        }

        let parsed = Html::parse_fragment(fragment);
        let mut added = Vec::new();
        for child in parsed.root_element().children() {
            added.push(self.graft(parent, child)?);
        }
        Ok(added)
    }

    fn graft(&mut self, parent: NodeId, source: ego_tree::NodeRef<'_, scraper::Node>) -> Result<NodeId, Error> {
        let id = self
            .html
            .tree
            .get_mut(parent)
            .ok_or_else(|| Error::Dom(format!("unknown parent node {:?}", parent)))?
            .append(source.value().clone())
            .id();

        for child in source.children() {
            self.graft(id, child)?;
        }
        Ok(id)
    }
}

/// A loaded page: the document plus its mutation observer.
pub struct Page {
    document: Document,
    observer: Option<Box<dyn MutationObserver>>,
    observed_root: Option<NodeId>,
    pending: Vec<MutationRecord>,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self { document: Document::parse(html), observer: None, observed_root: None, pending: Vec::new() }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn html(&self) -> String {
        self.document.html()
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    /// Register `observer` for additions anywhere under `<body>`.
    ///
    /// Replaces any previous observer. Only mutations made after this call
    /// are reported.
    pub fn observe(&mut self, observer: Box<dyn MutationObserver>) -> Result<(), Error> {
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Dom("document has no body to observe".into()))?;

        self.observer = Some(observer);
        self.observed_root = Some(body);
        self.pending.clear();
        Ok(())
    }

    /// Insert HTML under `parent`, queueing a mutation record when the
    /// parent lies inside the observed subtree.
    pub fn insert_html(&mut self, parent: NodeId, fragment: &str) -> Result<Vec<NodeId>, Error> {
        let added = self.document.append_html(parent, fragment)?;

        if !added.is_empty() && self.in_observed_subtree(parent) {
            self.pending.push(MutationRecord { target: parent, added_nodes: added.clone() });
        }

        Ok(added)
    }

    /// Append HTML to the end of `<body>`.
    pub fn append_to_body(&mut self, fragment: &str) -> Result<Vec<NodeId>, Error> {
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Dom("document has no body".into()))?;
        self.insert_html(body, fragment)
    }

    /// Number of queued, undelivered mutation records.
    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    /// Deliver queued mutation records to the observer as one batch.
    ///
    /// Returns the number of records delivered.
    pub fn flush_mutations(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let records = std::mem::take(&mut self.pending);

        match self.observer.as_mut() {
            Some(observer) => {
                observer.on_mutations(&records, &mut self.document);
                records.len()
            }
            None => 0,
        }
    }

    fn in_observed_subtree(&self, node: NodeId) -> bool {
        let Some(root) = self.observed_root else {
            return false;
        };
        if !self.document.is_attached(node) {
            return false;
        }
        node == root
            || self
                .document
                .html
                .tree
                .get(node)
                .is_some_and(|n| n.ancestors().any(|a| a.id() == root))
    }
}
