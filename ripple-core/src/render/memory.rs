//! In-memory render target.
//!
//! [`MemoryTarget`] is a small document model: an arena of element nodes
//! with attributes, listeners, and mixed text/element content. It backs the
//! test suite and the demo, and counts every mutation so callers can
//! check how much work a patch did.
//!
//! Nodes removed with `remove_child`, or dropped from a parent by a text or
//! markup replacement, are discarded with their whole subtree, listeners
//! included. Their handles become unknown. Nodes that were created but never
//! attached stay in the arena until the document is dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use super::listener::{Listener, ListenerId};
use super::target::{Container, NodeHandle, RenderTarget};
use crate::error::TargetError;

/// Tags accepted by [`RenderTarget::create_node`].
const KNOWN_TAGS: &[&str] = &[
    "a", "abbr", "article", "aside", "b", "blockquote", "body", "br", "button", "canvas",
    "code", "dd", "div", "dl", "dt", "em", "fieldset", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "i", "img", "input", "label", "legend", "li", "main",
    "nav", "ol", "option", "p", "pre", "section", "select", "small", "span", "strong", "sub",
    "sup", "table", "tbody", "td", "textarea", "th", "thead", "tr", "u", "ul",
];

/// Counts of target mutations since creation or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub nodes_created: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    pub children_appended: usize,
    pub children_removed: usize,
    pub text_set: usize,
    pub markup_set: usize,
}

impl MutationStats {
    /// Total number of mutations of any kind.
    pub fn total(&self) -> usize {
        self.nodes_created
            + self.attributes_set
            + self.attributes_removed
            + self.listeners_added
            + self.listeners_removed
            + self.children_appended
            + self.children_removed
            + self.text_set
            + self.markup_set
    }
}

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Markup(String),
    Node(NodeHandle),
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: IndexMap<String, String>,
    listeners: SmallVec<[(String, Listener); 2]>,
    content: Vec<Content>,
    parent: Option<NodeHandle>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: IndexMap::new(),
            listeners: SmallVec::new(),
            content: Vec::new(),
            parent: None,
        }
    }
}

#[derive(Debug, Default)]
struct Document {
    nodes: HashMap<NodeHandle, NodeData>,
    next_id: u64,
    stats: MutationStats,
}

impl Document {
    fn node(&self, handle: NodeHandle) -> Result<&NodeData, TargetError> {
        self.nodes.get(&handle).ok_or(TargetError::UnknownNode(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut NodeData, TargetError> {
        self.nodes
            .get_mut(&handle)
            .ok_or(TargetError::UnknownNode(handle))
    }

    fn insert(&mut self, tag: &str) -> NodeHandle {
        let handle = NodeHandle::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(handle, NodeData::new(tag));
        handle
    }

    fn detach(&mut self, child: NodeHandle) -> Result<(), TargetError> {
        let parent = self.node(child)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?
                .content
                .retain(|content| !matches!(content, Content::Node(node) if *node == child));
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Replace the content of `node`, discarding element children.
    fn replace_content(
        &mut self,
        node: NodeHandle,
        content: Vec<Content>,
        discarded: &mut Vec<NodeData>,
    ) -> Result<(), TargetError> {
        let previous = std::mem::replace(&mut self.node_mut(node)?.content, content);
        for old in previous {
            if let Content::Node(child) = old {
                self.discard(child, discarded);
            }
        }
        Ok(())
    }

    /// Remove `node` and its subtree from the arena.
    fn discard(&mut self, node: NodeHandle, discarded: &mut Vec<NodeData>) {
        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            if let Some(data) = self.nodes.remove(&next) {
                stack.extend(data.content.iter().filter_map(|content| match content {
                    Content::Node(child) => Some(*child),
                    _ => None,
                }));
                discarded.push(data);
            }
        }
    }

    fn element_children(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|data| data.content.iter())
            .filter_map(|content| match content {
                Content::Node(child) => Some(*child),
                _ => None,
            })
    }

    /// Depth-first, document order.
    fn find(&self, from: NodeHandle, matches: &dyn Fn(&NodeData) -> bool) -> Option<NodeHandle> {
        let data = self.nodes.get(&from)?;
        if matches(data) {
            return Some(from);
        }
        self.element_children(from)
            .find_map(|child| self.find(child, matches))
    }

    fn write_html(&self, node: NodeHandle, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
        }
        out.push('>');
        for content in &data.content {
            match content {
                Content::Text(text) => out.push_str(&escape(text, false)),
                Content::Markup(markup) => out.push_str(markup),
                Content::Node(child) => self.write_html(*child, out),
            }
        }
        let _ = write!(out, "</{}>", data.tag);
    }

    fn write_text(&self, node: NodeHandle, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        for content in &data.content {
            match content {
                Content::Text(text) | Content::Markup(text) => out.push_str(text),
                Content::Node(child) => self.write_text(*child, out),
            }
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Shared handle to an in-memory document.
///
/// Clones refer to the same document. A fresh document holds a single
/// `body` node, see [`MemoryTarget::body`].
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    doc: Rc<RefCell<Document>>,
    body: NodeHandle,
}

impl Default for MemoryTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTarget {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut doc = Document::default();
        let body = doc.insert("body");
        Self {
            doc: Rc::new(RefCell::new(doc)),
            body,
        }
    }

    /// Get the document root.
    pub fn body(&self) -> NodeHandle {
        self.body
    }

    /// Create a `<tag id="id">` node and append it to the body.
    pub fn create_root(&self, tag: &str, id: &str) -> Result<NodeHandle, TargetError> {
        let node = self.create_node(tag)?;
        self.set_attribute(node, "id", id)?;
        self.append_child(self.body, node)?;
        Ok(node)
    }

    /// Invoke every listener attached to `node` for `event_type`, in
    /// attachment order. Returns how many ran.
    ///
    /// Listeners run with no internal borrow held, so they may write
    /// reactive state and trigger a synchronous re-render of this document.
    pub fn dispatch(&self, node: NodeHandle, event_type: &str) -> Result<usize, TargetError> {
        let listeners: SmallVec<[Listener; 2]> = self
            .doc
            .borrow()
            .node(node)?
            .listeners
            .iter()
            .filter(|(event, _)| event == event_type)
            .map(|(_, listener)| listener.clone())
            .collect();
        trace!(node = node.raw(), event_type, count = listeners.len(), "dispatching");
        for listener in &listeners {
            listener.call();
        }
        Ok(listeners.len())
    }

    pub fn tag(&self, node: NodeHandle) -> Option<String> {
        self.doc.borrow().nodes.get(&node).map(|data| data.tag.clone())
    }

    pub fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.doc
            .borrow()
            .nodes
            .get(&node)
            .and_then(|data| data.attributes.get(name).cloned())
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text(&self, node: NodeHandle) -> String {
        let mut out = String::new();
        self.doc.borrow().write_text(node, &mut out);
        out
    }

    /// Element children of `node`, in order.
    pub fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.doc.borrow().element_children(node).collect()
    }

    pub fn parent_of(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.doc.borrow().nodes.get(&node).and_then(|data| data.parent)
    }

    pub fn listener_count(&self, node: NodeHandle, event_type: &str) -> usize {
        self.listener_ids(node, event_type).len()
    }

    /// Identities of the listeners attached to `node` for `event_type`.
    pub fn listener_ids(&self, node: NodeHandle, event_type: &str) -> Vec<ListenerId> {
        self.doc
            .borrow()
            .nodes
            .get(&node)
            .map(|data| {
                data.listeners
                    .iter()
                    .filter(|(event, _)| event == event_type)
                    .map(|(_, listener)| listener.id().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of nodes in the arena, attached or not, including the body.
    pub fn node_count(&self) -> usize {
        self.doc.borrow().nodes.len()
    }

    /// Number of nodes reachable from `node`, including `node` itself.
    pub fn subtree_size(&self, node: NodeHandle) -> usize {
        let doc = self.doc.borrow();
        let mut stack = vec![node];
        let mut count = 0;
        while let Some(next) = stack.pop() {
            if doc.nodes.contains_key(&next) {
                count += 1;
                stack.extend(doc.element_children(next));
            }
        }
        count
    }

    /// Serialize `node` and its subtree as HTML.
    pub fn to_html(&self, node: NodeHandle) -> String {
        let mut out = String::new();
        self.doc.borrow().write_html(node, &mut out);
        out
    }

    pub fn stats(&self) -> MutationStats {
        self.doc.borrow().stats
    }

    pub fn reset_stats(&self) {
        self.doc.borrow_mut().stats = MutationStats::default();
    }
}

impl RenderTarget for MemoryTarget {
    fn create_node(&self, tag: &str) -> Result<NodeHandle, TargetError> {
        let normalized = tag.to_ascii_lowercase();
        if !KNOWN_TAGS.contains(&normalized.as_str()) {
            return Err(TargetError::UnknownTag(tag.to_owned()));
        }
        let mut doc = self.doc.borrow_mut();
        doc.stats.nodes_created += 1;
        Ok(doc.insert(&normalized))
    }

    fn set_attribute(&self, node: NodeHandle, name: &str, value: &str) -> Result<(), TargetError> {
        let mut doc = self.doc.borrow_mut();
        doc.node_mut(node)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        doc.stats.attributes_set += 1;
        Ok(())
    }

    fn remove_attribute(&self, node: NodeHandle, name: &str) -> Result<(), TargetError> {
        let mut doc = self.doc.borrow_mut();
        doc.node_mut(node)?.attributes.shift_remove(name);
        doc.stats.attributes_removed += 1;
        Ok(())
    }

    fn add_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        let mut doc = self.doc.borrow_mut();
        doc.node_mut(node)?
            .listeners
            .push((event_type.to_owned(), listener.clone()));
        doc.stats.listeners_added += 1;
        Ok(())
    }

    fn remove_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        let mut doc = self.doc.borrow_mut();
        doc.node_mut(node)?
            .listeners
            .retain(|(event, attached)| !(event == event_type && attached.id() == listener.id()));
        doc.stats.listeners_removed += 1;
        Ok(())
    }

    fn append_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError> {
        let mut doc = self.doc.borrow_mut();
        doc.node(parent)?;
        doc.detach(child)?;
        doc.node_mut(parent)?.content.push(Content::Node(child));
        doc.node_mut(child)?.parent = Some(parent);
        doc.stats.children_appended += 1;
        Ok(())
    }

    fn remove_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError> {
        let mut discarded = Vec::new();
        let mut doc = self.doc.borrow_mut();
        if doc.node(child)?.parent != Some(parent) {
            return Err(TargetError::NotAChild { parent, child });
        }
        doc.detach(child)?;
        doc.discard(child, &mut discarded);
        doc.stats.children_removed += 1;
        Ok(())
    }

    fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, TargetError> {
        Ok(self.doc.borrow().node(node)?.parent)
    }

    fn set_text_content(&self, node: NodeHandle, text: &str) -> Result<(), TargetError> {
        // Declared first so discarded listeners drop after the borrow ends.
        let mut discarded = Vec::new();
        let mut doc = self.doc.borrow_mut();
        doc.replace_content(node, vec![Content::Text(text.to_owned())], &mut discarded)?;
        doc.stats.text_set += 1;
        Ok(())
    }

    fn set_markup_content(&self, node: NodeHandle, markup: &str) -> Result<(), TargetError> {
        let mut discarded = Vec::new();
        let mut doc = self.doc.borrow_mut();
        let content = if markup.is_empty() {
            Vec::new()
        } else {
            // Markup is kept verbatim rather than parsed into nodes.
            vec![Content::Markup(markup.to_owned())]
        };
        doc.replace_content(node, content, &mut discarded)?;
        doc.stats.markup_set += 1;
        Ok(())
    }

    fn resolve_container(&self, container: &Container) -> Result<NodeHandle, TargetError> {
        let doc = self.doc.borrow();
        match container {
            Container::Node(node) => {
                doc.node(*node)?;
                Ok(*node)
            }
            Container::Selector(selector) => {
                let found = if let Some(id) = selector.strip_prefix('#') {
                    doc.find(self.body, &|data| {
                        data.attributes.get("id").map(String::as_str) == Some(id)
                    })
                } else if let Some(class) = selector.strip_prefix('.') {
                    doc.find(self.body, &|data| {
                        data.attributes
                            .get("class")
                            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
                    })
                } else {
                    doc.find(self.body, &|data| data.tag.eq_ignore_ascii_case(selector))
                };
                found.ok_or_else(|| TargetError::ContainerNotFound(selector.clone()))
            }
        }
    }
}
