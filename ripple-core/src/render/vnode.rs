//! Render tree nodes and the [`h`] builder.
//!
//! A [`VNode`] describes one node to be realized on a render target: its
//! tag, its props (string attributes and event listeners), and its children
//! (a text run or a list of nodes). Building a tree never touches the
//! target. The only mutable part of a node is its [`el`](VNode::el) slot,
//! filled in by the renderer when the node is mounted or patched.

use indexmap::IndexMap;

use super::listener::Listener;
use super::target::NodeHandle;

/// Value of a single prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    /// Set as a string attribute.
    Attr(String),
    /// Attached as an event listener.
    Listener(Listener),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Attr(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Attr(value)
    }
}

impl From<Listener> for PropValue {
    fn from(listener: Listener) -> Self {
        Self::Listener(listener)
    }
}

/// Ordered prop map.
///
/// Props are applied in insertion order, so mounting the same tree twice
/// issues the same sequence of target calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props(IndexMap<String, PropValue>);

impl Props {
    /// Create an empty prop map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a prop.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add an event listener under `key`, e.g. `on("onClick", ...)`.
    pub fn on<F>(self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.with(key, Listener::new(handler))
    }

    /// Add or replace a prop in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Children of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Text content.
    Text(String),
    /// Child nodes, in order.
    Nodes(Vec<VNode>),
}

/// A render tree node.
#[derive(Debug, Clone)]
pub struct VNode {
    tag: String,
    props: Option<Props>,
    children: Option<Children>,
    pub(crate) el: Option<NodeHandle>,
}

impl VNode {
    /// Create a node with no props and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: None,
            children: None,
            el: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn props(&self) -> Option<&Props> {
        self.props.as_ref()
    }

    pub fn children(&self) -> Option<&Children> {
        self.children.as_ref()
    }

    /// Get the child nodes, if the children are a node list.
    pub fn child_nodes(&self) -> &[VNode] {
        match &self.children {
            Some(Children::Nodes(nodes)) => nodes,
            _ => &[],
        }
    }

    /// Get the target node this node is realized as, once mounted.
    pub fn el(&self) -> Option<NodeHandle> {
        self.el
    }

    /// Count this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.child_nodes().iter().map(VNode::node_count).sum::<usize>()
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        self.children.as_mut()
    }
}

/// Structural equality. The `el` slot is ignored.
impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.props == other.props && self.children == other.children
    }
}

impl Eq for VNode {}

/// Conversion into an optional prop map, for [`h`].
///
/// `()` means "no props".
pub trait IntoProps {
    fn into_props(self) -> Option<Props>;
}

impl IntoProps for () {
    fn into_props(self) -> Option<Props> {
        None
    }
}

impl IntoProps for Props {
    fn into_props(self) -> Option<Props> {
        Some(self)
    }
}

impl IntoProps for Option<Props> {
    fn into_props(self) -> Option<Props> {
        self
    }
}

impl<K, V, const N: usize> IntoProps for [(K, V); N]
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn into_props(self) -> Option<Props> {
        Some(self.into_iter().collect())
    }
}

/// Conversion into optional children, for [`h`].
///
/// `()` means "no children". Strings become text; vectors and arrays of
/// nodes become child lists.
pub trait IntoChildren {
    fn into_children(self) -> Option<Children>;
}

impl IntoChildren for () {
    fn into_children(self) -> Option<Children> {
        None
    }
}

impl IntoChildren for &str {
    fn into_children(self) -> Option<Children> {
        Some(Children::Text(self.to_owned()))
    }
}

impl IntoChildren for String {
    fn into_children(self) -> Option<Children> {
        Some(Children::Text(self))
    }
}

impl IntoChildren for Vec<VNode> {
    fn into_children(self) -> Option<Children> {
        Some(Children::Nodes(self))
    }
}

impl<const N: usize> IntoChildren for [VNode; N] {
    fn into_children(self) -> Option<Children> {
        Some(Children::Nodes(self.into()))
    }
}

impl IntoChildren for Children {
    fn into_children(self) -> Option<Children> {
        Some(self)
    }
}

impl IntoChildren for Option<Children> {
    fn into_children(self) -> Option<Children> {
        self
    }
}

/// Build a render tree node.
///
/// Pure: no target access and no validation beyond the argument types.
///
/// # Example
///
/// ```rust
/// use ripple_core::render::{h, Props};
///
/// let tree = h(
///     "div",
///     Props::new().with("class", "container"),
///     [h("h2", (), "count: 0"), h("button", Props::new().on("onClick", || {}), "+1")],
/// );
///
/// assert_eq!(tree.tag(), "div");
/// assert_eq!(tree.node_count(), 3);
/// assert!(tree.el().is_none());
/// ```
pub fn h(tag: impl Into<String>, props: impl IntoProps, children: impl IntoChildren) -> VNode {
    VNode {
        tag: tag.into(),
        props: props.into_props(),
        children: children.into_children(),
        el: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(listener: &Listener) -> VNode {
        h(
            "div",
            Props::new()
                .with("class", "container")
                .with("onClick", listener.clone()),
            vec![h("span", (), "a"), h("span", [("id", "b")], ())],
        )
    }

    #[test]
    fn builder_is_deterministic() {
        let listener = Listener::new(|| {});
        assert_eq!(sample(&listener), sample(&listener));
    }

    #[test]
    fn fresh_listeners_make_trees_differ() {
        assert_ne!(sample(&Listener::new(|| {})), sample(&Listener::new(|| {})));
    }

    #[test]
    fn fresh_nodes_are_unmounted() {
        let tree = sample(&Listener::new(|| {}));
        assert!(tree.el().is_none());
        assert!(tree.child_nodes().iter().all(|child| child.el().is_none()));
    }

    #[test]
    fn absent_props_and_children() {
        let node = h("br", (), ());
        assert!(node.props().is_none());
        assert!(node.children().is_none());
        assert_eq!(node.node_count(), 1);
    }

    #[test]
    fn text_and_node_children() {
        assert_eq!(
            h("p", (), "hello").children(),
            Some(&Children::Text("hello".into()))
        );
        assert_eq!(h("ul", (), vec![h("li", (), ())]).child_nodes().len(), 1);
    }

    #[test]
    fn props_keep_insertion_order() {
        let props = Props::new().with("b", "2").with("a", "1").with("c", "3");
        let keys: Vec<_> = props.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn el_is_ignored_by_equality() {
        let mut mounted = h("div", (), "x");
        mounted.el = Some(NodeHandle::new(9));
        assert_eq!(mounted, h("div", (), "x"));
    }
}
