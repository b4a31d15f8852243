//! Mount and Patch Engines
//!
//! The [`Renderer`] owns a render target, the listener ledger, and the
//! configuration, and projects render trees onto the target.
//!
//! # Mount
//!
//! [`Renderer::mount`] creates a target node for every tree node, applies
//! props, mounts children depth-first, and only then appends the finished
//! subtree to its container.
//!
//! # Patch
//!
//! [`Renderer::patch`] compares a mounted tree with a freshly built one that
//! occupies the same position:
//!
//! 1. Different tags: the new subtree is mounted as the last child of the
//!    old node's parent and the old subtree is removed. Nothing below the
//!    old node is reused.
//! 2. Same tag: the target node is reused, props are diffed key by key, and
//!    children are diffed. Text children are compared as strings; child
//!    lists are handed to the [`ListStrategy`].

use std::marker::PhantomData;

use tracing::{debug, trace};

use super::ledger::ListenerLedger;
use super::listener::{event_type, Listener};
use super::strategy::{ListStrategy, Positional};
use super::target::{Container, NodeHandle, RenderTarget};
use super::vnode::{Children, PropValue, Props, VNode};
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};

/// Projects render trees onto a [`RenderTarget`].
pub struct Renderer<T, S = Positional> {
    target: T,
    ledger: ListenerLedger,
    config: RenderConfig,
    strategy: PhantomData<S>,
}

impl<T: RenderTarget> Renderer<T> {
    /// Create a positional renderer with the default configuration.
    pub fn new(target: T) -> Self {
        Self::with_config(target, RenderConfig::default())
    }

    /// Create a positional renderer.
    pub fn with_config(target: T, config: RenderConfig) -> Self {
        Renderer::with_strategy(target, config)
    }
}

impl<T: RenderTarget, S: ListStrategy> Renderer<T, S> {
    /// Create a renderer with a custom child list strategy.
    pub fn with_strategy(target: T, config: RenderConfig) -> Self {
        Self {
            target,
            ledger: ListenerLedger::new(config.ledger),
            config,
            strategy: PhantomData,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn ledger(&self) -> &ListenerLedger {
        &self.ledger
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Resolve an application container through the target.
    pub fn resolve_container(&self, container: &Container) -> Result<NodeHandle> {
        Ok(self.target.resolve_container(container)?)
    }

    /// Realize `vnode` and its subtree, appending it as the last child of
    /// `container`.
    ///
    /// # Errors
    ///
    /// Fails when the target rejects a node, typically an unknown tag. The
    /// nodes created before the failure stay detached.
    pub fn mount(&mut self, vnode: &mut VNode, container: NodeHandle) -> Result<()> {
        let el = self.target.create_node(vnode.tag())?;
        vnode.el = Some(el);
        trace!(tag = vnode.tag(), node = el.raw(), "mounting");

        if let Some(props) = vnode.props() {
            for (key, value) in props.iter() {
                self.apply_prop(el, key, value)?;
            }
        }

        match vnode.children_mut() {
            Some(Children::Text(text)) => self.target.set_text_content(el, text)?,
            Some(Children::Nodes(children)) => {
                for child in children.iter_mut() {
                    self.mount(child, el)?;
                }
            }
            None => {}
        }

        self.target.append_child(container, el)?;
        Ok(())
    }

    /// Reconcile `new` against the mounted `old` at the same tree position.
    ///
    /// On success `new` is fully mounted and `old` must be discarded.
    ///
    /// # Errors
    ///
    /// Fails when `old` was never mounted, when a replaced node has no
    /// parent, or when the target rejects an operation.
    pub fn patch(&mut self, old: &VNode, new: &mut VNode) -> Result<()> {
        let el = old.el().ok_or_else(|| RenderError::Unmounted {
            tag: old.tag().to_owned(),
        })?;

        if old.tag() != new.tag() {
            let parent = self
                .target
                .parent(el)?
                .ok_or_else(|| RenderError::Detached {
                    tag: old.tag().to_owned(),
                })?;
            debug!(old = old.tag(), new = new.tag(), "tag changed, replacing subtree");
            // Mount before removing so a failed mount leaves the old subtree in place.
            self.mount(new, parent)?;
            self.target.remove_child(parent, el)?;
            self.forget_subtree(old);
            return Ok(());
        }

        new.el = Some(el);
        self.patch_props(el, old.props(), new.props())?;
        self.patch_children(el, old, new)
    }

    /// Detach the mounted `vnode` from `parent`.
    pub fn remove(&mut self, parent: NodeHandle, vnode: &VNode) -> Result<()> {
        let el = vnode.el().ok_or_else(|| RenderError::Unmounted {
            tag: vnode.tag().to_owned(),
        })?;
        self.target.remove_child(parent, el)?;
        self.forget_subtree(vnode);
        Ok(())
    }

    /// Empty `container` and forget every listener this renderer attached.
    ///
    /// Used to start over when the target no longer matches any tree the
    /// caller holds.
    pub fn clear(&mut self, container: NodeHandle) -> Result<()> {
        self.target.set_markup_content(container, "")?;
        self.ledger = ListenerLedger::new(self.config.ledger);
        Ok(())
    }

    fn patch_props(&mut self, el: NodeHandle, old: Option<&Props>, new: Option<&Props>) -> Result<()> {
        let empty = Props::new();
        let old = old.unwrap_or(&empty);
        let new = new.unwrap_or(&empty);

        for (key, value) in new.iter() {
            match old.get(key) {
                Some(prev) if prev == value => {}
                Some(prev) => self.replace_prop(el, key, prev, value)?,
                None => self.apply_prop(el, key, value)?,
            }
        }

        for (key, prev) in old.iter() {
            if !new.contains_key(key) {
                self.remove_prop(el, key, prev)?;
            }
        }

        Ok(())
    }

    fn patch_children(&mut self, el: NodeHandle, old: &VNode, new: &mut VNode) -> Result<()> {
        match new.children_mut() {
            Some(Children::Text(text)) => match old.children() {
                Some(Children::Text(prev)) if prev.as_str() == text.as_str() => {}
                prev => {
                    // Text replaces any previous child list wholesale.
                    if let Some(Children::Nodes(nodes)) = prev {
                        for node in nodes {
                            self.forget_subtree(node);
                        }
                    }
                    trace!(node = el.raw(), "setting text");
                    self.target.set_text_content(el, text)?;
                }
            },
            children => {
                let new_nodes: &mut [VNode] = match children {
                    Some(Children::Nodes(nodes)) => nodes,
                    _ => &mut [],
                };
                match old.children() {
                    Some(Children::Text(_)) => {
                        self.target.set_markup_content(el, "")?;
                        for child in new_nodes.iter_mut() {
                            self.mount(child, el)?;
                        }
                    }
                    old_children => {
                        let old_nodes: &[VNode] = match old_children {
                            Some(Children::Nodes(nodes)) => nodes,
                            _ => &[],
                        };
                        S::reconcile(self, el, old_nodes, new_nodes)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_prop(&mut self, el: NodeHandle, key: &str, value: &PropValue) -> Result<()> {
        match value {
            PropValue::Attr(value) => self.target.set_attribute(el, key, value)?,
            PropValue::Listener(listener) => {
                let event = event_type(key, &self.config.event_prefix);
                self.attach(el, &event, listener)?;
            }
        }
        Ok(())
    }

    fn remove_prop(&mut self, el: NodeHandle, key: &str, value: &PropValue) -> Result<()> {
        match value {
            PropValue::Attr(_) => self.target.remove_attribute(el, key)?,
            PropValue::Listener(listener) => {
                let event = event_type(key, &self.config.event_prefix);
                self.detach(el, &event, listener)?;
            }
        }
        Ok(())
    }

    fn replace_prop(
        &mut self,
        el: NodeHandle,
        key: &str,
        prev: &PropValue,
        next: &PropValue,
    ) -> Result<()> {
        match (prev, next) {
            (PropValue::Attr(_), PropValue::Attr(value)) => {
                self.target.set_attribute(el, key, value)?;
            }
            (PropValue::Listener(prev), PropValue::Listener(next)) => {
                let event = event_type(key, &self.config.event_prefix);
                self.detach(el, &event, prev)?;
                if self.ledger.contains(el, &event, next.id()) {
                    debug!(listener = %next.id(), event = %event, "listener already attached");
                } else {
                    self.attach(el, &event, next)?;
                }
            }
            (prev, next) => {
                self.remove_prop(el, key, prev)?;
                self.apply_prop(el, key, next)?;
            }
        }
        Ok(())
    }

    fn attach(&mut self, el: NodeHandle, event: &str, listener: &Listener) -> Result<()> {
        trace!(listener = %listener.id(), event, node = el.raw(), "attaching listener");
        self.target.add_event_listener(el, event, listener)?;
        self.ledger.record(el, event, listener.id());
        Ok(())
    }

    fn detach(&mut self, el: NodeHandle, event: &str, listener: &Listener) -> Result<()> {
        trace!(listener = %listener.id(), event, node = el.raw(), "detaching listener");
        self.target.remove_event_listener(el, event, listener)?;
        self.ledger.forget(el, event, listener.id());
        Ok(())
    }

    fn forget_subtree(&mut self, vnode: &VNode) {
        let mut nodes = Vec::with_capacity(vnode.node_count());
        collect_els(vnode, &mut nodes);
        self.ledger.forget_nodes(nodes);
    }
}

fn collect_els(vnode: &VNode, out: &mut Vec<NodeHandle>) {
    out.extend(vnode.el());
    for child in vnode.child_nodes() {
        collect_els(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TargetError;
    use crate::render::{h, MemoryTarget};

    fn setup() -> (MemoryTarget, Renderer<MemoryTarget>, NodeHandle) {
        let doc = MemoryTarget::new();
        let root = doc.body();
        (doc.clone(), Renderer::new(doc), root)
    }

    #[test]
    fn mount_sets_el_and_structure() {
        let (doc, mut renderer, root) = setup();
        let mut tree = h(
            "div",
            [("class", "box")],
            vec![h("span", (), "a"), h("span", (), "b")],
        );

        renderer.mount(&mut tree, root).unwrap();

        let el = tree.el().unwrap();
        assert_eq!(doc.children(root), vec![el]);
        assert_eq!(doc.attribute(el, "class").as_deref(), Some("box"));
        assert_eq!(doc.to_html(el), r#"<div class="box"><span>a</span><span>b</span></div>"#);
        for child in tree.child_nodes() {
            assert_eq!(doc.parent_of(child.el().unwrap()), Some(el));
        }
    }

    #[test]
    fn mount_unknown_tag_fails() {
        let (_doc, mut renderer, root) = setup();
        let mut tree = h("div", (), vec![h("blink-tag", (), ())]);

        let err = renderer.mount(&mut tree, root).unwrap_err();
        assert_eq!(err, RenderError::Target(TargetError::UnknownTag("blink-tag".into())));
    }

    #[test]
    fn mount_records_listeners() {
        let (doc, mut renderer, root) = setup();
        let listener = Listener::new(|| {});
        let mut tree = h("button", [("onClick", listener.clone())], "+1");

        renderer.mount(&mut tree, root).unwrap();

        let el = tree.el().unwrap();
        assert_eq!(doc.listener_count(el, "click"), 1);
        assert!(renderer.ledger().contains(el, "click", listener.id()));
    }

    #[test]
    fn patch_unmounted_old_fails() {
        let (_doc, mut renderer, _root) = setup();
        let old = h("div", (), ());
        let mut new = h("div", (), ());

        assert_eq!(
            renderer.patch(&old, &mut new),
            Err(RenderError::Unmounted { tag: "div".into() })
        );
    }

    #[test]
    fn patch_updates_attributes() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("div", [("class", "a"), ("id", "x")], ());
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("div", [("class", "b"), ("title", "t")], ());
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert_eq!(old.el(), Some(el));
        assert_eq!(doc.attribute(el, "class").as_deref(), Some("b"));
        assert_eq!(doc.attribute(el, "title").as_deref(), Some("t"));
        assert_eq!(doc.attribute(el, "id"), None);
    }

    #[test]
    fn patch_replaces_listener() {
        let (doc, mut renderer, root) = setup();
        let first = Listener::new(|| {});
        let second = Listener::new(|| {});

        let mut old = h("button", [("onClick", first.clone())], ());
        renderer.mount(&mut old, root).unwrap();
        let mut new = h("button", [("onClick", second.clone())], ());
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert_eq!(doc.listener_ids(el, "click"), vec![second.id().clone()]);
        assert!(!renderer.ledger().contains(el, "click", first.id()));
        assert!(renderer.ledger().contains(el, "click", second.id()));
    }

    #[test]
    fn patch_keeps_keyed_listener() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("button", [("onClick", Listener::keyed("inc", || {}))], ());
        renderer.mount(&mut old, root).unwrap();
        let el = old.el().unwrap();
        doc.reset_stats();

        let mut new = h("button", [("onClick", Listener::keyed("inc", || {}))], ());
        renderer.patch(&old, &mut new).unwrap();

        assert_eq!(doc.listener_count(el, "click"), 1);
        assert_eq!(doc.stats().listeners_added, 0);
        assert_eq!(doc.stats().listeners_removed, 0);
    }

    #[test]
    fn patch_skips_listener_already_attached() {
        let (doc, mut renderer, root) = setup();
        let shared = Listener::new(|| {});

        // Two prop keys that resolve to the same event type
        let mut old = h(
            "button",
            Props::new()
                .with("onClick", shared.clone())
                .with("onclick", Listener::new(|| {})),
            (),
        );
        renderer.mount(&mut old, root).unwrap();
        let el = old.el().unwrap();
        doc.reset_stats();

        let mut new = h(
            "button",
            Props::new()
                .with("onClick", shared.clone())
                .with("onclick", shared.clone()),
            (),
        );
        renderer.patch(&old, &mut new).unwrap();

        // The displaced listener goes, the shared one is not attached twice
        assert_eq!(doc.stats().listeners_added, 0);
        assert_eq!(doc.stats().listeners_removed, 1);
        assert_eq!(doc.listener_ids(el, "click"), vec![shared.id().clone()]);
    }

    #[test]
    fn patch_removes_listener_prop() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("button", [("onClick", Listener::new(|| {}))], ());
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("button", (), ());
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert_eq!(doc.listener_count(el, "click"), 0);
        assert!(renderer.ledger().is_empty());
    }

    #[test]
    fn patch_switches_attribute_to_listener() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("button", [("onClick", "legacy()")], ());
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("button", [("onClick", Listener::new(|| {}))], ());
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert_eq!(doc.attribute(el, "onClick"), None);
        assert_eq!(doc.listener_count(el, "click"), 1);
    }

    #[test]
    fn patch_tag_change_replaces_node() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("div", (), vec![h("p", (), "old")]);
        renderer.mount(&mut old, root).unwrap();
        let parent = old.el().unwrap();
        let old_child = old.child_nodes()[0].el().unwrap();

        let mut new = h("div", (), vec![h("section", (), "new")]);
        renderer.patch(&old, &mut new).unwrap();

        let new_child = new.child_nodes()[0].el().unwrap();
        assert_ne!(old_child, new_child);
        assert_eq!(doc.children(parent), vec![new_child]);
        assert_eq!(doc.parent_of(old_child), None);
        assert_eq!(doc.to_html(parent), "<div><section>new</section></div>");
    }

    #[test]
    fn patch_text_over_text() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("p", (), "same");
        renderer.mount(&mut old, root).unwrap();
        doc.reset_stats();

        let mut same = h("p", (), "same");
        renderer.patch(&old, &mut same).unwrap();
        assert_eq!(doc.stats().text_set, 0);

        let mut changed = h("p", (), "changed");
        renderer.patch(&same, &mut changed).unwrap();
        assert_eq!(doc.stats().text_set, 1);
        assert_eq!(doc.text(changed.el().unwrap()), "changed");
    }

    #[test]
    fn patch_text_over_list() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("ul", (), vec![h("li", (), "a"), h("li", (), "b")]);
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("ul", (), "empty");
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert!(doc.children(el).is_empty());
        assert_eq!(doc.to_html(el), "<ul>empty</ul>");
    }

    #[test]
    fn patch_list_over_text() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("ul", (), "loading");
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("ul", (), vec![h("li", (), "a"), h("li", (), "b")]);
        renderer.patch(&old, &mut new).unwrap();

        let el = new.el().unwrap();
        assert_eq!(doc.to_html(el), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(doc.stats().markup_set, 1);
    }

    #[test]
    fn patch_absent_children_clears_list() {
        let (doc, mut renderer, root) = setup();
        let mut old = h("ul", (), vec![h("li", (), "a")]);
        renderer.mount(&mut old, root).unwrap();

        let mut new = h("ul", (), ());
        renderer.patch(&old, &mut new).unwrap();

        assert_eq!(doc.to_html(new.el().unwrap()), "<ul></ul>");
    }

    #[test]
    fn removed_subtree_leaves_ledger() {
        let (_doc, mut renderer, root) = setup();
        let mut old = h(
            "div",
            (),
            vec![h("button", [("onClick", Listener::new(|| {}))], "x")],
        );
        renderer.mount(&mut old, root).unwrap();
        assert_eq!(renderer.ledger().len(), 1);

        let mut new = h("div", (), ());
        renderer.patch(&old, &mut new).unwrap();
        assert!(renderer.ledger().is_empty());
    }

    #[test]
    fn clear_empties_container_and_ledger() {
        let (doc, mut renderer, root) = setup();
        let mut tree = h("button", [("onClick", Listener::new(|| {}))], "x");
        renderer.mount(&mut tree, root).unwrap();

        renderer.clear(root).unwrap();

        assert!(doc.children(root).is_empty());
        assert!(renderer.ledger().is_empty());
    }

    #[test]
    fn custom_event_prefix() {
        let doc = MemoryTarget::new();
        let root = doc.body();
        let mut renderer =
            Renderer::with_config(doc.clone(), RenderConfig::default().with_event_prefix("@"));

        let mut tree = h("button", [("@Click", Listener::new(|| {}))], ());
        renderer.mount(&mut tree, root).unwrap();

        assert_eq!(doc.listener_count(tree.el().unwrap(), "click"), 1);
    }
}
