//! In-memory document used by the unit tests.
//!
//! Mirrors the parts of DOM behaviour the engine depends on: rendering into a
//! root replaces the container's children, and subscriptions fire
//! synchronously for child-list changes of the observed node only.

use std::cell::RefCell;
use std::rc::Rc;

use crate::platform::{ChangeCallback, EmbedHost, PlatformError};
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    height: Option<String>,
    text: String,
    inner_html: Option<String>,
}

#[derive(Debug)]
pub struct MemoryRoot {
    id: usize,
    container: NodeId,
}

#[derive(Debug)]
struct RootRecord {
    id: usize,
    container: NodeId,
    widget: Option<Widget>,
}

#[derive(Debug)]
pub struct MemorySubscription(usize);

#[derive(Default)]
struct Document {
    nodes: Vec<Node>,
    roots: Vec<RootRecord>,
    styles: Vec<(String, String)>,
    observers: Vec<(usize, NodeId, Rc<dyn Fn()>)>,
    next_id: usize,
}

impl Document {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn fresh_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn callbacks_for(&self, node: NodeId) -> Vec<Rc<dyn Fn()>> {
        self.observers
            .iter()
            .filter(|(_, target, _)| *target == node)
            .map(|(_, _, callback)| callback.clone())
            .collect()
    }

    fn collect_anchors(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(id).children {
            if self.node(child).tag == "a" {
                out.push(child);
            }
            self.collect_anchors(child, out);
        }
    }

    fn text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.text);
        for &child in &node.children {
            self.text(child, out);
        }
    }
}

/// A shared in-memory document. Node 0 is the body.
#[derive(Clone)]
pub struct MemoryHost {
    doc: Rc<RefCell<Document>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        let mut doc = Document::default();
        doc.push("body");
        Self {
            doc: Rc::new(RefCell::new(doc)),
        }
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Run observers of `node` after a child-list change, outside the borrow.
    fn child_list_changed(&self, node: NodeId) {
        let callbacks = self.doc.borrow().callbacks_for(node);
        for callback in callbacks {
            callback();
        }
    }

    /// Create an element with no parent.
    pub fn create(&self, tag: &str) -> NodeId {
        self.doc.borrow_mut().push(tag)
    }

    /// Append `child` to `parent`, moving it if it already has a parent.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        let old_parent = {
            let mut doc = self.doc.borrow_mut();
            let old = doc.node(child).parent;
            if let Some(old) = old {
                doc.node_mut(old).children.retain(|c| *c != child);
            }
            doc.node_mut(child).parent = Some(parent);
            doc.node_mut(parent).children.push(child);
            old
        };
        if let Some(old) = old_parent {
            self.child_list_changed(old);
        }
        self.child_list_changed(parent);
    }

    pub fn element(&self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create(tag);
        self.append(parent, id);
        id
    }

    pub fn anchor(&self, parent: NodeId, href: &str, title: Option<&str>, label: &str) -> NodeId {
        let id = self.create("a");
        {
            let mut doc = self.doc.borrow_mut();
            let node = doc.node_mut(id);
            node.attributes.push(("href".to_string(), href.to_string()));
            if let Some(title) = title {
                node.attributes.push(("title".to_string(), title.to_string()));
            }
            node.text = label.to_string();
        }
        self.append(parent, id);
        id
    }

    /// A marked anchor that was never attached to anything.
    pub fn detached_anchor(&self, href: &str, label: &str) -> NodeId {
        let id = self.create("a");
        let mut doc = self.doc.borrow_mut();
        let node = doc.node_mut(id);
        node.attributes.push(("href".to_string(), href.to_string()));
        node.attributes.push(("title".to_string(), "@embed".to_string()));
        node.text = label.to_string();
        id
    }

    /// Detach `node` from its parent.
    pub fn remove(&self, node: NodeId) {
        let parent = {
            let mut doc = self.doc.borrow_mut();
            let parent = doc.node_mut(node).parent.take();
            if let Some(parent) = parent {
                doc.node_mut(parent).children.retain(|c| *c != node);
            }
            parent
        };
        if let Some(parent) = parent {
            self.child_list_changed(parent);
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc.borrow().node(node).children.clone()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.doc.borrow().node(node).classes.iter().any(|c| c == class)
    }

    pub fn height(&self, node: NodeId) -> Option<String> {
        self.doc.borrow().node(node).height.clone()
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.doc.borrow().node(node).inner_html.clone()
    }

    /// Widgets rendered into live roots, in mount order.
    pub fn widgets(&self) -> Vec<(NodeId, Widget)> {
        self.doc
            .borrow()
            .roots
            .iter()
            .filter_map(|r| r.widget.clone().map(|w| (r.container, w)))
            .collect()
    }

    pub fn live_roots(&self) -> usize {
        self.doc.borrow().roots.len()
    }

    pub fn style_count(&self, id: &str) -> usize {
        self.doc.borrow().styles.iter().filter(|(s, _)| s == id).count()
    }

    pub fn style_css(&self, id: &str) -> Option<String> {
        self.doc
            .borrow()
            .styles
            .iter()
            .find(|(s, _)| s == id)
            .map(|(_, css)| css.clone())
    }

    pub fn observer_count(&self) -> usize {
        self.doc.borrow().observers.len()
    }
}

impl EmbedHost for MemoryHost {
    type Element = NodeId;
    type Root = MemoryRoot;
    type Subscription = MemorySubscription;

    fn anchors(&self, region: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.doc.borrow().collect_anchors(*region, &mut out);
        out
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.doc
            .borrow()
            .node(*element)
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), PlatformError> {
        let mut doc = self.doc.borrow_mut();
        let attributes = &mut doc.node_mut(*element).attributes;
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn text_content(&self, element: &NodeId) -> String {
        let mut out = String::new();
        self.doc.borrow().text(*element, &mut out);
        out
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().node(*element).parent
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        let doc = self.doc.borrow();
        let mut current = *element;
        loop {
            if current == NodeId(0) {
                return true;
            }
            match doc.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<(), PlatformError> {
        let mut doc = self.doc.borrow_mut();
        let classes = &mut doc.node_mut(*element).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn set_height(&self, element: &NodeId, height: &str) -> Result<(), PlatformError> {
        self.doc.borrow_mut().node_mut(*element).height = Some(height.to_string());
        Ok(())
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) -> Result<(), PlatformError> {
        {
            let mut doc = self.doc.borrow_mut();
            let children = std::mem::take(&mut doc.node_mut(*element).children);
            for child in children {
                doc.node_mut(child).parent = None;
            }
            let node = doc.node_mut(*element);
            node.text.clear();
            node.inner_html = Some(html.to_string());
        }
        self.child_list_changed(*element);
        Ok(())
    }

    fn create_root(&self, container: &NodeId) -> Result<MemoryRoot, PlatformError> {
        let mut doc = self.doc.borrow_mut();
        let id = doc.fresh_id();
        doc.roots.push(RootRecord {
            id,
            container: *container,
            widget: None,
        });
        Ok(MemoryRoot {
            id,
            container: *container,
        })
    }

    fn render(&self, root: &mut MemoryRoot, widget: Widget) -> Result<(), PlatformError> {
        {
            let mut doc = self.doc.borrow_mut();
            let record = doc
                .roots
                .iter_mut()
                .find(|r| r.id == root.id)
                .ok_or_else(|| PlatformError::from("render into an unmounted root"))?;
            record.widget = Some(widget);
            let children = std::mem::take(&mut doc.node_mut(root.container).children);
            for child in children {
                doc.node_mut(child).parent = None;
            }
        }
        self.child_list_changed(root.container);
        Ok(())
    }

    fn unmount(&self, root: MemoryRoot) {
        self.doc.borrow_mut().roots.retain(|r| r.id != root.id);
    }

    fn has_style(&self, id: &str) -> bool {
        self.style_count(id) > 0
    }

    fn insert_style(&self, id: &str, css: &str) -> Result<(), PlatformError> {
        self.doc
            .borrow_mut()
            .styles
            .push((id.to_string(), css.to_string()));
        Ok(())
    }

    fn remove_style(&self, id: &str) {
        self.doc.borrow_mut().styles.retain(|(s, _)| s != id);
    }

    fn observe(
        &self,
        region: &NodeId,
        on_change: ChangeCallback,
    ) -> Result<MemorySubscription, PlatformError> {
        let mut doc = self.doc.borrow_mut();
        let id = doc.fresh_id();
        doc.observers.push((id, *region, Rc::from(on_change)));
        Ok(MemorySubscription(id))
    }

    fn disconnect(&self, subscription: MemorySubscription) {
        self.doc
            .borrow_mut()
            .observers
            .retain(|(id, _, _)| *id != subscription.0);
    }
}
