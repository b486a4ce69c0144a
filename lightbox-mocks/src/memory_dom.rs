//! In-memory document
//!
//! A small element tree implementing [`Dom`] without a browser. Click events
//! bubble from the target to the root. Image probes are queued and stay pending
//! until resolved with [`MemoryDom::resolve_probe`] or
//! [`MemoryDom::resolve_next`], which lets callers decide completion order.
//!
//! Selectors are limited to a single compound selector: `tag`, `.class`, `#id`
//! and combinations such as `img.thumb`.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use lightbox_common::{ClickHandler, Dom, DomError, ProbeCallback, ProbeOutcome};

/// Handle to a node of a [`MemoryDom`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);
const BODY: NodeId = NodeId(1);

type SharedHandler = Rc<RefCell<ClickHandler<NodeId>>>;

#[derive(Debug)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

struct PendingProbe {
    src: String,
    done: ProbeCallback,
}

struct Document {
    nodes: Vec<Node>,
    listeners: BTreeMap<u64, (NodeId, SharedHandler)>,
    next_listener: u64,
    probes: VecDeque<PendingProbe>,
    reject_probes: bool,
}

impl Document {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn sibling(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let index = siblings.iter().position(|child| *child == id)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    /// Pre-order walk of the descendants of `root`, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, id: NodeId, selector: &SimpleSelector) -> bool {
        let node = self.node(id);
        if let Some(tag) = &selector.tag {
            if node.tag != *tag {
                return false;
            }
        }
        if let Some(wanted) = &selector.id {
            if node.attributes.get("id") != Some(wanted) {
                return false;
            }
        }
        selector
            .classes
            .iter()
            .all(|class| node.classes.contains(class))
    }
}

#[derive(Debug, Default, PartialEq)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(selector: &str) -> Result<Self, DomError> {
        let unsupported = || DomError::Operation(format!("unsupported selector: {selector:?}"));
        let is_marker = |c: char| c == '.' || c == '#';

        let trimmed = selector.trim();
        if trimmed.is_empty()
            || trimmed.contains(|c: char| c.is_whitespace() || ">+~[]:,*()".contains(c))
        {
            return Err(unsupported());
        }

        let mut parsed = SimpleSelector::default();
        let tag_end = trimmed.find(is_marker).unwrap_or(trimmed.len());
        if tag_end > 0 {
            parsed.tag = Some(trimmed[..tag_end].to_ascii_uppercase());
        }

        let mut rest = &trimmed[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[marker.len_utf8()..];
            let end = body.find(is_marker).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(unsupported());
            }
            if marker == '.' {
                parsed.classes.push(name.to_string());
            } else {
                parsed.id = Some(name.to_string());
            }
            rest = &body[end..];
        }

        Ok(parsed)
    }
}

/// In-memory [`Dom`] with an `html` root and a `body`
#[derive(Clone)]
pub struct MemoryDom {
    doc: Rc<RefCell<Document>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut root = Node::new("html");
        let mut body = Node::new("body");
        root.children.push(BODY);
        body.parent = Some(ROOT);
        Self {
            doc: Rc::new(RefCell::new(Document {
                nodes: vec![root, body],
                listeners: BTreeMap::new(),
                next_listener: 0,
                probes: VecDeque::new(),
                reject_probes: false,
            })),
        }
    }

    /// Dispatch a click on `target`, bubbling up through its ancestors.
    pub fn click(&self, target: &NodeId) {
        let target = *target;
        let path: Vec<(u64, SharedHandler)> = {
            let doc = self.doc.borrow();
            let mut chain = Vec::new();
            let mut node = Some(target);
            while let Some(id) = node {
                chain.push(id);
                node = doc.node(id).parent;
            }

            let mut handlers = Vec::new();
            for id in &chain {
                for (key, (owner, handler)) in doc.listeners.iter() {
                    if owner == id {
                        handlers.push((*key, handler.clone()));
                    }
                }
            }
            handlers
        };

        for (key, handler) in path {
            // Listeners removed by an earlier handler in this dispatch don't fire.
            if !self.doc.borrow().listeners.contains_key(&key) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                continue;
            };
            (*handler)(Some(target));
        }
    }

    /// Make every later `probe_image` call fail up front, as a browser does
    /// when it cannot create the image element.
    pub fn reject_probes(&self, reject: bool) {
        self.doc.borrow_mut().reject_probes = reject;
    }

    /// Sources of the probes that have not completed yet, oldest first.
    pub fn pending_probes(&self) -> Vec<String> {
        self.doc
            .borrow()
            .probes
            .iter()
            .map(|probe| probe.src.clone())
            .collect()
    }

    /// Complete the oldest pending probe for `src`. Returns false if none is pending.
    pub fn resolve_probe(&self, src: &str, outcome: ProbeOutcome) -> bool {
        let probe = {
            let mut doc = self.doc.borrow_mut();
            let Some(index) = doc.probes.iter().position(|probe| probe.src == src) else {
                return false;
            };
            doc.probes.remove(index)
        };
        match probe {
            Some(probe) => {
                (probe.done)(outcome);
                true
            }
            None => false,
        }
    }

    /// Complete the oldest pending probe, returning its source.
    pub fn resolve_next(&self, outcome: ProbeOutcome) -> Option<String> {
        let probe = self.doc.borrow_mut().probes.pop_front()?;
        let src = probe.src.clone();
        (probe.done)(outcome);
        Some(src)
    }

    pub fn src(&self, element: &NodeId) -> Option<String> {
        self.attribute(element, "src")
    }

    pub fn classes(&self, element: &NodeId) -> Vec<String> {
        self.doc.borrow().node(*element).classes.clone()
    }

    pub fn children(&self, element: &NodeId) -> Vec<NodeId> {
        self.doc.borrow().node(*element).children.clone()
    }

    /// Number of connected elements carrying `class`.
    pub fn count_by_class(&self, class: &str) -> usize {
        let doc = self.doc.borrow();
        doc.descendants(ROOT)
            .into_iter()
            .filter(|id| doc.node(*id).classes.iter().any(|c| c == class))
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.doc.borrow().listeners.len()
    }
}

/// Guard for a [`MemoryDom`] click listener
pub struct MemoryListener {
    doc: Weak<RefCell<Document>>,
    key: u64,
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        if let Some(doc) = self.doc.upgrade() {
            if let Ok(mut doc) = doc.try_borrow_mut() {
                doc.listeners.remove(&self.key);
            }
        }
    }
}

impl Dom for MemoryDom {
    type Element = NodeId;
    type Listener = MemoryListener;

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        let parsed = SimpleSelector::parse(selector)?;
        let doc = self.doc.borrow();
        if doc.matches(ROOT, &parsed) {
            return Ok(Some(ROOT));
        }
        Ok(doc
            .descendants(ROOT)
            .into_iter()
            .find(|id| doc.matches(*id, &parsed)))
    }

    fn query_selector_in(&self, root: &NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let parsed = SimpleSelector::parse(selector)?;
        let doc = self.doc.borrow();
        Ok(doc
            .descendants(*root)
            .into_iter()
            .find(|id| doc.matches(*id, &parsed)))
    }

    fn body(&self) -> Result<NodeId, DomError> {
        Ok(BODY)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::Operation(format!("invalid tag name: {tag:?}")));
        }
        let mut doc = self.doc.borrow_mut();
        doc.nodes.push(Node::new(tag));
        Ok(NodeId(doc.nodes.len() - 1))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        let mut doc = self.doc.borrow_mut();
        if doc.is_ancestor_or_self(*child, *parent) {
            return Err(DomError::Operation(
                "cannot append a node inside itself".to_string(),
            ));
        }
        doc.detach(*child);
        doc.node_mut(*child).parent = Some(*parent);
        doc.node_mut(*parent).children.push(*child);
        Ok(())
    }

    fn remove(&self, element: &NodeId) {
        self.doc.borrow_mut().detach(*element);
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<(), DomError> {
        if class.is_empty() || class.chars().any(char::is_whitespace) {
            return Err(DomError::Operation(format!("invalid class token: {class:?}")));
        }
        let mut doc = self.doc.borrow_mut();
        let classes = &mut doc.node_mut(*element).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if name.is_empty() {
            return Err(DomError::Operation("empty attribute name".to_string()));
        }
        self.doc
            .borrow_mut()
            .node_mut(*element)
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.doc
            .borrow()
            .node(*element)
            .attributes
            .get(name)
            .cloned()
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.doc.borrow().node(*element).tag.clone()
    }

    fn parent_element(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().node(*element).parent
    }

    fn next_element_sibling(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().sibling(*element, 1)
    }

    fn previous_element_sibling(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().sibling(*element, -1)
    }

    fn first_element_child(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().node(*element).children.first().copied()
    }

    fn last_element_child(&self, element: &NodeId) -> Option<NodeId> {
        self.doc.borrow().node(*element).children.last().copied()
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        self.doc.borrow().is_ancestor_or_self(ROOT, *element)
    }

    fn on_click(
        &self,
        element: &NodeId,
        handler: ClickHandler<NodeId>,
    ) -> Result<MemoryListener, DomError> {
        let mut doc = self.doc.borrow_mut();
        let key = doc.next_listener;
        doc.next_listener += 1;
        doc.listeners
            .insert(key, (*element, Rc::new(RefCell::new(handler))));
        Ok(MemoryListener {
            doc: Rc::downgrade(&self.doc),
            key,
        })
    }

    fn probe_image(&self, src: &str, done: ProbeCallback) -> Result<(), DomError> {
        let mut doc = self.doc.borrow_mut();
        if doc.reject_probes {
            return Err(DomError::Operation(format!("cannot load image: {src:?}")));
        }
        doc.probes.push_back(PendingProbe {
            src: src.to_string(),
            done,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn element(dom: &MemoryDom, parent: &NodeId, tag: &str, class: &str) -> NodeId {
        let el = dom.create_element(tag).unwrap();
        dom.add_class(&el, class).unwrap();
        dom.append_child(parent, &el).unwrap();
        el
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(
            SimpleSelector::parse("img.thumb.big").unwrap(),
            SimpleSelector {
                tag: Some("IMG".into()),
                id: None,
                classes: vec!["thumb".into(), "big".into()],
            }
        );
        assert_eq!(
            SimpleSelector::parse("#photos").unwrap().id.as_deref(),
            Some("photos")
        );
        assert!(SimpleSelector::parse("").is_err());
        assert!(SimpleSelector::parse(".a .b").is_err());
        assert!(SimpleSelector::parse("div > img").is_err());
        assert!(SimpleSelector::parse("..a").is_err());
    }

    #[test]
    fn test_query_selector_document_order() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let outer = element(&dom, &body, "div", "box");
        let inner = element(&dom, &outer, "div", "box");
        let _later = element(&dom, &body, "div", "box");

        assert_eq!(dom.query_selector(".box").unwrap(), Some(outer));
        assert_eq!(dom.query_selector_in(&outer, ".box").unwrap(), Some(inner));
        assert_eq!(dom.query_selector(".missing").unwrap(), None);
        assert_eq!(dom.query_selector("body").unwrap(), Some(body));
    }

    #[test]
    fn test_query_by_id() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let el = element(&dom, &body, "section", "gallery");
        dom.set_attribute(&el, "id", "photos").unwrap();
        assert_eq!(dom.query_selector("#photos").unwrap(), Some(el));
        assert_eq!(dom.query_selector("section#photos.gallery").unwrap(), Some(el));
        assert_eq!(dom.query_selector("div#photos").unwrap(), None);
    }

    #[test]
    fn test_siblings_and_children() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let list = element(&dom, &body, "div", "list");
        let a = element(&dom, &list, "img", "t");
        let b = element(&dom, &list, "img", "t");
        let c = element(&dom, &list, "img", "t");

        assert_eq!(dom.next_element_sibling(&a), Some(b));
        assert_eq!(dom.next_element_sibling(&c), None);
        assert_eq!(dom.previous_element_sibling(&b), Some(a));
        assert_eq!(dom.previous_element_sibling(&a), None);
        assert_eq!(dom.first_element_child(&list), Some(a));
        assert_eq!(dom.last_element_child(&list), Some(c));
        assert_eq!(dom.parent_element(&b), Some(list));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let wrapper = element(&dom, &body, "div", "wrap");
        let child = element(&dom, &wrapper, "img", "pic");

        assert!(dom.is_connected(&child));
        assert_eq!(dom.count_by_class("pic"), 1);
        dom.remove(&wrapper);
        assert!(!dom.is_connected(&child));
        assert_eq!(dom.count_by_class("pic"), 0);
        assert_eq!(dom.query_selector(".wrap").unwrap(), None);

        // Removing twice is harmless
        dom.remove(&wrapper);
    }

    #[test]
    fn test_append_moves_existing_child() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let first = element(&dom, &body, "div", "first");
        let second = element(&dom, &body, "div", "second");
        let child = element(&dom, &first, "span", "child");

        dom.append_child(&second, &child).unwrap();
        assert!(dom.children(&first).is_empty());
        assert_eq!(dom.children(&second), vec![child]);
    }

    #[test]
    fn test_append_into_self_rejected() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let outer = element(&dom, &body, "div", "outer");
        let inner = element(&dom, &outer, "div", "inner");
        assert!(dom.append_child(&inner, &outer).is_err());
    }

    #[test]
    fn test_add_class_rejects_bad_tokens() {
        let dom = MemoryDom::new();
        let el = dom.create_element("div").unwrap();
        assert!(dom.add_class(&el, "").is_err());
        assert!(dom.add_class(&el, "a b").is_err());
        dom.add_class(&el, "a").unwrap();
        dom.add_class(&el, "a").unwrap();
        assert_eq!(dom.classes(&el), vec!["a".to_string()]);
    }

    #[test]
    fn test_tag_names_are_upper_case() {
        let dom = MemoryDom::new();
        let el = dom.create_element("img").unwrap();
        assert_eq!(dom.tag_name(&el), "IMG");
    }

    #[test]
    fn test_click_bubbles_to_ancestors() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let list = element(&dom, &body, "div", "list");
        let item = element(&dom, &list, "img", "item");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_list = seen.clone();
        let _listener = dom
            .on_click(
                &list,
                Box::new(move |target| seen_by_list.borrow_mut().push(target)),
            )
            .unwrap();

        dom.click(&item);
        dom.click(&list);
        assert_eq!(*seen.borrow(), vec![Some(item), Some(list)]);
    }

    #[test]
    fn test_dropped_listener_stops_firing() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let button = element(&dom, &body, "img", "button");

        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let listener = dom
            .on_click(&button, Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();

        dom.click(&button);
        assert_eq!(dom.listener_count(), 1);
        drop(listener);
        dom.click(&button);
        assert_eq!(count.get(), 1);
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn test_probes_resolve_in_caller_order() {
        let dom = MemoryDom::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for src in ["a.jpg", "b.jpg"] {
            let log = log.clone();
            dom.probe_image(
                src,
                Box::new(move |outcome| log.borrow_mut().push((src, outcome))),
            )
            .unwrap();
        }

        assert_eq!(dom.pending_probes(), vec!["a.jpg", "b.jpg"]);
        assert!(dom.resolve_probe("b.jpg", ProbeOutcome::Failed));
        assert!(!dom.resolve_probe("b.jpg", ProbeOutcome::Failed));
        assert_eq!(dom.resolve_next(ProbeOutcome::Loaded).as_deref(), Some("a.jpg"));
        assert_eq!(dom.resolve_next(ProbeOutcome::Loaded), None);
        assert_eq!(
            *log.borrow(),
            vec![("b.jpg", ProbeOutcome::Failed), ("a.jpg", ProbeOutcome::Loaded)]
        );
    }

    #[test]
    fn test_rejected_image_load_is_not_queued() {
        let dom = MemoryDom::new();
        dom.reject_probes(true);
        assert!(dom.probe_image("a.jpg", Box::new(|_| {})).is_err());
        assert!(dom.pending_probes().is_empty());

        dom.reject_probes(false);
        dom.probe_image("a.jpg", Box::new(|_| {})).unwrap();
        assert_eq!(dom.pending_probes(), vec!["a.jpg"]);
    }
}
