//! Document abstraction the gallery drives
//!
//! The gallery only needs a small slice of the DOM: selector lookup, element
//! creation, class and attribute access, element-sibling traversal, click
//! listeners, and an off-document image load. `lightbox-web` implements this on
//! the browser document; `lightbox-mocks` implements it in memory.

use crate::error::DomError;

/// Click listener. Receives the event target, if it is an element.
pub type ClickHandler<E> = Box<dyn FnMut(Option<E>)>;

/// Completion of an image probe. Called at most once.
pub type ProbeCallback = Box<dyn FnOnce(ProbeOutcome)>;

/// Result of loading an image off-document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Loaded,
    Failed,
}

pub trait Dom: Clone + 'static {
    /// Handle to an element. Equality is element identity.
    type Element: Clone + PartialEq + 'static;

    /// Listener guard. Dropping it detaches the listener.
    type Listener: 'static;

    /// First element in the document matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, DomError>;

    /// First descendant of `root` matching `selector`.
    fn query_selector_in(
        &self,
        root: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>, DomError>;

    fn body(&self) -> Result<Self::Element, DomError>;

    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;

    /// Detach `element` from its parent. No-op if already detached.
    fn remove(&self, element: &Self::Element);

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), DomError>;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str)
        -> Result<(), DomError>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Upper-case tag name, as `Element.tagName` reports it for HTML elements.
    fn tag_name(&self, element: &Self::Element) -> String;

    fn parent_element(&self, element: &Self::Element) -> Option<Self::Element>;

    fn next_element_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    fn previous_element_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    fn first_element_child(&self, element: &Self::Element) -> Option<Self::Element>;

    fn last_element_child(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Whether `element` is currently part of the document tree.
    fn is_connected(&self, element: &Self::Element) -> bool;

    fn on_click(
        &self,
        element: &Self::Element,
        handler: ClickHandler<Self::Element>,
    ) -> Result<Self::Listener, DomError>;

    /// Start loading `src` in an image that is never attached to the document.
    /// `done` runs once the load succeeds or fails, after this call returns.
    fn probe_image(&self, src: &str, done: ProbeCallback) -> Result<(), DomError>;

    fn set_src(&self, element: &Self::Element, src: &str) -> Result<(), DomError> {
        self.set_attribute(element, "src", src)
    }
}
