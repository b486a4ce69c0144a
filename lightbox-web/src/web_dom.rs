//! Browser document implementing [`Dom`]

use std::cell::RefCell;
use std::rc::Rc;

use lightbox_common::{ClickHandler, Dom, DomError, ProbeCallback, ProbeOutcome};
use wasm_bindgen_x::prelude::*;
use wasm_bindgen_x::JsCast;

use crate::wasm_utils::{js_error, ElementEventListener};

/// The page's `document`
#[derive(Clone, Debug)]
pub struct WebDom {
    document: web_sys_x::Document,
}

impl WebDom {
    /// Bind to `window.document`.
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys_x::window().ok_or(DomError::NoWindow)?;
        let document = window.document().ok_or(DomError::NoDocument)?;
        Ok(Self { document })
    }
}

/// An off-document image load. Owns its `onload`/`onerror` closures until one
/// of them fires.
struct ImageProbe {
    image: web_sys_x::HtmlImageElement,
    done: ProbeCallback,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

type ProbeSlot = Rc<RefCell<Option<ImageProbe>>>;

/// Detach both handlers, report the outcome, then free the closures.
fn settle(slot: &ProbeSlot, outcome: ProbeOutcome) {
    let probe = slot.borrow_mut().take();
    if let Some(probe) = probe {
        probe.image.set_onload(None);
        probe.image.set_onerror(None);
        (probe.done)(outcome);
    }
}

impl Dom for WebDom {
    type Element = web_sys_x::Element;
    type Listener = ElementEventListener;

    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, DomError> {
        self.document.query_selector(selector).map_err(js_error)
    }

    fn query_selector_in(
        &self,
        root: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>, DomError> {
        root.query_selector(selector).map_err(js_error)
    }

    fn body(&self) -> Result<Self::Element, DomError> {
        self.document
            .body()
            .map(web_sys_x::Element::from)
            .ok_or(DomError::NoBody)
    }

    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn remove(&self, element: &Self::Element) {
        element.remove();
    }

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), DomError> {
        element.class_list().add_1(class).map_err(js_error)
    }

    fn set_attribute(
        &self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        element.set_attribute(name, value).map_err(js_error)
    }

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn tag_name(&self, element: &Self::Element) -> String {
        element.tag_name()
    }

    fn parent_element(&self, element: &Self::Element) -> Option<Self::Element> {
        element.parent_element()
    }

    fn next_element_sibling(&self, element: &Self::Element) -> Option<Self::Element> {
        element.next_element_sibling()
    }

    fn previous_element_sibling(&self, element: &Self::Element) -> Option<Self::Element> {
        element.previous_element_sibling()
    }

    fn first_element_child(&self, element: &Self::Element) -> Option<Self::Element> {
        element.first_element_child()
    }

    fn last_element_child(&self, element: &Self::Element) -> Option<Self::Element> {
        element.last_element_child()
    }

    fn is_connected(&self, element: &Self::Element) -> bool {
        element.is_connected()
    }

    fn on_click(
        &self,
        element: &Self::Element,
        mut handler: ClickHandler<Self::Element>,
    ) -> Result<Self::Listener, DomError> {
        ElementEventListener::new(element.clone().into(), "click", move |event| {
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys_x::Element>().ok());
            handler(target);
        })
    }

    fn probe_image(&self, src: &str, done: ProbeCallback) -> Result<(), DomError> {
        let image = web_sys_x::HtmlImageElement::new().map_err(js_error)?;
        let slot: ProbeSlot = Rc::new(RefCell::new(None));

        // The closures and the slot reference each other until `settle` takes
        // the probe out of the slot.
        let on_load: Closure<dyn FnMut()> = Closure::once({
            let slot = slot.clone();
            move || settle(&slot, ProbeOutcome::Loaded)
        });
        let on_error: Closure<dyn FnMut()> = Closure::once({
            let slot = slot.clone();
            move || settle(&slot, ProbeOutcome::Failed)
        });

        image.set_onload(Some(on_load.as_ref().unchecked_ref::<js_sys_x::Function>()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref::<js_sys_x::Function>()));
        *slot.borrow_mut() = Some(ImageProbe {
            image: image.clone(),
            done,
            _on_load: on_load,
            _on_error: on_error,
        });
        image.set_src(src);
        Ok(())
    }
}
