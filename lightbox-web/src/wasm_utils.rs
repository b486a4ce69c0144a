//! Event listener guard
//!
//! A `Closure` handed to `addEventListener` has to outlive the listener. Rather
//! than `closure.forget()`, which leaks the closure and leaves the listener
//! attached forever, the closure is kept in a guard that removes the listener
//! when dropped:
//!
//! ```ignore
//! let listener = ElementEventListener::new(element.into(), "click", callback)?;
//!
//! // Listener is removed here
//! drop(listener);
//! ```

use lightbox_common::DomError;
use wasm_bindgen_x::prelude::*;
use wasm_bindgen_x::JsCast;

/// An event listener that removes itself from its target when dropped.
pub struct ElementEventListener {
    target: web_sys_x::EventTarget,
    event_name: &'static str,
    callback: Closure<dyn FnMut(web_sys_x::Event)>,
}

impl ElementEventListener {
    pub fn new(
        target: web_sys_x::EventTarget,
        event_name: &'static str,
        callback: impl FnMut(web_sys_x::Event) + 'static,
    ) -> Result<Self, DomError> {
        let callback: Closure<dyn FnMut(web_sys_x::Event)> = Closure::wrap(Box::new(callback));

        target
            .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
            .map_err(js_error)?;

        Ok(Self {
            target,
            event_name,
            callback,
        })
    }
}

impl Drop for ElementEventListener {
    fn drop(&mut self) {
        if let Err(e) = self.target.remove_event_listener_with_callback(
            self.event_name,
            self.callback.as_ref().unchecked_ref(),
        ) {
            tracing::warn!("Failed to remove {} listener: {e:?}", self.event_name);
        }
    }
}

pub(crate) fn js_error(err: JsValue) -> DomError {
    DomError::Operation(format!("{err:?}"))
}
