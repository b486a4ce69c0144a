//! Gallery controller
//!
//! A gallery watches one thumbnail container. Clicking an `<img>` inside it opens
//! an overlay showing the image named by the thumbnail's `data-full_image_url`
//! attribute, with back / next / close buttons.
//!
//! Navigation reads sibling order from the live document each time, so
//! thumbnails added or removed between clicks are picked up without any
//! bookkeeping. Full-size images are probed off-document first; only the
//! completion of the most recent probe is applied to the overlay.
//!
//! Galleries using the same wrapper class share one overlay. The wrapper carries
//! the id of the gallery that last took it over; a gallery that finds another id
//! there treats its viewer as closed and lets its button listeners go.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, trace, warn};

use crate::dom::{Dom, ProbeOutcome};
use crate::error::{DomError, GalleryError};
use crate::probe::{ProbeSequencer, ProbeToken};
use crate::settings::GallerySettings;

/// Attribute on a thumbnail holding the URL of its full-size image
pub const FULL_IMAGE_URL_ATTRIBUTE: &str = "data-full_image_url";

/// Attribute on the overlay wrapper naming the gallery that drives it
pub const OVERLAY_OWNER_ATTRIBUTE: &str = "data-gallery_owner";

static NEXT_GALLERY_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Clone, Copy, Debug)]
enum OverlayAction {
    Navigate(Direction),
    Close,
}

/// Overlay elements plus the listeners wired to its buttons
struct Overlay<D: Dom> {
    wrapper: D::Element,
    image: D::Element,
    _listeners: Vec<D::Listener>,
}

enum ViewerState<D: Dom> {
    Closed,
    Open {
        current: D::Element,
        overlay: Overlay<D>,
    },
}

struct Gallery<D: Dom> {
    id: String,
    dom: D,
    settings: GallerySettings,
    container: D::Element,
    state: ViewerState<D>,
    probes: ProbeSequencer,
    this: Weak<RefCell<Gallery<D>>>,
    _container_listener: Option<D::Listener>,
}

/// Run `f` against the gallery behind `this`, if it is still alive and not
/// already borrowed by an outer handler.
fn with_gallery<D: Dom>(
    this: &Weak<RefCell<Gallery<D>>>,
    event: &'static str,
    f: impl FnOnce(&mut Gallery<D>),
) {
    let Some(gallery) = this.upgrade() else {
        trace!(event, "Gallery dropped, ignoring event");
        return;
    };
    let Ok(mut guard) = gallery.try_borrow_mut() else {
        warn!(event, "Gallery busy, ignoring re-entrant event");
        return;
    };
    f(&mut guard);
}

impl<D: Dom> Gallery<D> {
    fn is_within_container(&self, element: &D::Element) -> bool {
        let mut node = Some(element.clone());
        while let Some(el) = node {
            if el == self.container {
                return true;
            }
            node = self.dom.parent_element(&el);
        }
        false
    }

    fn owns(&self, overlay: &Overlay<D>) -> bool {
        self.dom
            .attribute(&overlay.wrapper, OVERLAY_OWNER_ATTRIBUTE)
            .is_some_and(|owner| owner == self.id)
    }

    /// The open thumbnail and overlay, unless another gallery has taken the
    /// overlay over.
    fn open_view(&self) -> Option<(&D::Element, &Overlay<D>)> {
        match &self.state {
            ViewerState::Open { current, overlay } if self.owns(overlay) => {
                Some((current, overlay))
            }
            _ => None,
        }
    }

    /// Close the viewer without touching the document if the overlay now
    /// belongs to another gallery. Returns true if it did.
    fn release_lost_overlay(&mut self) -> bool {
        let lost = matches!(
            &self.state,
            ViewerState::Open { overlay, .. } if !self.owns(overlay)
        );
        if lost {
            debug!(gallery = %self.id, "Overlay taken over by another gallery");
            self.probes.invalidate();
            self.state = ViewerState::Closed;
        }
        lost
    }

    fn handle_container_click(&mut self, target: Option<D::Element>) {
        let Some(target) = target else {
            return;
        };
        if !self.dom.tag_name(&target).eq_ignore_ascii_case("img") {
            trace!("Ignoring click outside a thumbnail");
            return;
        }
        if let Err(e) = self.open_thumbnail(target) {
            error!("Failed to open gallery image: {e}");
        }
    }

    fn open_thumbnail(&mut self, thumbnail: D::Element) -> Result<(), GalleryError> {
        let src = self.dom.attribute(&thumbnail, FULL_IMAGE_URL_ATTRIBUTE);
        self.open_image(thumbnail, src)
    }

    /// Make `current` the open thumbnail and start loading `src` into the overlay.
    fn open_image(&mut self, current: D::Element, src: Option<String>) -> Result<(), GalleryError> {
        let overlay = match std::mem::replace(&mut self.state, ViewerState::Closed) {
            ViewerState::Open { overlay, .. }
                if self.dom.is_connected(&overlay.wrapper) && self.owns(&overlay) =>
            {
                overlay
            }
            _ => self.get_or_create_overlay()?,
        };
        self.state = ViewerState::Open { current, overlay };

        let token = self.probes.issue();
        let Some(src) = src else {
            warn!(
                "Thumbnail has no {} attribute, showing placeholder",
                FULL_IMAGE_URL_ATTRIBUTE
            );
            self.finish_probe(token, "", ProbeOutcome::Failed);
            return Ok(());
        };

        debug!(src = %src, "Opening gallery image");
        let this = self.this.clone();
        let requested = src.clone();
        let probe = self.dom.probe_image(
            &src,
            Box::new(move |outcome| {
                with_gallery(&this, "image probe", |gallery| {
                    gallery.finish_probe(token, &requested, outcome)
                });
            }),
        );
        if let Err(e) = probe {
            error!(src = %src, "Failed to start loading gallery image: {e}");
            self.finish_probe(token, &src, ProbeOutcome::Failed);
        }
        Ok(())
    }

    fn finish_probe(&mut self, token: ProbeToken, src: &str, outcome: ProbeOutcome) {
        if !self.probes.complete(token) {
            debug!(src, "Discarding stale image probe");
            return;
        }
        if self.release_lost_overlay() {
            return;
        }
        let ViewerState::Open { overlay, .. } = &self.state else {
            return;
        };

        let shown = match outcome {
            ProbeOutcome::Loaded => src,
            ProbeOutcome::Failed => {
                debug!(src, "Image failed to load, showing placeholder");
                self.settings.image_not_found_src.as_str()
            }
        };
        if let Err(e) = self.dom.set_src(&overlay.image, shown) {
            error!("Failed to set gallery image source: {e}");
        }
    }

    fn get_or_create_overlay(&self) -> Result<Overlay<D>, GalleryError> {
        match self.dom.query_selector(&self.settings.wrapper_selector())? {
            Some(wrapper) => {
                debug!("Reusing gallery overlay already in the document");
                Ok(self.adopt_overlay(wrapper)?)
            }
            None => {
                debug!("Creating gallery overlay");
                Ok(self.create_overlay()?)
            }
        }
    }

    fn create_overlay(&self) -> Result<Overlay<D>, DomError> {
        let settings = &self.settings;
        let wrapper = self.dom.create_element("div")?;
        self.dom
            .add_class(&wrapper, &settings.opened_image_wrapper_class)?;
        self.dom
            .set_attribute(&wrapper, OVERLAY_OWNER_ATTRIBUTE, &self.id)?;
        let mut listeners = Vec::with_capacity(3);

        let back = self.button(
            &settings.opened_image_back_btn_class,
            &settings.opened_image_back_btn_src,
        )?;
        self.dom.append_child(&wrapper, &back)?;
        listeners.push(self.on_action(&back, OverlayAction::Navigate(Direction::Previous))?);

        let next = self.button(
            &settings.opened_image_next_btn_class,
            &settings.opened_image_next_btn_src,
        )?;
        self.dom.append_child(&wrapper, &next)?;
        listeners.push(self.on_action(&next, OverlayAction::Navigate(Direction::Next))?);

        let screen = self.dom.create_element("div")?;
        self.dom
            .add_class(&screen, &settings.opened_image_screen_class)?;
        self.dom.append_child(&wrapper, &screen)?;

        let close = self.button(
            &settings.opened_image_close_btn_class,
            &settings.opened_image_close_btn_src,
        )?;
        listeners.push(self.on_action(&close, OverlayAction::Close)?);
        self.dom.append_child(&wrapper, &close)?;

        let image = self.dom.create_element("img")?;
        self.dom.add_class(&image, &settings.opened_image_class)?;
        self.dom.append_child(&wrapper, &image)?;

        let body = self.dom.body()?;
        self.dom.append_child(&body, &wrapper)?;

        Ok(Overlay {
            wrapper,
            image,
            _listeners: listeners,
        })
    }

    /// Take over an overlay found in the document: locate (or add) its display
    /// image and wire whichever buttons it has.
    fn adopt_overlay(&self, wrapper: D::Element) -> Result<Overlay<D>, DomError> {
        let settings = &self.settings;
        self.dom
            .set_attribute(&wrapper, OVERLAY_OWNER_ATTRIBUTE, &self.id)?;
        let image = match self
            .dom
            .query_selector_in(&wrapper, &settings.image_selector())?
        {
            Some(image) => image,
            None => {
                let image = self.dom.create_element("img")?;
                self.dom.add_class(&image, &settings.opened_image_class)?;
                self.dom.append_child(&wrapper, &image)?;
                image
            }
        };

        let buttons = [
            (
                &settings.opened_image_back_btn_class,
                OverlayAction::Navigate(Direction::Previous),
            ),
            (
                &settings.opened_image_next_btn_class,
                OverlayAction::Navigate(Direction::Next),
            ),
            (&settings.opened_image_close_btn_class, OverlayAction::Close),
        ];
        let mut listeners = Vec::with_capacity(buttons.len());
        for (class, action) in buttons {
            if let Some(button) = self.dom.query_selector_in(&wrapper, &format!(".{class}"))? {
                listeners.push(self.on_action(&button, action)?);
            }
        }

        Ok(Overlay {
            wrapper,
            image,
            _listeners: listeners,
        })
    }

    fn button(&self, class: &str, src: &str) -> Result<D::Element, DomError> {
        let button = self.dom.create_element("img")?;
        self.dom.add_class(&button, class)?;
        self.dom.set_src(&button, src)?;
        Ok(button)
    }

    fn on_action(
        &self,
        element: &D::Element,
        action: OverlayAction,
    ) -> Result<D::Listener, DomError> {
        let this = self.this.clone();
        self.dom.on_click(
            element,
            Box::new(move |_| {
                with_gallery(&this, "overlay button", |gallery| match action {
                    OverlayAction::Navigate(direction) => gallery.show_adjacent(direction),
                    OverlayAction::Close => gallery.close(),
                });
            }),
        )
    }

    /// Thumbnail next to the open one, wrapping around at either end.
    fn adjacent(&self, direction: Direction) -> Option<D::Element> {
        let (current, _) = self.open_view()?;

        let parent = match self.dom.parent_element(current) {
            Some(parent) if self.is_within_container(&parent) => {
                let sibling = match direction {
                    Direction::Next => self.dom.next_element_sibling(current),
                    Direction::Previous => self.dom.previous_element_sibling(current),
                };
                if sibling.is_some() {
                    return sibling;
                }
                parent
            }
            // The open thumbnail left the container; restart from its ends.
            _ => self.container.clone(),
        };

        match direction {
            Direction::Next => self.dom.first_element_child(&parent),
            Direction::Previous => self.dom.last_element_child(&parent),
        }
    }

    fn show_adjacent(&mut self, direction: Direction) {
        if self.release_lost_overlay() {
            return;
        }
        let Some(target) = self.adjacent(direction) else {
            return;
        };
        debug!(?direction, "Navigating gallery");
        if let Err(e) = self.open_thumbnail(target) {
            error!("Failed to navigate gallery: {e}");
        }
    }

    fn close(&mut self) {
        if self.release_lost_overlay() {
            return;
        }
        self.probes.invalidate();
        if let ViewerState::Open { overlay, .. } =
            std::mem::replace(&mut self.state, ViewerState::Closed)
        {
            self.dom.remove(&overlay.wrapper);
            debug!("Gallery closed");
        }
    }
}

/// Handle to a gallery bound to one thumbnail container
///
/// Cloning the handle shares the same gallery. Event handlers only hold weak
/// references; once every handle is dropped the container listener is removed
/// and pending image probes are ignored.
#[derive(Clone)]
pub struct GalleryHandle<D: Dom> {
    inner: Rc<RefCell<Gallery<D>>>,
}

impl<D: Dom> GalleryHandle<D> {
    /// Bind a gallery to the container matching `settings.preview_selector`.
    ///
    /// Fails with [`GalleryError::ContainerNotFound`] if no element matches.
    pub fn init(dom: D, settings: GallerySettings) -> Result<Self, GalleryError> {
        settings.validate()?;
        let container = dom
            .query_selector(&settings.preview_selector)?
            .ok_or_else(|| GalleryError::ContainerNotFound {
                selector: settings.preview_selector.clone(),
            })?;

        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Gallery {
                id: NEXT_GALLERY_ID.fetch_add(1, Ordering::Relaxed).to_string(),
                dom: dom.clone(),
                settings,
                container: container.clone(),
                state: ViewerState::Closed,
                probes: ProbeSequencer::new(),
                this: this.clone(),
                _container_listener: None,
            })
        });

        let this = Rc::downgrade(&inner);
        let listener = dom.on_click(
            &container,
            Box::new(move |target| {
                with_gallery(&this, "container click", |gallery| {
                    gallery.handle_container_click(target)
                });
            }),
        )?;
        inner.borrow_mut()._container_listener = Some(listener);

        info!(
            selector = %inner.borrow().settings.preview_selector,
            "Gallery initialized"
        );
        Ok(Self { inner })
    }

    /// Handle a click that landed inside the container. Targets that are not
    /// `<img>` elements are ignored.
    pub fn handle_container_click(&self, target: Option<D::Element>) {
        self.inner.borrow_mut().handle_container_click(target);
    }

    /// Open `thumbnail`, which must be inside the container.
    pub fn open(&self, thumbnail: D::Element) -> Result<(), GalleryError> {
        let mut gallery = self.inner.borrow_mut();
        if !gallery.is_within_container(&thumbnail) {
            return Err(GalleryError::OutsideContainer);
        }
        gallery.open_thumbnail(thumbnail)
    }

    pub fn show_next(&self) {
        self.inner.borrow_mut().show_adjacent(Direction::Next);
    }

    pub fn show_previous(&self) {
        self.inner.borrow_mut().show_adjacent(Direction::Previous);
    }

    /// Thumbnail that `show_next` would open. `None` while closed.
    pub fn next_image(&self) -> Option<D::Element> {
        self.inner.borrow().adjacent(Direction::Next)
    }

    /// Thumbnail that `show_previous` would open. `None` while closed.
    pub fn previous_image(&self) -> Option<D::Element> {
        self.inner.borrow().adjacent(Direction::Previous)
    }

    /// Remove the overlay from the document. No-op while closed.
    pub fn close(&self) {
        self.inner.borrow_mut().close();
    }

    /// Whether this gallery is showing the overlay. False once another gallery
    /// has taken the overlay over.
    pub fn is_open(&self) -> bool {
        self.inner.borrow().open_view().is_some()
    }

    /// The open thumbnail.
    pub fn current(&self) -> Option<D::Element> {
        let gallery = self.inner.borrow();
        gallery.open_view().map(|(current, _)| current.clone())
    }

    pub fn overlay(&self) -> Option<D::Element> {
        let gallery = self.inner.borrow();
        gallery.open_view().map(|(_, overlay)| overlay.wrapper.clone())
    }

    /// The full-size image element inside the overlay.
    pub fn overlay_image(&self) -> Option<D::Element> {
        let gallery = self.inner.borrow();
        gallery.open_view().map(|(_, overlay)| overlay.image.clone())
    }

    pub fn container(&self) -> D::Element {
        self.inner.borrow().container.clone()
    }

    pub fn settings(&self) -> GallerySettings {
        self.inner.borrow().settings.clone()
    }
}
