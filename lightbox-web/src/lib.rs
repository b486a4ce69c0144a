//! lightbox-web - Browser binding for the gallery
//!
//! Call [`init`] once the page has loaded:
//!
//! ```ignore
//! let gallery = lightbox_web::init(GallerySettings {
//!     preview_selector: ".galleryPreviewsContainer".into(),
//!     ..Default::default()
//! })?;
//! ```
//!
//! Keep the returned handle alive for as long as the gallery should respond to
//! clicks; dropping the last handle detaches the container listener.

pub mod wasm_utils;
pub mod web_dom;

use lightbox_common::{GalleryError, GalleryHandle, GallerySettings};

pub use wasm_utils::ElementEventListener;
pub use web_dom::WebDom;

pub type WebGallery = GalleryHandle<WebDom>;

/// Bind a gallery to `window.document`.
pub fn init(settings: GallerySettings) -> Result<WebGallery, GalleryError> {
    GalleryHandle::init(WebDom::new()?, settings)
}
