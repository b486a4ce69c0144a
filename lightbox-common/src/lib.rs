//! lightbox-common - Click-to-enlarge gallery logic
//!
//! Everything here is independent of the browser: the gallery drives any
//! [`Dom`] implementation. `lightbox-web` supplies the browser one;
//! `lightbox-mocks` keeps a document in memory.

pub mod dom;
pub mod error;
pub mod gallery;
pub mod probe;
pub mod settings;

pub use dom::{ClickHandler, Dom, ProbeCallback, ProbeOutcome};
pub use error::{DomError, GalleryError, SettingsError};
pub use gallery::{
    Direction, GalleryHandle, FULL_IMAGE_URL_ATTRIBUTE, OVERLAY_OWNER_ATTRIBUTE,
};
pub use probe::{ProbeSequencer, ProbeToken};
pub use settings::{GallerySettings, SettingsOverrides};
