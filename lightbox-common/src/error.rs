use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Setting `{key}` must not be empty")]
    Empty { key: &'static str },
    #[error("Setting `{key}` is not a valid class name: {value:?}")]
    InvalidClass { key: &'static str, value: String },
    #[error("Invalid settings object: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reported by a [`Dom`](crate::dom::Dom) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("No window available")]
    NoWindow,
    #[error("No document available")]
    NoDocument,
    #[error("Document has no body")]
    NoBody,
    #[error("DOM operation failed: {0}")]
    Operation(String),
}

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Gallery container not found: {selector}")]
    ContainerNotFound { selector: String },
    #[error("Element is not inside the gallery container")]
    OutsideContainer,
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
