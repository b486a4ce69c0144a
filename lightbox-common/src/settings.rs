//! Gallery settings
//!
//! Settings use the camelCase key names a host page passes from JavaScript
//! (`previewSelector`, `openedImageClass`, ...). Any key left out of a settings
//! object keeps its default, so `{"previewSelector": ".g"}` is a complete
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Settings for a gallery instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GallerySettings {
    /// Selector of the element wrapping the thumbnails
    pub preview_selector: String,
    /// Class of the overlay wrapper
    pub opened_image_wrapper_class: String,
    /// Class of the full-size image inside the overlay
    pub opened_image_class: String,
    /// Class of the backdrop behind the opened image
    pub opened_image_screen_class: String,
    pub opened_image_close_btn_class: String,
    pub opened_image_close_btn_src: String,
    pub opened_image_next_btn_src: String,
    pub opened_image_next_btn_class: String,
    pub opened_image_back_btn_src: String,
    pub opened_image_back_btn_class: String,
    /// Shown instead of a full-size image that fails to load
    pub image_not_found_src: String,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            preview_selector: ".mySuperGallery".to_string(),
            opened_image_wrapper_class: "galleryWrapper".to_string(),
            opened_image_class: "galleryWrapper__image".to_string(),
            opened_image_screen_class: "galleryWrapper__screen".to_string(),
            opened_image_close_btn_class: "galleryWrapper__close".to_string(),
            opened_image_close_btn_src: "images/gallery/close.png".to_string(),
            opened_image_next_btn_src: "images/gallery/next.png".to_string(),
            opened_image_next_btn_class: "galleryWrapper__next".to_string(),
            opened_image_back_btn_src: "images/gallery/back.png".to_string(),
            opened_image_back_btn_class: "galleryWrapper__back".to_string(),
            image_not_found_src: "images/gallery/duck.gif".to_string(),
        }
    }
}

/// Partial settings. `None` fields keep whatever the base settings hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverrides {
    pub preview_selector: Option<String>,
    pub opened_image_wrapper_class: Option<String>,
    pub opened_image_class: Option<String>,
    pub opened_image_screen_class: Option<String>,
    pub opened_image_close_btn_class: Option<String>,
    pub opened_image_close_btn_src: Option<String>,
    pub opened_image_next_btn_src: Option<String>,
    pub opened_image_next_btn_class: Option<String>,
    pub opened_image_back_btn_src: Option<String>,
    pub opened_image_back_btn_class: Option<String>,
    pub image_not_found_src: Option<String>,
}

impl GallerySettings {
    /// Parse a (possibly partial) JSON settings object over the defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply overrides on top of these settings.
    pub fn merge(mut self, overrides: SettingsOverrides) -> Self {
        fn set(slot: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut self.preview_selector, overrides.preview_selector);
        set(
            &mut self.opened_image_wrapper_class,
            overrides.opened_image_wrapper_class,
        );
        set(&mut self.opened_image_class, overrides.opened_image_class);
        set(
            &mut self.opened_image_screen_class,
            overrides.opened_image_screen_class,
        );
        set(
            &mut self.opened_image_close_btn_class,
            overrides.opened_image_close_btn_class,
        );
        set(
            &mut self.opened_image_close_btn_src,
            overrides.opened_image_close_btn_src,
        );
        set(
            &mut self.opened_image_next_btn_src,
            overrides.opened_image_next_btn_src,
        );
        set(
            &mut self.opened_image_next_btn_class,
            overrides.opened_image_next_btn_class,
        );
        set(
            &mut self.opened_image_back_btn_src,
            overrides.opened_image_back_btn_src,
        );
        set(
            &mut self.opened_image_back_btn_class,
            overrides.opened_image_back_btn_class,
        );
        set(&mut self.image_not_found_src, overrides.image_not_found_src);
        self
    }

    /// Check the values a DOM class list or selector lookup would reject.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.preview_selector.trim().is_empty() {
            return Err(SettingsError::Empty {
                key: "previewSelector",
            });
        }

        for (key, value) in self.class_names() {
            if value.is_empty() {
                return Err(SettingsError::Empty { key });
            }
            if value.chars().any(char::is_whitespace) {
                return Err(SettingsError::InvalidClass {
                    key,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Selector matching the overlay wrapper.
    pub fn wrapper_selector(&self) -> String {
        format!(".{}", self.opened_image_wrapper_class)
    }

    /// Selector matching the full-size image inside the overlay.
    pub fn image_selector(&self) -> String {
        format!(".{}", self.opened_image_class)
    }

    fn class_names(&self) -> [(&'static str, &str); 6] {
        [
            ("openedImageWrapperClass", self.opened_image_wrapper_class.as_str()),
            ("openedImageClass", self.opened_image_class.as_str()),
            ("openedImageScreenClass", self.opened_image_screen_class.as_str()),
            ("openedImageCloseBtnClass", self.opened_image_close_btn_class.as_str()),
            ("openedImageNextBtnClass", self.opened_image_next_btn_class.as_str()),
            ("openedImageBackBtnClass", self.opened_image_back_btn_class.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = GallerySettings::from_json(r#"{"previewSelector": ".g"}"#).unwrap();
        assert_eq!(settings.preview_selector, ".g");
        assert_eq!(
            settings,
            GallerySettings {
                preview_selector: ".g".to_string(),
                ..GallerySettings::default()
            }
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        let settings = GallerySettings::from_json("{}").unwrap();
        assert_eq!(settings, GallerySettings::default());
    }

    #[test]
    fn test_json_overrides_every_supplied_key() {
        let settings = GallerySettings::from_json(
            r#"{
                "openedImageWrapperClass": "lb",
                "openedImageClass": "lb__img",
                "imageNotFoundSrc": "missing.svg",
                "somethingElse": 3
            }"#,
        )
        .unwrap();
        assert_eq!(settings.opened_image_wrapper_class, "lb");
        assert_eq!(settings.opened_image_class, "lb__img");
        assert_eq!(settings.image_not_found_src, "missing.svg");
        assert_eq!(settings.preview_selector, ".mySuperGallery");
        assert_eq!(settings.opened_image_close_btn_src, "images/gallery/close.png");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GallerySettings::from_json(r#"{"previewSelector": 4}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_merge_only_touches_supplied_fields() {
        let merged = GallerySettings::default().merge(SettingsOverrides {
            opened_image_next_btn_src: Some("next.svg".into()),
            opened_image_back_btn_src: Some("back.svg".into()),
            ..Default::default()
        });
        let defaults = GallerySettings::default();
        assert_eq!(merged.opened_image_next_btn_src, "next.svg");
        assert_eq!(merged.opened_image_back_btn_src, "back.svg");
        assert_eq!(merged.preview_selector, defaults.preview_selector);
        assert_eq!(merged.opened_image_close_btn_src, defaults.opened_image_close_btn_src);
        assert_eq!(merged.image_not_found_src, defaults.image_not_found_src);
    }

    #[test]
    fn test_merge_with_no_overrides_is_identity() {
        let base = GallerySettings {
            preview_selector: "#photos".into(),
            ..Default::default()
        };
        assert_eq!(base.clone().merge(SettingsOverrides::default()), base);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(GallerySettings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_selector() {
        let settings = GallerySettings {
            preview_selector: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Empty {
                key: "previewSelector"
            })
        ));
    }

    #[test]
    fn test_validate_rejects_class_with_space() {
        let settings = GallerySettings {
            opened_image_class: "big image".into(),
            ..Default::default()
        };
        match settings.validate() {
            Err(SettingsError::InvalidClass { key, value }) => {
                assert_eq!(key, "openedImageClass");
                assert_eq!(value, "big image");
            }
            other => panic!("Expected InvalidClass, got {other:?}"),
        }
    }

    #[test]
    fn test_selectors() {
        let settings = GallerySettings::default();
        assert_eq!(settings.wrapper_selector(), ".galleryWrapper");
        assert_eq!(settings.image_selector(), ".galleryWrapper__image");
    }
}
