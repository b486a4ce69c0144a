//! lightbox demo - Host page for the gallery
//!
//! Renders a row of thumbnails and binds the gallery to them once the page has
//! mounted. The last photo points at a missing file to show the placeholder.

use dioxus::prelude::*;
use lightbox_common::GallerySettings;
use lightbox_web::WebGallery;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");
const CLOSE_ICON: Asset = asset!("/assets/gallery/close.svg");
const NEXT_ICON: Asset = asset!("/assets/gallery/next.svg");
const BACK_ICON: Asset = asset!("/assets/gallery/back.svg");
const NOT_FOUND: Asset = asset!("/assets/gallery/not-found.svg");

const PREVIEWS_CONTAINER: &str = "galleryPreviewsContainer";

struct Photo {
    id: u32,
    alt: &'static str,
}

impl Photo {
    fn thumbnail_url(&self) -> String {
        format!("https://picsum.photos/id/{}/400/260", self.id)
    }

    fn full_url(&self) -> String {
        format!("https://picsum.photos/id/{}/1600/1040", self.id)
    }
}

const PHOTOS: &[Photo] = &[
    Photo { id: 10, alt: "Forest" },
    Photo { id: 15, alt: "Waterfall" },
    Photo { id: 28, alt: "Rocks" },
    Photo { id: 29, alt: "Mountains" },
    Photo { id: 37, alt: "Shore" },
];

fn gallery_settings() -> GallerySettings {
    GallerySettings {
        preview_selector: format!(".{PREVIEWS_CONTAINER}"),
        opened_image_close_btn_src: CLOSE_ICON.to_string(),
        opened_image_next_btn_src: NEXT_ICON.to_string(),
        opened_image_back_btn_src: BACK_ICON.to_string(),
        image_not_found_src: NOT_FOUND.to_string(),
        ..Default::default()
    }
}

#[component]
fn App() -> Element {
    let mut gallery = use_signal(|| None::<WebGallery>);
    let mut init_error = use_signal(|| None::<String>);

    // The container must be in the document before the gallery binds to it
    use_effect(move || {
        if gallery.peek().is_some() {
            return;
        }
        match lightbox_web::init(gallery_settings()) {
            Ok(handle) => gallery.set(Some(handle)),
            Err(e) => {
                tracing::error!("Failed to start gallery: {e}");
                init_error.set(Some(e.to_string()));
            }
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        main { class: "page",
            h1 { "Gallery" }
            p { class: "hint", "Click a thumbnail to enlarge it." }
            {init_error().map(|err| rsx! {
                p { class: "error", "{err}" }
            })}
            div { class: PREVIEWS_CONTAINER,
                for photo in PHOTOS {
                    img {
                        key: "{photo.id}",
                        src: photo.thumbnail_url(),
                        alt: photo.alt,
                        "data-full_image_url": photo.full_url(),
                    }
                }
                img {
                    src: NOT_FOUND.to_string(),
                    alt: "Missing",
                    "data-full_image_url": "https://picsum.photos/id/does-not-exist.jpg",
                }
            }
        }
    }
}

fn main() {
    dioxus::launch(App);
}
