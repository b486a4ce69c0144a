use lightbox_common::{
    Dom, GalleryError, GalleryHandle, GallerySettings, ProbeOutcome, FULL_IMAGE_URL_ATTRIBUTE,
};
use lightbox_mocks::{MemoryDom, NodeId};

fn thumbnails(dom: &MemoryDom, parent: &NodeId, urls: &[&str]) -> Vec<NodeId> {
    urls.iter()
        .map(|url| {
            let img = dom.create_element("img").unwrap();
            dom.set_attribute(&img, FULL_IMAGE_URL_ATTRIBUTE, url).unwrap();
            dom.append_child(parent, &img).unwrap();
            img
        })
        .collect()
}

fn container(dom: &MemoryDom) -> NodeId {
    let el = dom.create_element("div").unwrap();
    dom.add_class(&el, "g").unwrap();
    dom.append_child(&dom.body().unwrap(), &el).unwrap();
    el
}

fn settings() -> GallerySettings {
    GallerySettings {
        preview_selector: ".g".into(),
        ..Default::default()
    }
}

#[test]
fn test_nested_thumbnails_navigate_within_their_row() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    let row_one = dom.create_element("div").unwrap();
    let row_two = dom.create_element("div").unwrap();
    dom.append_child(&root, &row_one).unwrap();
    dom.append_child(&root, &row_two).unwrap();
    let first_row = thumbnails(&dom, &row_one, &["a.jpg", "b.jpg"]);
    let _second_row = thumbnails(&dom, &row_two, &["c.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    dom.click(&first_row[1]);
    assert_eq!(gallery.next_image(), Some(first_row[0]));
}

#[test]
fn test_detached_thumbnail_restarts_from_container() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    let thumbs = thumbnails(&dom, &root, &["a.jpg", "b.jpg", "c.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    dom.click(&thumbs[1]);
    dom.remove(&thumbs[1]);

    assert_eq!(gallery.next_image(), Some(thumbs[0]));
    assert_eq!(gallery.previous_image(), Some(thumbs[2]));
}

#[test]
fn test_single_thumbnail_navigates_to_itself() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    let thumbs = thumbnails(&dom, &root, &["only.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    dom.click(&thumbs[0]);
    assert_eq!(gallery.next_image(), Some(thumbs[0]));
    assert_eq!(gallery.previous_image(), Some(thumbs[0]));
}

#[test]
fn test_navigation_while_closed_is_noop() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    thumbnails(&dom, &root, &["a.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    gallery.show_next();
    gallery.show_previous();
    assert!(!gallery.is_open());
    assert!(dom.pending_probes().is_empty());
    assert_eq!(gallery.next_image(), None);
}

#[test]
fn test_open_rejects_element_outside_container() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    thumbnails(&dom, &root, &["a.jpg"]);
    let stray = thumbnails(&dom, &dom.body().unwrap(), &["x.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    assert!(matches!(
        gallery.open(stray[0]),
        Err(GalleryError::OutsideContainer)
    ));
    assert!(!gallery.is_open());
}

#[test]
fn test_dropped_gallery_detaches_container_listener() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    let thumbs = thumbnails(&dom, &root, &["a.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    assert_eq!(dom.listener_count(), 1);
    drop(gallery);
    assert_eq!(dom.listener_count(), 0);

    dom.click(&thumbs[0]);
    assert_eq!(dom.count_by_class("galleryWrapper"), 0);
}

#[test]
fn test_probe_after_drop_is_ignored() {
    let dom = MemoryDom::new();
    let root = container(&dom);
    let thumbs = thumbnails(&dom, &root, &["a.jpg"]);

    let gallery = GalleryHandle::init(dom.clone(), settings()).unwrap();
    dom.click(&thumbs[0]);
    let image = gallery.overlay_image().unwrap();
    drop(gallery);

    assert!(dom.resolve_probe("a.jpg", ProbeOutcome::Loaded));
    assert_eq!(dom.src(&image), None);
}
