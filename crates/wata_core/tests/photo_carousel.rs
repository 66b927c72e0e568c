use wata_core::service::photo_carousel::PhotoCarousel;
use wata_core::{GalleryError, Photo};

fn carousel(len: usize) -> PhotoCarousel {
    let mut carousel = PhotoCarousel::new();
    for index in 0..len {
        carousel
            .add(Photo::with_id(
                format!("p{index}"),
                format!("data:image/png;base64,{index}"),
                format!("photo-{index}.png"),
            ))
            .unwrap();
    }
    carousel
}

#[test]
fn next_and_prev_wrap_around() {
    let mut carousel = carousel(3);
    carousel.jump_to(2).unwrap();
    carousel.next();
    assert_eq!(carousel.index(), 0);

    carousel.prev();
    assert_eq!(carousel.index(), 2);
}

#[test]
fn autoplay_cycles_through_every_photo() {
    let mut carousel = carousel(3);
    let seen = (0..4)
        .map(|_| {
            assert!(carousel.advance());
            carousel.current().unwrap().id.clone()
        })
        .collect::<Vec<_>>();
    assert_eq!(seen, ["p1", "p2", "p0", "p1"]);
}

#[test]
fn autoplay_holds_single_photo() {
    let mut carousel = carousel(1);
    assert!(!carousel.advance());
    assert_eq!(carousel.index(), 0);
}

#[test]
fn removing_last_displayed_photo_clamps() {
    let mut carousel = carousel(3);
    carousel.jump_to(2).unwrap();
    let removed = carousel.remove("p2").unwrap();
    assert_eq!(removed.label, "photo-2.png");
    assert_eq!(carousel.index(), 1);

    carousel.remove("p1");
    carousel.remove("p0");
    assert!(carousel.is_empty());
    assert_eq!(carousel.index(), 0);
    assert!(carousel.current().is_none());
}

#[test]
fn removing_earlier_photo_keeps_index_in_range() {
    let mut carousel = carousel(3);
    carousel.jump_to(1).unwrap();
    carousel.remove("p0");
    assert_eq!(carousel.index(), 1);
    assert_eq!(carousel.current().unwrap().id, "p2");
}

#[test]
fn jump_rejects_out_of_range() {
    let mut carousel = carousel(2);
    let err = carousel.jump_to(2).unwrap_err();
    assert_eq!(err, GalleryError::IndexOutOfRange { index: 2, len: 2 });
    assert_eq!(carousel.index(), 0);
}
