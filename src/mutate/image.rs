//! Picture replacement.
//!
//! The new picture keeps the old one's height and top edge, takes its width
//! from the new image's aspect ratio, and is centered horizontally on the old
//! footprint.
use crate::error::{DeckError, Result};
use crate::key::{self, PrimaryKey};
use crate::ooxml::pptx::shapes::NewPicture;
use crate::ooxml::pptx::{BoundingBox, EmbeddableImage, Package, ShapeType};
use serde::{Deserialize, Serialize};

/// Where the replacement picture goes in the slide's paint order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingPolicy {
    /// Same position in the shape tree, same id and name; the key stays valid
    #[default]
    Preserve,
    /// On top of every other shape with a fresh id
    Append,
}

/// Geometry of a replacement image of `image_width` x `image_height` pixels
/// in the footprint `original`.
pub fn placement(original: BoundingBox, image_width: u32, image_height: u32) -> Result<BoundingBox> {
    if image_height == 0 || image_width == 0 {
        return Err(DeckError::InvalidImage(format!(
            "image has no area ({}x{})",
            image_width, image_height
        )));
    }
    let aspect = f64::from(image_width) / f64::from(image_height);
    let height = original.height;
    let width = (height as f64 * aspect).round() as i64;
    let left = original.left + (original.width - width).div_euclid(2);

    Ok(BoundingBox {
        left,
        top: original.top,
        width,
        height,
    })
}

/// Replace the picture at `key` with `image`; returns the key of the new
/// picture.
pub fn replace_image(
    pkg: &mut Package,
    key: &PrimaryKey,
    image: &EmbeddableImage,
    policy: StackingPolicy,
) -> Result<PrimaryKey> {
    let (_, shape) = key::resolve(pkg, key)?;
    if shape.shape_type() != ShapeType::Picture {
        return Err(DeckError::NotPicture(key.to_string()));
    }
    let original = shape
        .bounding_box()
        .ok_or_else(|| DeckError::MissingGeometry(key.to_string()))?;
    let position = shape.position();
    let name = shape.name();
    let descr = shape.description();

    let (image_width, image_height) = image.dimensions();
    let bounding_box = placement(original, image_width, image_height)?;

    let r_id = pkg.add_image(key.slide_id, image)?;
    let slide = pkg
        .slide_mut(key.slide_id)
        .ok_or_else(|| DeckError::slide_not_found(key.slide_id))?;
    slide.remove_shape(position)?;

    let ns = slide.prefixes();
    let new_key = match policy {
        StackingPolicy::Preserve => {
            let pic = NewPicture {
                shape_id: key.shape_id,
                name: &name,
                descr: &descr,
                r_id: &r_id,
                bounding_box,
            }
            .to_element(&ns)?;
            slide.insert_shape(position, pic)?;
            *key
        },
        StackingPolicy::Append => {
            let shape_id = slide.max_shape_id()? + 1;
            let name = format!("Picture {}", shape_id - 1);
            let pic = NewPicture {
                shape_id,
                name: &name,
                descr: "",
                r_id: &r_id,
                bounding_box,
            }
            .to_element(&ns)?;
            slide.append_shape(pic)?;
            PrimaryKey::new(key.slide_id, shape_id)
        },
    };

    tracing::debug!(
        %key,
        %new_key,
        ?policy,
        width = bounding_box.width,
        height = bounding_box.height,
        "replaced image"
    );
    Ok(new_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::media::tests::png;
    use crate::ooxml::pptx::package::tests::two_slide_deck;
    use proptest::prelude::*;

    fn bbox(left: i64, top: i64, width: i64, height: i64) -> BoundingBox {
        BoundingBox {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_matching_aspect_does_not_move() {
        assert_eq!(placement(bbox(100, 50, 200, 100), 2, 1).unwrap(), bbox(100, 50, 200, 100));
    }

    #[test]
    fn test_square_image_is_centered() {
        assert_eq!(placement(bbox(100, 50, 200, 100), 1, 1).unwrap(), bbox(150, 50, 100, 100));
    }

    #[test]
    fn test_wider_image_extends_both_sides() {
        assert_eq!(
            placement(bbox(1000, 500, 300, 200), 400, 200).unwrap(),
            bbox(950, 500, 400, 200)
        );
    }

    #[test]
    fn test_odd_difference_floors() {
        // width 101 in a 100-wide box: (100 - 101) / 2 floors to -1
        assert_eq!(placement(bbox(0, 0, 100, 100), 101, 100).unwrap().left, -1);
        assert_eq!(placement(bbox(0, 0, 100, 100), 99, 100).unwrap().left, 0);
    }

    #[test]
    fn test_zero_height_is_invalid() {
        assert!(matches!(
            placement(bbox(0, 0, 10, 10), 10, 0),
            Err(DeckError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_replace_keeps_position_id_and_name() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let key = PrimaryKey::new(256, 2);
        let image = EmbeddableImage::from_bytes(png(400, 200)).unwrap();

        let new_key = replace_image(&mut pkg, &key, &image, StackingPolicy::Preserve).unwrap();
        assert_eq!(new_key, key);

        let slide = pkg.slide(256).unwrap();
        let shapes = slide.shapes().unwrap();
        let ids: Vec<Option<u32>> = shapes.iter().map(|s| s.shape_id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

        let pic = &shapes[1];
        assert_eq!(pic.shape_type(), ShapeType::Picture);
        assert_eq!(pic.name(), "Picture 2");
        assert_eq!(pic.bounding_box(), Some(bbox(950, 500, 400, 200)));
        assert_ne!(pic.image_r_id().as_deref(), Some("rId2"));
    }

    #[test]
    fn test_append_puts_new_picture_on_top() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let key = PrimaryKey::new(256, 2);
        let image = EmbeddableImage::from_bytes(png(300, 200)).unwrap();

        let new_key = replace_image(&mut pkg, &key, &image, StackingPolicy::Append).unwrap();
        assert_eq!(new_key, PrimaryKey::new(256, 4));

        let shapes = pkg.slide(256).unwrap().shapes().unwrap();
        let ids: Vec<Option<u32>> = shapes.iter().map(|s| s.shape_id()).collect();
        assert_eq!(ids, vec![Some(1), Some(3), Some(4)]);
        assert_eq!(shapes[2].name(), "Picture 3");
        assert_eq!(shapes[2].bounding_box(), Some(bbox(1000, 500, 300, 200)));
    }

    #[test]
    fn test_same_image_bytes_share_a_media_part() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        // the deck already holds a 30x20 png at image1.png
        let image = EmbeddableImage::from_bytes(png(30, 20)).unwrap();
        replace_image(&mut pkg, &PrimaryKey::new(256, 2), &image, StackingPolicy::Preserve)
            .unwrap();
        let saved = pkg.to_bytes().unwrap();

        let opc = crate::ooxml::OpcPackage::from_bytes(&saved).unwrap();
        let media = opc
            .partnames()
            .filter(|p| p.as_str().starts_with("/ppt/media/"))
            .count();
        assert_eq!(media, 1);
    }

    #[test]
    fn test_text_shape_is_not_a_picture() {
        let mut pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let image = EmbeddableImage::from_bytes(png(4, 4)).unwrap();
        let err = replace_image(&mut pkg, &PrimaryKey::new(256, 1), &image, StackingPolicy::Preserve)
            .unwrap_err();
        assert!(matches!(err, DeckError::NotPicture(_)));
    }

    proptest! {
        #[test]
        fn prop_height_and_top_are_kept(
            left in -10_000i64..10_000,
            top in -10_000i64..10_000,
            width in 1i64..10_000_000,
            height in 1i64..10_000_000,
            img_w in 1u32..8_000,
            img_h in 1u32..8_000,
        ) {
            let placed = placement(bbox(left, top, width, height), img_w, img_h).unwrap();
            prop_assert_eq!(placed.top, top);
            prop_assert_eq!(placed.height, height);
            // centered to within one unit
            let drift = (placed.left * 2 + placed.width) - (left * 2 + width);
            prop_assert!(drift == 0 || drift == -1);
        }
    }
}
