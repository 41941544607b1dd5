//! Shape addressing.
//!
//! A [`PrimaryKey`] names a shape as `"{slide_id}_{shape_id}"`. It is unique
//! within one loaded document and is the token every outer surface uses to
//! point at a shape.
use crate::error::{DeckError, Result};
use crate::ooxml::pptx::{Package, Shape, Slide};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// `(slide_id, shape_id)` address of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryKey {
    pub slide_id: u32,
    pub shape_id: u32,
}

impl PrimaryKey {
    pub fn new(slide_id: u32, shape_id: u32) -> Self {
        Self { slide_id, shape_id }
    }

    /// Key of `shape` on `slide`; `None` when the shape carries no id.
    pub fn of(slide: &Slide, shape: &Shape<'_>) -> Option<Self> {
        shape
            .shape_id()
            .map(|shape_id| Self::new(slide.slide_id(), shape_id))
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.slide_id, self.shape_id)
    }
}

impl FromStr for PrimaryKey {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || DeckError::MalformedKey(s.to_string());
        let mut parts = s.split('_');
        let (Some(slide), Some(shape), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let slide_id = parse_id(slide).ok_or_else(malformed)?;
        let shape_id = parse_id(shape).ok_or_else(malformed)?;
        Ok(Self::new(slide_id, shape_id))
    }
}

fn parse_id(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    atoi_simd::parse::<u32, false, false>(segment.as_bytes()).ok()
}

impl Serialize for PrimaryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrimaryKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Find the slide and shape a key points at.
///
/// Slides are scanned in document order, then that slide's shapes; the first
/// match wins.
pub fn resolve<'a>(pkg: &'a Package, key: &PrimaryKey) -> Result<(&'a Slide, Shape<'a>)> {
    let slide = pkg
        .slide(key.slide_id)
        .ok_or_else(|| DeckError::slide_not_found(key.slide_id))?;
    let shape = slide
        .shape(key.shape_id)?
        .ok_or_else(|| DeckError::shape_not_found(key.slide_id, key.shape_id))?;
    Ok((slide, shape))
}

/// Every addressable shape in document order, with its key. When two shapes
/// on a slide share an id, only the first is listed.
pub fn keyed_shapes(pkg: &Package) -> Result<Vec<(PrimaryKey, Shape<'_>)>> {
    let mut seen = HashSet::new();
    let mut keyed = Vec::new();
    for slide in pkg.slides() {
        for shape in slide.shapes()? {
            match PrimaryKey::of(slide, &shape) {
                Some(key) if !seen.insert(key) => {
                    tracing::warn!(%key, "duplicate shape id; keeping the first shape")
                },
                Some(key) => keyed.push((key, shape)),
                None => tracing::warn!(
                    slide_id = slide.slide_id(),
                    name = %shape.name(),
                    "shape without an id is not addressable"
                ),
            }
        }
    }
    Ok(keyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Missing;
    use crate::ooxml::pptx::package::tests::two_slide_deck;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        let key: PrimaryKey = "256_3".parse().unwrap();
        assert_eq!(key, PrimaryKey::new(256, 3));
        assert_eq!(key.to_string(), "256_3");
    }

    #[test]
    fn test_malformed_keys() {
        for bad in ["", "256", "256_", "_3", "256_3_1", "a_3", "256_-3", "256_ 3", "1_99999999999"] {
            assert!(
                matches!(bad.parse::<PrimaryKey>(), Err(DeckError::MalformedKey(_))),
                "{:?} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let key = PrimaryKey::new(257, 8);
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""257_8""#);
        let back: PrimaryKey = serde_json::from_str(r#""257_8""#).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<PrimaryKey>(r#""257-8""#).is_err());
    }

    #[test]
    fn test_resolve_reports_which_half_failed() {
        let pkg = Package::from_bytes(&two_slide_deck()).unwrap();

        let err = resolve(&pkg, &PrimaryKey::new(999, 1)).unwrap_err();
        assert!(matches!(err, DeckError::NotFound(Missing::Slide(999))));

        let err = resolve(&pkg, &PrimaryKey::new(256, 42)).unwrap_err();
        assert!(matches!(
            err,
            DeckError::NotFound(Missing::Shape {
                slide_id: 256,
                shape_id: 42
            })
        ));
    }

    #[test]
    fn test_every_shape_resolves_to_itself() {
        let pkg = Package::from_bytes(&two_slide_deck()).unwrap();
        let keyed = keyed_shapes(&pkg).unwrap();
        assert_eq!(keyed.len(), 4);
        for (key, shape) in keyed {
            let (slide, found) = resolve(&pkg, &key).unwrap();
            assert_eq!(slide.slide_id(), key.slide_id);
            assert_eq!(found.position(), shape.position());
            assert!(std::ptr::eq(found.element(), shape.element()));
        }
    }

    proptest! {
        #[test]
        fn prop_display_parse_round_trip(slide_id in any::<u32>(), shape_id in any::<u32>()) {
            let key = PrimaryKey::new(slide_id, shape_id);
            prop_assert_eq!(key.to_string().parse::<PrimaryKey>().unwrap(), key);
        }
    }
}
