//! Placeholder geometry inherited from slide layouts and masters.
//!
//! A placeholder on a slide that carries no `a:xfrm` of its own is drawn where
//! the matching placeholder of its layout is, and failing that, where the
//! matching placeholder of the layout's master is.
use crate::ooxml::error::Result;
use crate::ooxml::pptx::parts::slide::SlidePart;
use crate::ooxml::pptx::shapes::base::{BoundingBox, PlaceholderRef, Shape, ShapeKind};
use std::collections::HashMap;

/// Placeholder geometry declared on one layout or master.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderGeometry {
    by_idx: HashMap<u32, BoundingBox>,
    by_type: HashMap<String, BoundingBox>,
}

impl PlaceholderGeometry {
    /// Collect placeholders with an explicit transform from a layout or
    /// master part. The first placeholder of a given type wins.
    pub fn from_part(part: &SlidePart) -> Result<Self> {
        let mut geometry = Self::default();
        let sp_tree = part.sp_tree()?;

        for pos in 0..sp_tree.nodes().len() {
            let Some(element) = sp_tree.element_at(pos) else {
                continue;
            };
            let Some(kind) = ShapeKind::from_local_name(element.local_name()) else {
                continue;
            };
            let shape = Shape::new(element, kind, pos, None);
            let (Some(ph), Some(bbox)) = (shape.placeholder(), shape.own_bounding_box()) else {
                continue;
            };
            if let Some(idx) = ph.idx {
                geometry.by_idx.entry(idx).or_insert(bbox);
            }
            geometry
                .by_type
                .entry(ph_type(&ph).to_string())
                .or_insert(bbox);
        }

        Ok(geometry)
    }

    fn on_layout(&self, ph: &PlaceholderRef) -> Option<BoundingBox> {
        ph.idx
            .and_then(|idx| self.by_idx.get(&idx))
            .or_else(|| self.by_type.get(ph_type(ph)))
            .copied()
    }

    fn on_master(&self, ph: &PlaceholderRef) -> Option<BoundingBox> {
        let wanted = master_type(ph_type(ph));
        self.by_type
            .iter()
            .filter(|(t, _)| master_type(t) == wanted)
            .map(|(t, bbox)| (t.as_str(), *bbox))
            .min_by_key(|(t, _)| *t)
            .map(|(_, bbox)| bbox)
    }
}

/// Effective placeholder type; an absent `type` means `obj`.
fn ph_type(ph: &PlaceholderRef) -> &str {
    ph.ph_type.as_deref().unwrap_or("obj")
}

/// Masters only define title, body and the footer placeholders; slide
/// placeholder types fold onto those.
fn master_type(ph_type: &str) -> &str {
    match ph_type {
        "ctrTitle" | "title" => "title",
        "subTitle" | "obj" | "body" | "chart" | "tbl" | "clipArt" | "dgm" | "media" | "pic" => {
            "body"
        },
        other => other,
    }
}

/// Layout and master placeholder geometry for one slide.
#[derive(Debug, Clone, Default)]
pub struct InheritedGeometry {
    layout: PlaceholderGeometry,
    master: PlaceholderGeometry,
}

impl InheritedGeometry {
    pub fn new(layout: PlaceholderGeometry, master: PlaceholderGeometry) -> Self {
        Self { layout, master }
    }

    /// Geometry a slide placeholder inherits.
    pub fn resolve(&self, ph: &PlaceholderRef) -> Option<BoundingBox> {
        self.layout
            .on_layout(ph)
            .or_else(|| self.master.on_master(ph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::PackURI;

    fn part(name: &str, shapes: &str) -> SlidePart {
        let xml = format!(
            r#"<p:sldLayout xmlns:p="urn:p" xmlns:a="urn:a"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
            shapes
        );
        SlidePart::from_xml(PackURI::new(name).unwrap(), xml.as_bytes()).unwrap()
    }

    fn ph(id: u32, ph: &str, xfrm: Option<(i64, i64, i64, i64)>) -> String {
        let sp_pr = match xfrm {
            Some((x, y, cx, cy)) => format!(
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#
            ),
            None => "<p:spPr/>".to_string(),
        };
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="ph{id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr>{sp_pr}</p:sp>"#
        )
    }

    fn bbox(left: i64) -> BoundingBox {
        BoundingBox {
            left,
            top: 0,
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn test_layout_idx_then_master_type() {
        let layout = part(
            "/ppt/slideLayouts/slideLayout1.xml",
            &format!(
                "{}{}",
                ph(2, r#"<p:ph type="title"/>"#, Some((100, 0, 10, 10))),
                ph(3, r#"<p:ph idx="1"/>"#, None)
            ),
        );
        let master = part(
            "/ppt/slideMasters/slideMaster1.xml",
            &format!(
                "{}{}",
                ph(2, r#"<p:ph type="title"/>"#, Some((1, 0, 10, 10))),
                ph(3, r#"<p:ph type="body" idx="1"/>"#, Some((2, 0, 10, 10)))
            ),
        );
        let inherited = InheritedGeometry::new(
            PlaceholderGeometry::from_part(&layout).unwrap(),
            PlaceholderGeometry::from_part(&master).unwrap(),
        );

        let title = PlaceholderRef {
            idx: None,
            ph_type: Some("ctrTitle".to_string()),
        };
        // ctrTitle is not on the layout by type; master folds it onto title
        assert_eq!(inherited.resolve(&title), Some(bbox(1)));

        let body = PlaceholderRef {
            idx: Some(1),
            ph_type: None,
        };
        // layout idx=1 has no transform of its own
        assert_eq!(inherited.resolve(&body), Some(bbox(2)));

        let layout_title = PlaceholderRef {
            idx: None,
            ph_type: Some("title".to_string()),
        };
        assert_eq!(inherited.resolve(&layout_title), Some(bbox(100)));

        let footer = PlaceholderRef {
            idx: Some(12),
            ph_type: Some("ftr".to_string()),
        };
        assert_eq!(inherited.resolve(&footer), None);
    }
}
